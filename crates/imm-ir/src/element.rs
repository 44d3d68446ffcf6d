use imm_core::{
    Bounds3, BrushSectionType, ElementRecord, ImmError, ImmResult, PaintPoint, VisibilityType,
};

use crate::arena::{DrawingId, ElementId};
use crate::session::ExportSession;

/// Upper bound on the points a single element may declare.
pub const MAX_POINTS_PER_ELEMENT: u32 = 1 << 20;

/// Authoring progress of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElementState {
    Created,
    Initialized,
    Populated,
    BoundsComputed,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementLayout {
    pub(crate) brush: BrushSectionType,
    pub(crate) visibility: VisibilityType,
}

#[derive(Debug)]
pub(crate) struct ElementNode {
    pub(crate) drawing: DrawingId,
    pub(crate) layout: Option<ElementLayout>,
    pub(crate) points: Vec<Option<PaintPoint>>,
    pub(crate) bounds: Option<Bounds3>,
}

impl ElementNode {
    pub(crate) fn new(drawing: DrawingId) -> Self {
        Self {
            drawing,
            layout: None,
            points: Vec::new(),
            bounds: None,
        }
    }

    pub(crate) fn state(&self) -> ElementState {
        if self.layout.is_none() {
            ElementState::Created
        } else if self.bounds.is_some() {
            ElementState::BoundsComputed
        } else if self.points.iter().any(Option::is_some) {
            ElementState::Populated
        } else {
            ElementState::Initialized
        }
    }

    /// The committed form of this element, if every point is set and the
    /// bounds are current.
    pub(crate) fn to_record(&self) -> Option<ElementRecord> {
        let layout = self.layout?;
        let bounds = self.bounds?;
        let points = self.points.iter().copied().collect::<Option<Vec<_>>>()?;
        Some(ElementRecord {
            brush: layout.brush,
            visibility: layout.visibility,
            bounds,
            points,
        })
    }
}

impl ExportSession {
    /// Declare the point capacity and brush of an element. Must be called
    /// exactly once, before any point is set.
    pub fn element_init(
        &mut self,
        element: ElementId,
        num_points: u32,
        brush: BrushSectionType,
        visibility: VisibilityType,
    ) -> ImmResult<()> {
        let drawing = self.element_node(element)?.drawing;
        self.ensure_drawing_editable(drawing)?;

        if num_points == 0 || num_points > MAX_POINTS_PER_ELEMENT {
            return Err(ImmError::Initialization(format!(
                "element point count {} must be in 1..={}",
                num_points, MAX_POINTS_PER_ELEMENT
            )));
        }
        let node = self.element_node_mut(element)?;
        if node.layout.is_some() {
            return Err(ImmError::Initialization("element already initialized".into()));
        }
        node.layout = Some(ElementLayout { brush, visibility });
        node.points = vec![None; num_points as usize];
        Ok(())
    }

    /// Write the point at `index`. Overwriting is allowed; any previously
    /// computed bounds of the element and its drawing are discarded.
    pub fn set_point(
        &mut self,
        element: ElementId,
        index: u32,
        point: PaintPoint,
    ) -> ImmResult<()> {
        let drawing = self.element_node(element)?.drawing;
        self.ensure_drawing_editable(drawing)?;

        let node = self.element_node_mut(element)?;
        if node.layout.is_none() {
            return Err(ImmError::Initialization(
                "set_point before element init".into(),
            ));
        }
        let capacity = node.points.len() as u32;
        let slot = node
            .points
            .get_mut(index as usize)
            .ok_or(ImmError::out_of_range("point", index, capacity))?;
        if !point.is_finite() {
            return Err(ImmError::InvalidArgument(format!(
                "point {} has non-finite components",
                index
            )));
        }
        *slot = Some(point);
        let had_bounds = node.bounds.take().is_some();

        if had_bounds {
            self.invalidate_drawing_bounds(drawing)?;
        }
        Ok(())
    }

    /// Derive the element's bounding volume from the points set so far.
    pub fn compute_element_bounds(&mut self, element: ElementId) -> ImmResult<Bounds3> {
        let drawing = self.element_node(element)?.drawing;
        self.ensure_drawing_editable(drawing)?;

        let node = self.element_node_mut(element)?;
        if node.layout.is_none() {
            return Err(ImmError::Initialization(
                "compute_bounds before element init".into(),
            ));
        }
        let boxes: Vec<Bounds3> = node.points.iter().flatten().map(PaintPoint::bounds).collect();
        let bounds = Bounds3::union_all(&boxes)
            .ok_or_else(|| ImmError::Ordering("element has no points set".into()))?;
        // Large coordinates plus half the width can overflow f32.
        if !bounds.is_finite() {
            return Err(ImmError::InvalidArgument(
                "element bounds overflow the f32 range".into(),
            ));
        }
        let changed = node.bounds != Some(bounds);
        node.bounds = Some(bounds);

        if changed {
            self.invalidate_drawing_bounds(drawing)?;
        }
        Ok(bounds)
    }

    pub fn element_bounds(&self, element: ElementId) -> ImmResult<Option<Bounds3>> {
        Ok(self.element_node(element)?.bounds)
    }

    pub fn element_state(&self, element: ElementId) -> ImmResult<ElementState> {
        Ok(self.element_node(element)?.state())
    }

    /// Declared point capacity; 0 before init.
    pub fn element_point_count(&self, element: ElementId) -> ImmResult<u32> {
        Ok(self.element_node(element)?.points.len() as u32)
    }

    pub fn element_point(&self, element: ElementId, index: u32) -> ImmResult<Option<PaintPoint>> {
        let node = self.element_node(element)?;
        node.points
            .get(index as usize)
            .copied()
            .ok_or(ImmError::out_of_range("point", index, node.points.len() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LayerParent, LayerProps};
    use imm_core::{Color, ResourceBudget, SequenceType, Vec3};

    fn element_fixture() -> (ExportSession, DrawingId, ElementId) {
        let mut s = ExportSession::create(
            SequenceType::Still,
            30,
            Color::BLACK,
            ResourceBudget::unlimited(),
        )
        .unwrap();
        let layer = s
            .create_paint_layer(LayerParent::Root, LayerProps::new("p"))
            .unwrap();
        let drawing = s.create_drawing(layer).unwrap();
        s.drawing_init(drawing, 1, false).unwrap();
        let element = s.get_element(drawing, 0).unwrap();
        (s, drawing, element)
    }

    fn pt(x: f32) -> PaintPoint {
        PaintPoint::at(Vec3::new(x, 0.0, 0.0)).with_width(0.02)
    }

    #[test]
    fn test_set_point_before_init_rejected() {
        let (mut s, _, e) = element_fixture();
        assert!(matches!(
            s.set_point(e, 0, pt(0.0)),
            Err(ImmError::Initialization(_))
        ));
        assert_eq!(s.element_state(e).unwrap(), ElementState::Created);
    }

    #[test]
    fn test_init_once_and_capacity_checked() {
        let (mut s, _, e) = element_fixture();
        assert!(s
            .element_init(e, 0, BrushSectionType::Circle, VisibilityType::Always)
            .is_err());
        s.element_init(e, 4, BrushSectionType::Circle, VisibilityType::Always)
            .unwrap();
        assert!(matches!(
            s.element_init(e, 4, BrushSectionType::Circle, VisibilityType::Always),
            Err(ImmError::Initialization(_))
        ));
        assert_eq!(s.element_point_count(e).unwrap(), 4);
        assert_eq!(s.element_state(e).unwrap(), ElementState::Initialized);
    }

    #[test]
    fn test_set_point_range() {
        let (mut s, _, e) = element_fixture();
        s.element_init(e, 3, BrushSectionType::Segment, VisibilityType::FadePow2)
            .unwrap();
        for i in 0..3 {
            assert!(s.set_point(e, i, pt(i as f32)).is_ok());
        }
        for i in [3, 4, u32::MAX] {
            assert!(matches!(
                s.set_point(e, i, pt(9.0)),
                Err(ImmError::IndexOutOfRange { .. })
            ));
        }
        // Rejected writes leave existing points untouched.
        for i in 0..3 {
            assert_eq!(s.element_point(e, i).unwrap(), Some(pt(i as f32)));
        }
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let (mut s, _, e) = element_fixture();
        s.element_init(e, 1, BrushSectionType::Point, VisibilityType::Always)
            .unwrap();
        let bad = PaintPoint::at(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(s.set_point(e, 0, bad).is_err());
        assert_eq!(s.element_point(e, 0).unwrap(), None);
    }

    #[test]
    fn test_bounds_idempotent_and_invalidated_by_writes() {
        let (mut s, _, e) = element_fixture();
        s.element_init(e, 2, BrushSectionType::Circle, VisibilityType::Always)
            .unwrap();
        assert!(matches!(
            s.compute_element_bounds(e),
            Err(ImmError::Ordering(_))
        ));
        s.set_point(e, 0, pt(0.0)).unwrap();
        s.set_point(e, 1, pt(0.5)).unwrap();
        let first = s.compute_element_bounds(e).unwrap();
        let second = s.compute_element_bounds(e).unwrap();
        assert_eq!(first, second);
        assert!((first.min.x + 0.01).abs() < 1e-6);
        assert!((first.max.x - 0.51).abs() < 1e-6);
        assert_eq!(s.element_state(e).unwrap(), ElementState::BoundsComputed);

        s.set_point(e, 1, pt(2.0)).unwrap();
        assert_eq!(s.element_bounds(e).unwrap(), None);
        assert_eq!(s.element_state(e).unwrap(), ElementState::Populated);
        let third = s.compute_element_bounds(e).unwrap();
        assert!((third.max.x - 2.01).abs() < 1e-6);
    }

    #[test]
    fn test_overflowing_bounds_rejected() {
        let (mut s, d, e) = element_fixture();
        s.element_init(e, 2, BrushSectionType::Circle, VisibilityType::Always)
            .unwrap();
        s.set_point(e, 0, pt(0.0)).unwrap();
        s.compute_element_bounds(e).unwrap();
        s.compute_drawing_bounds(d).unwrap();

        let far = PaintPoint::at(Vec3::new(3.0e38, 0.0, 0.0)).with_width(2.0e38);
        s.set_point(e, 1, far).unwrap();
        assert!(matches!(
            s.compute_element_bounds(e),
            Err(ImmError::InvalidArgument(_))
        ));
        assert_eq!(s.element_bounds(e).unwrap(), None);
        assert_eq!(s.drawing_bounds(d).unwrap(), None);
        assert_eq!(s.element_state(e).unwrap(), ElementState::Populated);
    }

    #[test]
    fn test_bounds_from_partial_points() {
        let (mut s, _, e) = element_fixture();
        s.element_init(e, 4, BrushSectionType::Square, VisibilityType::Always)
            .unwrap();
        s.set_point(e, 2, pt(1.0)).unwrap();
        let b = s.compute_element_bounds(e).unwrap();
        assert!((b.center().x - 1.0).abs() < 1e-6);
    }
}
