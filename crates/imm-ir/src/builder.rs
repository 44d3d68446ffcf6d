use imm_core::{
    Bounds3, BrushSectionType, Color, ExportConfig, ImmError, ImmResult, PaintPoint,
    ResourceBudget, SequenceSettings, SequenceType, Vec3, VisibilityType,
};

use crate::arena::ElementId;
use crate::session::ExportSession;

/// A builder for opening an [`ExportSession`] with non-default settings.
pub struct SessionBuilder {
    settings: SequenceSettings,
    budget: ResourceBudget,
}

impl SessionBuilder {
    pub fn new(sequence_type: SequenceType) -> Self {
        Self {
            settings: SequenceSettings {
                sequence_type,
                ..SequenceSettings::default()
            },
            budget: ResourceBudget::unlimited(),
        }
    }

    /// Start from the `[sequence]` and `[budget]` tables of a config file.
    pub fn from_config(config: &ExportConfig) -> ImmResult<Self> {
        Ok(Self {
            settings: config.sequence_settings()?,
            budget: config.budget,
        })
    }

    pub fn frame_rate(&mut self, fps: u32) -> &mut Self {
        self.settings.frame_rate = fps;
        self
    }

    pub fn background(&mut self, color: Color) -> &mut Self {
        self.settings.background = color;
        self
    }

    pub fn caps(&mut self, caps: u8) -> &mut Self {
        self.settings.caps = caps;
        self
    }

    pub fn budget(&mut self, budget: ResourceBudget) -> &mut Self {
        self.budget = budget;
        self
    }

    /// Open the session.
    pub fn create(&self) -> ImmResult<ExportSession> {
        ExportSession::create_with(self.settings.clone(), self.budget)
    }
}

/// Collects the points of one stroke and writes them into an element.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    brush: BrushSectionType,
    visibility: VisibilityType,
    points: Vec<PaintPoint>,
}

impl StrokeBuilder {
    pub fn new(brush: BrushSectionType, visibility: VisibilityType) -> Self {
        Self {
            brush,
            visibility,
            points: Vec::new(),
        }
    }

    /// A straight stroke of `samples` evenly spaced points from `from` to
    /// `to`. Length and time both run with the sample parameter `t` in
    /// [0, 1], so the stroke paints in at constant speed over one time unit.
    pub fn line(
        brush: BrushSectionType,
        visibility: VisibilityType,
        from: Vec3,
        to: Vec3,
        samples: u32,
        width: f32,
        color: Color,
    ) -> Self {
        let mut stroke = Self::new(brush, visibility);
        let last = samples.saturating_sub(1).max(1) as f32;
        for i in 0..samples {
            let t = i as f32 / last;
            stroke.point(
                PaintPoint::at(from.lerp(&to, t))
                    .with_width(width)
                    .with_color(color, 1.0)
                    .with_progress(t, t),
            );
        }
        stroke
    }

    pub fn point(&mut self, point: PaintPoint) -> &mut Self {
        self.points.push(point);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Initialize `element` for this stroke, set every point and compute the
    /// element bounds.
    pub fn write_to(&self, session: &mut ExportSession, element: ElementId) -> ImmResult<Bounds3> {
        let count = u32::try_from(self.points.len())
            .map_err(|_| ImmError::InvalidArgument("stroke has too many points".into()))?;
        session.element_init(element, count, self.brush, self.visibility)?;
        for (index, point) in (0..count).zip(&self.points) {
            session.set_point(element, index, *point)?;
        }
        session.compute_element_bounds(element)
    }
}
