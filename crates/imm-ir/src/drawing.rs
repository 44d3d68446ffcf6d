//! Drawings: the transient authoring objects that become paint-layer frames.
//!
//! A drawing moves strictly forward through
//! `Created → Initialized → Populated → BoundsComputed → Committed`.
//! Committing copies the content into the owning paint layer; the drawing
//! itself stays allocated until it is destroyed (or its session is).

use imm_core::{Bounds3, FrameRecord, ImmError, ImmResult};

use crate::arena::{DrawingId, ElementId, LayerId};
use crate::element::{ElementNode, ElementState};
use crate::layer::LayerKind;
use crate::session::ExportSession;

/// Upper bound on the elements a single drawing may declare.
pub const MAX_ELEMENTS_PER_DRAWING: u32 = 1 << 16;

/// Authoring progress of a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawingState {
    Created,
    Initialized,
    Populated,
    BoundsComputed,
    Committed,
}

#[derive(Debug)]
pub(crate) struct DrawingNode {
    pub(crate) layer: LayerId,
    pub(crate) index: u32,
    pub(crate) flipped: bool,
    pub(crate) initialized: bool,
    pub(crate) elements: Vec<ElementId>,
    pub(crate) bounds: Option<Bounds3>,
    pub(crate) committed: bool,
}

impl ExportSession {
    /// Start a new frame on a paint layer.
    ///
    /// The drawing is assigned the layer's next frame index (0, 1, 2, ...).
    /// Indices are never reused, even if a drawing is destroyed uncommitted.
    pub fn create_drawing(&mut self, layer: LayerId) -> ImmResult<DrawingId> {
        let session = self.id();
        let node = self.layer_node_mut(layer)?;
        let index = match &mut node.kind {
            LayerKind::Paint {
                next_frame_index, ..
            } => {
                let index = *next_frame_index;
                *next_frame_index = index
                    .checked_add(1)
                    .ok_or_else(|| ImmError::Creation("frame index space exhausted".into()))?;
                index
            }
            LayerKind::Group { .. } => {
                return Err(ImmError::Creation(format!(
                    "layer '{}' is not a paint layer",
                    node.props.name
                )))
            }
        };

        let slot = self.drawings.insert(DrawingNode {
            layer,
            index,
            flipped: false,
            initialized: false,
            elements: Vec::new(),
            bounds: None,
            committed: false,
        });
        Ok(DrawingId { session, slot })
    }

    /// Frame index assigned when the drawing was created.
    pub fn drawing_index(&self, drawing: DrawingId) -> ImmResult<u32> {
        Ok(self.drawing_node(drawing)?.index)
    }

    pub fn drawing_state(&self, drawing: DrawingId) -> ImmResult<DrawingState> {
        let node = self.drawing_node(drawing)?;
        if node.committed {
            return Ok(DrawingState::Committed);
        }
        if !node.initialized {
            return Ok(DrawingState::Created);
        }
        if node.bounds.is_some() {
            return Ok(DrawingState::BoundsComputed);
        }
        let populated = node.elements.iter().any(|e| {
            self.elements
                .get(e.slot)
                .is_some_and(|n| n.state() >= ElementState::Populated)
        });
        Ok(if populated {
            DrawingState::Populated
        } else {
            DrawingState::Initialized
        })
    }

    /// Declare the element capacity. Must be called exactly once, before any
    /// element is accessed. `flipped` is carried through to the frame.
    pub fn drawing_init(
        &mut self,
        drawing: DrawingId,
        num_elements: u32,
        flipped: bool,
    ) -> ImmResult<()> {
        self.ensure_drawing_editable(drawing)?;
        if num_elements == 0 || num_elements > MAX_ELEMENTS_PER_DRAWING {
            return Err(ImmError::Initialization(format!(
                "drawing element count {} must be in 1..={}",
                num_elements, MAX_ELEMENTS_PER_DRAWING
            )));
        }
        if self.drawing_node(drawing)?.initialized {
            return Err(ImmError::Initialization("drawing already initialized".into()));
        }

        let session = self.id();
        let elements: Vec<ElementId> = (0..num_elements)
            .map(|_| ElementId {
                session,
                slot: self.elements.insert(ElementNode::new(drawing)),
            })
            .collect();

        let node = self.drawing_node_mut(drawing)?;
        node.initialized = true;
        node.flipped = flipped;
        node.elements = elements;
        Ok(())
    }

    /// Handle to element slot `index`, or `None` when the index is outside
    /// the declared capacity, the drawing is not initialized, or the handle
    /// is no longer valid.
    pub fn get_element(&self, drawing: DrawingId, index: u32) -> Option<ElementId> {
        self.drawing_node(drawing)
            .ok()?
            .elements
            .get(index as usize)
            .copied()
    }

    /// Declared element capacity; 0 before init.
    pub fn drawing_element_count(&self, drawing: DrawingId) -> ImmResult<u32> {
        Ok(self.drawing_node(drawing)?.elements.len() as u32)
    }

    /// Aggregate the bounds of every element that has computed its own.
    pub fn compute_drawing_bounds(&mut self, drawing: DrawingId) -> ImmResult<Bounds3> {
        self.ensure_drawing_editable(drawing)?;
        let node = self.drawing_node(drawing)?;
        if !node.initialized {
            return Err(ImmError::Initialization(
                "compute_bounds before drawing init".into(),
            ));
        }
        let boxes: Vec<Bounds3> = node
            .elements
            .iter()
            .filter_map(|e| self.elements.get(e.slot).and_then(|n| n.bounds))
            .collect();
        let bounds = Bounds3::union_all(&boxes)
            .ok_or_else(|| ImmError::Ordering("no element has computed bounds".into()))?;
        if !bounds.is_finite() {
            return Err(ImmError::InvalidArgument(
                "drawing bounds are not finite".into(),
            ));
        }
        self.drawing_node_mut(drawing)?.bounds = Some(bounds);
        Ok(bounds)
    }

    pub fn drawing_bounds(&self, drawing: DrawingId) -> ImmResult<Option<Bounds3>> {
        Ok(self.drawing_node(drawing)?.bounds)
    }

    /// Commit the drawing as a frame of its paint layer, at the index it was
    /// assigned on creation. Returns that index.
    ///
    /// Every element must be initialized, fully populated and have current
    /// bounds, and the drawing bounds must have been computed after the last
    /// element change.
    pub fn add_frame(&mut self, drawing: DrawingId) -> ImmResult<u32> {
        self.ensure_drawing_editable(drawing)?;
        let node = self.drawing_node(drawing)?;
        if !node.initialized {
            return Err(ImmError::Initialization(
                "add_frame before drawing init".into(),
            ));
        }
        let bounds = node.bounds.ok_or_else(|| {
            ImmError::Ordering("add_frame before compute_bounds".into())
        })?;

        let mut elements = Vec::with_capacity(node.elements.len());
        for (i, id) in node.elements.iter().enumerate() {
            let element = self
                .elements
                .get(id.slot)
                .ok_or_else(|| ImmError::StaleHandle(format!("element {}", i)))?;
            let record = element.to_record().ok_or_else(|| {
                ImmError::Ordering(format!(
                    "element {} is {:?}; it must be fully populated with computed bounds",
                    i,
                    element.state()
                ))
            })?;
            elements.push(record);
        }

        let frame = FrameRecord {
            index: node.index,
            flipped: node.flipped,
            bounds,
            elements,
        };
        let layer = node.layer;
        let index = frame.index;

        match &mut self.layer_node_mut(layer)?.kind {
            LayerKind::Paint { frames, .. } => {
                let at = frames.partition_point(|f| f.index < index);
                frames.insert(at, frame);
            }
            LayerKind::Group { .. } => {
                return Err(ImmError::StaleHandle("drawing owner is not a paint layer".into()))
            }
        }
        self.drawing_node_mut(drawing)?.committed = true;

        tracing::debug!("Committed frame {} to layer {:?}", index, layer);
        Ok(index)
    }

    /// Release a drawing and its elements. Committed frames are unaffected.
    pub fn destroy_drawing(&mut self, drawing: DrawingId) -> ImmResult<()> {
        self.drawing_node(drawing)?;
        let node = self
            .drawings
            .remove(drawing.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", drawing)))?;
        for element in &node.elements {
            self.elements.remove(element.slot);
        }
        if !node.committed {
            tracing::debug!(
                "Discarded uncommitted drawing for frame {} of layer {:?}",
                node.index,
                node.layer
            );
        }
        Ok(())
    }

    /// Create a drawing on `layer`, run `build` with it, and destroy the
    /// drawing afterwards whether or not `build` succeeded.
    pub fn with_drawing<T>(
        &mut self,
        layer: LayerId,
        build: impl FnOnce(&mut ExportSession, DrawingId) -> ImmResult<T>,
    ) -> ImmResult<T> {
        let drawing = self.create_drawing(layer)?;
        let result = build(self, drawing);
        if let Err(e) = self.destroy_drawing(drawing) {
            tracing::debug!("Drawing {:?} already released: {}", drawing, e);
        }
        result
    }

    pub(crate) fn ensure_drawing_editable(&self, drawing: DrawingId) -> ImmResult<()> {
        if self.drawing_node(drawing)?.committed {
            return Err(ImmError::Ordering(
                "drawing has already been added as a frame".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn invalidate_drawing_bounds(&mut self, drawing: DrawingId) -> ImmResult<()> {
        self.drawing_node_mut(drawing)?.bounds = None;
        Ok(())
    }
}
