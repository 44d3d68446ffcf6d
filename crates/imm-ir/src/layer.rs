use imm_core::{FrameRecord, ImmError, ImmResult, LayerType, Timeline, Transform3D, Vec3};

use crate::arena::LayerId;
use crate::session::ExportSession;

/// Deepest nesting a layer may sit at; root layers are at depth 1.
pub const MAX_LAYER_DEPTH: usize = 24;

/// Where a new layer is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerParent {
    /// The session's root layer list.
    Root,
    /// A group layer.
    Layer(LayerId),
}

impl From<LayerId> for LayerParent {
    fn from(id: LayerId) -> Self {
        LayerParent::Layer(id)
    }
}

/// Properties fixed when a layer is created.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProps {
    /// Layer name; empty means the kind's default name.
    pub name: String,
    pub visible: bool,
    /// Opacity in [0.0, 1.0].
    pub opacity: f32,
    pub transform: Transform3D,
    pub pivot: Transform3D,
    /// Present for layers that play on their own timeline.
    pub timeline: Option<Timeline>,
}

impl LayerProps {
    /// Visible, fully opaque, identity transform and pivot.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            opacity: 1.0,
            transform: Transform3D::IDENTITY,
            pivot: Transform3D::IDENTITY,
            timeline: None,
        }
    }

    /// Builder: set visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder: set opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder: set the local transform.
    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: set only the local translation.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: set the pivot transform.
    pub fn with_pivot(mut self, pivot: Transform3D) -> Self {
        self.pivot = pivot;
        self
    }

    /// Builder: play this layer on its own timeline.
    pub fn with_timeline(mut self, duration_ticks: i64, max_repeat_count: u32) -> Self {
        self.timeline = Some(Timeline {
            duration_ticks,
            max_repeat_count,
        });
        self
    }

    fn validate(&self) -> ImmResult<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ImmError::Creation(format!(
                "layer '{}' opacity {} is outside [0, 1]",
                self.name, self.opacity
            )));
        }
        if !self.transform.is_valid() {
            return Err(ImmError::Creation(format!(
                "layer '{}' has an invalid transform",
                self.name
            )));
        }
        if !self.pivot.is_valid() {
            return Err(ImmError::Creation(format!(
                "layer '{}' has an invalid pivot",
                self.name
            )));
        }
        if let Some(t) = &self.timeline {
            if t.duration_ticks < 0 {
                return Err(ImmError::Creation(format!(
                    "layer '{}' timeline duration is negative",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) enum LayerKind {
    Group {
        children: Vec<LayerId>,
    },
    Paint {
        /// Index handed to the next drawing created on this layer.
        next_frame_index: u32,
        /// Committed frames, kept sorted by index.
        frames: Vec<FrameRecord>,
    },
}

#[derive(Debug)]
pub(crate) struct LayerNode {
    pub(crate) props: LayerProps,
    pub(crate) parent: Option<LayerId>,
    pub(crate) kind: LayerKind,
}

impl LayerNode {
    pub(crate) fn layer_type(&self) -> LayerType {
        match self.kind {
            LayerKind::Group { .. } => LayerType::Group,
            LayerKind::Paint { .. } => LayerType::Paint,
        }
    }
}

impl ExportSession {
    /// Create a group layer under `parent`, appended after its existing children.
    pub fn create_group_layer(
        &mut self,
        parent: impl Into<LayerParent>,
        props: LayerProps,
    ) -> ImmResult<LayerId> {
        self.insert_layer(
            parent.into(),
            props,
            LayerKind::Group {
                children: Vec::new(),
            },
        )
    }

    /// Create a paint layer under `parent`, appended after its existing children.
    pub fn create_paint_layer(
        &mut self,
        parent: impl Into<LayerParent>,
        props: LayerProps,
    ) -> ImmResult<LayerId> {
        self.insert_layer(
            parent.into(),
            props,
            LayerKind::Paint {
                next_frame_index: 0,
                frames: Vec::new(),
            },
        )
    }

    fn insert_layer(
        &mut self,
        parent: LayerParent,
        mut props: LayerProps,
        kind: LayerKind,
    ) -> ImmResult<LayerId> {
        self.ensure_open("create layer")?;
        props.validate()?;

        // Check the parent before allocating so a failure leaves no node behind.
        let parent_id = match parent {
            LayerParent::Root => None,
            LayerParent::Layer(id) => {
                let node = self
                    .layer_node(id)
                    .map_err(|e| ImmError::Creation(format!("parent layer: {}", e)))?;
                if node.layer_type() != LayerType::Group {
                    return Err(ImmError::Creation(format!(
                        "parent layer '{}' is not a group",
                        node.props.name
                    )));
                }
                let depth = self.layer_depth(id)? + 1;
                if depth > MAX_LAYER_DEPTH {
                    return Err(ImmError::Creation(format!(
                        "layer depth {} exceeds the maximum of {}",
                        depth, MAX_LAYER_DEPTH
                    )));
                }
                Some(id)
            }
        };

        let layer_type = match kind {
            LayerKind::Group { .. } => LayerType::Group,
            LayerKind::Paint { .. } => LayerType::Paint,
        };
        if props.name.is_empty() {
            props.name = layer_type.default_name().to_string();
        }

        let slot = self.layers.insert(LayerNode {
            props,
            parent: parent_id,
            kind,
        });
        let id = LayerId {
            session: self.id(),
            slot,
        };

        match parent_id {
            None => self.roots.push(id),
            Some(parent_id) => match self.layer_node_mut(parent_id) {
                Ok(LayerNode {
                    kind: LayerKind::Group { children },
                    ..
                }) => children.push(id),
                other => {
                    let err = match other {
                        Err(e) => ImmError::Creation(format!("parent layer: {}", e)),
                        Ok(_) => ImmError::Creation("parent layer is not a group".into()),
                    };
                    self.layers.remove(slot);
                    return Err(err);
                }
            },
        }

        tracing::debug!("Created {} layer {:?} under {:?}", layer_type, id, parent);
        Ok(id)
    }

    /// Root layers in creation order.
    pub fn root_layers(&self) -> ImmResult<&[LayerId]> {
        self.ensure_open("root layers")?;
        Ok(&self.roots)
    }

    pub fn layer_kind(&self, layer: LayerId) -> ImmResult<LayerType> {
        Ok(self.layer_node(layer)?.layer_type())
    }

    pub fn layer_props(&self, layer: LayerId) -> ImmResult<&LayerProps> {
        Ok(&self.layer_node(layer)?.props)
    }

    pub fn layer_parent(&self, layer: LayerId) -> ImmResult<LayerParent> {
        Ok(match self.layer_node(layer)?.parent {
            Some(parent) => LayerParent::Layer(parent),
            None => LayerParent::Root,
        })
    }

    /// Parents of `layer`, nearest first, ending with [`LayerParent::Root`].
    pub fn ancestors(&self, layer: LayerId) -> ImmResult<Vec<LayerParent>> {
        let mut chain = Vec::new();
        let mut current = self.layer_node(layer)?.parent;
        while let Some(id) = current {
            chain.push(LayerParent::Layer(id));
            current = self.layer_node(id)?.parent;
        }
        chain.push(LayerParent::Root);
        Ok(chain)
    }

    /// Nesting depth of `layer`; root layers are at depth 1.
    pub fn layer_depth(&self, layer: LayerId) -> ImmResult<usize> {
        let mut depth = 1;
        let mut current = self.layer_node(layer)?.parent;
        while let Some(id) = current {
            depth += 1;
            current = self.layer_node(id)?.parent;
        }
        Ok(depth)
    }

    /// Children of a group layer in creation order; empty for paint layers.
    pub fn children(&self, layer: LayerId) -> ImmResult<&[LayerId]> {
        Ok(match &self.layer_node(layer)?.kind {
            LayerKind::Group { children } => children,
            LayerKind::Paint { .. } => &[],
        })
    }

    /// Indices of the frames committed to a paint layer, ascending.
    pub fn frame_indices(&self, layer: LayerId) -> ImmResult<Vec<u32>> {
        match &self.layer_node(layer)?.kind {
            LayerKind::Paint { frames, .. } => Ok(frames.iter().map(|f| f.index).collect()),
            LayerKind::Group { .. } => Err(ImmError::InvalidArgument(
                "group layers have no frames".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imm_core::{Color, Quat, ResourceBudget, SequenceType};

    fn session() -> ExportSession {
        ExportSession::create(
            SequenceType::Still,
            30,
            Color::BLACK,
            ResourceBudget::unlimited(),
        )
        .unwrap()
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut s = session();
        let a = s.create_paint_layer(LayerParent::Root, LayerProps::new("a")).unwrap();
        let g = s.create_group_layer(LayerParent::Root, LayerProps::new("g")).unwrap();
        let b = s.create_paint_layer(LayerParent::Root, LayerProps::new("b")).unwrap();
        assert_eq!(s.root_layers().unwrap(), &[a, g, b]);

        let c1 = s.create_paint_layer(g, LayerProps::new("c1")).unwrap();
        let c2 = s.create_group_layer(g, LayerProps::new("c2")).unwrap();
        assert_eq!(s.children(g).unwrap(), &[c1, c2]);
        assert!(s.children(a).unwrap().is_empty());
    }

    #[test]
    fn test_default_names() {
        let mut s = session();
        let g = s.create_group_layer(LayerParent::Root, LayerProps::new("")).unwrap();
        let p = s.create_paint_layer(g, LayerProps::new("")).unwrap();
        assert_eq!(s.layer_props(g).unwrap().name, "Group");
        assert_eq!(s.layer_props(p).unwrap().name, "Paint");
    }

    #[test]
    fn test_paint_parent_rejected_atomically() {
        let mut s = session();
        let p = s.create_paint_layer(LayerParent::Root, LayerProps::new("p")).unwrap();
        let before = s.layers.len();
        let result = s.create_group_layer(p, LayerProps::new("child"));
        assert!(matches!(result, Err(ImmError::Creation(_))));
        assert_eq!(s.layers.len(), before);
        assert_eq!(s.root_layers().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_props_rejected() {
        let mut s = session();
        assert!(s
            .create_paint_layer(LayerParent::Root, LayerProps::new("x").with_opacity(1.5))
            .is_err());
        assert!(s
            .create_paint_layer(LayerParent::Root, LayerProps::new("x").with_opacity(f32::NAN))
            .is_err());
        let skewed = Transform3D::new(Vec3::ZERO, Quat::new(1.0, 1.0, 0.0, 0.0), 1.0);
        assert!(s
            .create_group_layer(LayerParent::Root, LayerProps::new("x").with_transform(skewed))
            .is_err());
        assert!(s
            .create_group_layer(LayerParent::Root, LayerProps::new("x").with_timeline(-1, 0))
            .is_err());
        assert!(s.root_layers().unwrap().is_empty());
    }

    #[test]
    fn test_ancestor_chain() {
        let mut s = session();
        let root = s.create_group_layer(LayerParent::Root, LayerProps::new("RootGroup")).unwrap();
        let child = s.create_group_layer(root, LayerProps::new("ChildGroup")).unwrap();
        let paint = s.create_paint_layer(child, LayerProps::new("StrokeLayer")).unwrap();
        assert_eq!(
            s.ancestors(paint).unwrap(),
            vec![
                LayerParent::Layer(child),
                LayerParent::Layer(root),
                LayerParent::Root
            ]
        );
        assert_eq!(s.layer_parent(root).unwrap(), LayerParent::Root);
        assert_eq!(s.layer_kind(child).unwrap(), LayerType::Group);
    }

    #[test]
    fn test_nesting_depth_limited() {
        let mut s = session();
        let mut parent = s
            .create_group_layer(LayerParent::Root, LayerProps::new("g1"))
            .unwrap();
        for depth in 2..MAX_LAYER_DEPTH {
            parent = s
                .create_group_layer(parent, LayerProps::new(format!("g{}", depth)))
                .unwrap();
        }
        assert_eq!(s.layer_depth(parent).unwrap(), MAX_LAYER_DEPTH - 1);
        let deepest = s.create_paint_layer(parent, LayerProps::new("leaf")).unwrap();
        assert_eq!(s.layer_depth(deepest).unwrap(), MAX_LAYER_DEPTH);

        let group = s.create_group_layer(parent, LayerProps::new("last")).unwrap();
        let before = s.layers.len();
        assert!(matches!(
            s.create_paint_layer(group, LayerProps::new("too_deep")),
            Err(ImmError::Creation(_))
        ));
        assert!(matches!(
            s.create_group_layer(group, LayerProps::new("too_deep")),
            Err(ImmError::Creation(_))
        ));
        assert_eq!(s.layers.len(), before);
        assert!(s.children(group).unwrap().is_empty());
    }

    #[test]
    fn test_frame_indices_on_group_rejected() {
        let mut s = session();
        let g = s.create_group_layer(LayerParent::Root, LayerProps::new("g")).unwrap();
        assert!(s.frame_indices(g).is_err());
    }
}
