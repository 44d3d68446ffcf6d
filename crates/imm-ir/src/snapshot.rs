use imm_core::{Document, ImmResult, LayerContent, LayerRecord};

use crate::arena::LayerId;
use crate::layer::LayerKind;
use crate::session::ExportSession;

impl ExportSession {
    /// Copy the committed state of the session into an owned [`Document`].
    ///
    /// Only frames that were added with [`add_frame`](Self::add_frame) are
    /// included; drawings still being authored are ignored.
    pub fn snapshot(&self) -> ImmResult<Document> {
        self.ensure_open("snapshot")?;
        let layers = self
            .roots
            .iter()
            .map(|id| self.layer_record(*id))
            .collect::<ImmResult<Vec<_>>>()?;
        Ok(Document {
            id: self.document_id().to_string(),
            sequence: self.settings().clone(),
            budget: *self.budget(),
            layers,
        })
    }

    fn layer_record(&self, id: LayerId) -> ImmResult<LayerRecord> {
        let node = self.layer_node(id)?;
        let content = match &node.kind {
            LayerKind::Group { children } => LayerContent::Group {
                children: children
                    .iter()
                    .map(|child| self.layer_record(*child))
                    .collect::<ImmResult<Vec<_>>>()?,
            },
            LayerKind::Paint {
                next_frame_index,
                frames,
            } => LayerContent::Paint {
                frames: frames.clone(),
                drawings_created: *next_frame_index,
            },
        };
        Ok(LayerRecord {
            name: node.props.name.clone(),
            visible: node.props.visible,
            opacity: node.props.opacity,
            transform: node.props.transform,
            pivot: node.props.pivot,
            timeline: node.props.timeline,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::layer::{LayerParent, LayerProps};
    use crate::session::ExportSession;
    use imm_core::{
        BrushSectionType, Color, LayerType, PaintPoint, ResourceBudget, SequenceType, Vec3,
        VisibilityType,
    };

    #[test]
    fn test_snapshot_mirrors_tree() {
        let mut s = ExportSession::create(
            SequenceType::Animated,
            12,
            Color::WHITE,
            ResourceBudget::unlimited(),
        )
        .unwrap();
        let g = s
            .create_group_layer(LayerParent::Root, LayerProps::new("g").with_timeline(480, 2))
            .unwrap();
        let p = s.create_paint_layer(g, LayerProps::new("p")).unwrap();

        let committed = s.create_drawing(p).unwrap();
        s.drawing_init(committed, 1, false).unwrap();
        let e = s.get_element(committed, 0).unwrap();
        s.element_init(e, 1, BrushSectionType::Point, VisibilityType::Always)
            .unwrap();
        s.set_point(e, 0, PaintPoint::at(Vec3::ONE)).unwrap();
        s.compute_element_bounds(e).unwrap();
        s.compute_drawing_bounds(committed).unwrap();
        s.add_frame(committed).unwrap();

        // Created but never committed.
        s.create_drawing(p).unwrap();

        let doc = s.snapshot().unwrap();
        assert_eq!(doc.id, s.document_id());
        assert_eq!(doc.sequence.frame_rate, 12);
        assert_eq!(doc.layers.len(), 1);
        let group = &doc.layers[0];
        assert_eq!(group.layer_type(), LayerType::Group);
        assert_eq!(group.timeline.map(|t| t.duration_ticks), Some(480));
        let paint = &group.children()[0];
        assert_eq!(paint.frames().len(), 1);
        assert_eq!(paint.frames()[0].elements[0].points[0].position, Vec3::ONE);

        let infos = doc.layer_infos();
        assert_eq!(infos[1].paint_num_drawings, 2);
        assert_eq!(infos[1].full_name, "g/p");
    }

    #[test]
    fn test_snapshot_is_stable() {
        let mut s = ExportSession::create(
            SequenceType::Still,
            30,
            Color::BLACK,
            ResourceBudget::unlimited(),
        )
        .unwrap();
        s.create_paint_layer(LayerParent::Root, LayerProps::new("")).unwrap();
        assert_eq!(s.snapshot().unwrap(), s.snapshot().unwrap());
    }
}
