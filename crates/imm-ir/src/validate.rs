use std::collections::HashSet;

use imm_core::{Document, DocumentStats, ImmError, ImmResult, LayerRecord, ResourceBudget};

use crate::layer::MAX_LAYER_DEPTH;

/// Validate a committed document before it is handed to a sink.
///
/// Structural problems and budget overruns are all collected; the caller
/// decides how many to report.
pub fn validate_document(document: &Document) -> Result<(), Vec<ImmError>> {
    let mut errors = Vec::new();

    if document.sequence.frame_rate == 0 {
        errors.push(ImmError::InvalidArgument(
            "document frame rate must be positive".into(),
        ));
    }

    document.walk(|layer, depth| {
        if depth >= MAX_LAYER_DEPTH {
            errors.push(ImmError::InvalidArgument(format!(
                "layer '{}' is nested {} deep, beyond the maximum of {}",
                layer.name,
                depth + 1,
                MAX_LAYER_DEPTH
            )));
        }
        validate_layer(layer, &mut errors);
    });

    if let Err(e) = check_budget(&document.stats(), &document.budget) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_layer(layer: &LayerRecord, errors: &mut Vec<ImmError>) {
    if !(0.0..=1.0).contains(&layer.opacity) {
        errors.push(ImmError::InvalidArgument(format!(
            "layer '{}' opacity {} is outside [0, 1]",
            layer.name, layer.opacity
        )));
    }

    let mut seen = HashSet::new();
    let mut previous = None;
    for frame in layer.frames() {
        if !seen.insert(frame.index) {
            errors.push(ImmError::InvalidArgument(format!(
                "duplicate frame index {} in layer '{}'",
                frame.index, layer.name
            )));
        }
        if previous.is_some_and(|p| p > frame.index) {
            errors.push(ImmError::InvalidArgument(format!(
                "frames of layer '{}' are not ordered by index",
                layer.name
            )));
        }
        previous = Some(frame.index);

        // Non-finite floats serialize as null and cannot be read back.
        if !frame.bounds.is_finite() {
            errors.push(ImmError::InvalidArgument(format!(
                "frame {} in layer '{}' has non-finite bounds",
                frame.index, layer.name
            )));
        }

        for (i, element) in frame.elements.iter().enumerate() {
            if !element.bounds.is_finite() || !element.points.iter().all(|p| p.is_finite()) {
                errors.push(ImmError::InvalidArgument(format!(
                    "element {} of frame {} in layer '{}' has non-finite values",
                    i, frame.index, layer.name
                )));
            }
            if element.points.is_empty() {
                errors.push(ImmError::InvalidArgument(format!(
                    "element {} of frame {} in layer '{}' has no points",
                    i, frame.index, layer.name
                )));
            }
        }
    }
}

/// Compare document totals against the budget ceilings. A zero ceiling is
/// unlimited.
pub fn check_budget(stats: &DocumentStats, budget: &ResourceBudget) -> ImmResult<()> {
    let checks = [
        ("memory", stats.memory, budget.max_memory),
        ("render calls", stats.render_calls, budget.max_render_calls),
        ("triangles", stats.triangles, budget.max_triangles),
        ("sound channels", stats.sound_channels, budget.max_sound_channels),
    ];
    for (resource, required, ceiling) in checks {
        if ceiling > 0 && required > ceiling {
            return Err(ImmError::BudgetExceeded {
                resource,
                required,
                ceiling,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imm_core::{
        Bounds3, BrushSectionType, ElementRecord, FrameRecord, LayerContent, PaintPoint,
        SequenceSettings, Transform3D, Vec3, VisibilityType,
    };

    fn frame(index: u32, points: usize) -> FrameRecord {
        FrameRecord {
            index,
            flipped: false,
            bounds: Bounds3::around(Vec3::ZERO, 1.0),
            elements: vec![ElementRecord {
                brush: BrushSectionType::Circle,
                visibility: VisibilityType::Always,
                bounds: Bounds3::around(Vec3::ZERO, 1.0),
                points: vec![PaintPoint::at(Vec3::ZERO); points],
            }],
        }
    }

    fn layer(name: &str, content: LayerContent) -> LayerRecord {
        LayerRecord {
            name: name.into(),
            visible: true,
            opacity: 1.0,
            transform: Transform3D::IDENTITY,
            pivot: Transform3D::IDENTITY,
            timeline: None,
            content,
        }
    }

    fn document(frames: Vec<FrameRecord>, budget: ResourceBudget) -> Document {
        Document {
            id: "doc".into(),
            sequence: SequenceSettings::default(),
            budget,
            layers: vec![layer(
                "p",
                LayerContent::Paint {
                    drawings_created: frames.len() as u32,
                    frames,
                },
            )],
        }
    }

    #[test]
    fn test_valid_document() {
        let doc = document(vec![frame(0, 4), frame(1, 2)], ResourceBudget::unlimited());
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_duplicate_and_unordered_frames() {
        let doc = document(
            vec![frame(1, 2), frame(0, 2), frame(0, 2)],
            ResourceBudget::unlimited(),
        );
        let errors = validate_document(&doc).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_element_rejected() {
        let doc = document(vec![frame(0, 0)], ResourceBudget::unlimited());
        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut overflowed = frame(0, 2);
        overflowed.bounds.max.x = f32::INFINITY;
        let doc = document(vec![overflowed], ResourceBudget::unlimited());
        assert_eq!(validate_document(&doc).unwrap_err().len(), 1);

        let mut element_overflow = frame(0, 2);
        element_overflow.elements[0].bounds.min.y = f32::NEG_INFINITY;
        let doc = document(vec![element_overflow], ResourceBudget::unlimited());
        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn test_nesting_beyond_limit_rejected() {
        let mut deepest = layer(
            "leaf",
            LayerContent::Paint {
                drawings_created: 0,
                frames: Vec::new(),
            },
        );
        for depth in 1..MAX_LAYER_DEPTH {
            deepest = layer(
                &format!("g{}", depth),
                LayerContent::Group {
                    children: vec![deepest],
                },
            );
        }
        let mut doc = document(Vec::new(), ResourceBudget::unlimited());
        doc.layers = vec![deepest];
        assert!(validate_document(&doc).is_ok());

        let wrapped = layer(
            "outer",
            LayerContent::Group {
                children: std::mem::take(&mut doc.layers),
            },
        );
        doc.layers = vec![wrapped];
        let errors = validate_document(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_render_call_budget() {
        let budget = ResourceBudget {
            max_render_calls: 1,
            ..Default::default()
        };
        let doc = document(vec![frame(0, 2), frame(1, 2)], budget);
        let errors = validate_document(&doc).unwrap_err();
        assert!(matches!(
            errors[0],
            ImmError::BudgetExceeded {
                resource: "render calls",
                required: 2,
                ceiling: 1
            }
        ));
    }

    #[test]
    fn test_zero_ceiling_is_unlimited() {
        let stats = DocumentStats {
            memory: i64::MAX,
            triangles: 1_000_000,
            ..Default::default()
        };
        assert!(check_budget(&stats, &ResourceBudget::unlimited()).is_ok());
    }

    #[test]
    fn test_budget_at_ceiling_passes() {
        let stats = DocumentStats {
            triangles: 48,
            ..Default::default()
        };
        let budget = ResourceBudget {
            max_triangles: 48,
            ..Default::default()
        };
        assert!(check_budget(&stats, &budget).is_ok());
        let tighter = ResourceBudget {
            max_triangles: 47,
            ..budget
        };
        assert!(check_budget(&stats, &tighter).is_err());
    }
}
