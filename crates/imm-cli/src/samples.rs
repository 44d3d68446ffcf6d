//! The two reference documents the CLI can export: a single stroke on a root
//! paint layer, and the same stroke nested two groups deep.

use imm_core::{BrushSectionType, Color, ImmError, ImmResult, Vec3, VisibilityType};
use imm_ir::{ExportSession, LayerId, LayerParent, LayerProps, SessionBuilder, StrokeBuilder};

/// Four samples along +X, 0.5 units long, painted over one time unit.
fn sample_stroke() -> StrokeBuilder {
    StrokeBuilder::line(
        BrushSectionType::Circle,
        VisibilityType::Always,
        Vec3::ZERO,
        Vec3::new(0.5, 0.0, 0.0),
        4,
        0.02,
        Color::WHITE,
    )
}

fn commit_stroke(session: &mut ExportSession, layer: LayerId) -> ImmResult<u32> {
    session.with_drawing(layer, |s, drawing| {
        s.drawing_init(drawing, 1, false)?;
        let element = s
            .get_element(drawing, 0)
            .ok_or_else(|| ImmError::InvalidArgument("drawing has no element 0".into()))?;
        sample_stroke().write_to(s, element)?;
        s.compute_drawing_bounds(drawing)?;
        s.add_frame(drawing)
    })
}

/// A paint layer named `StrokeLayer` at the root holding one stroke.
pub fn single_stroke(builder: &SessionBuilder) -> ImmResult<ExportSession> {
    let mut session = builder.create()?;
    let layer = session.create_paint_layer(LayerParent::Root, LayerProps::new("StrokeLayer"))?;
    let index = commit_stroke(&mut session, layer)?;
    tracing::debug!("Sample stroke committed as frame {}", index);
    Ok(session)
}

/// `RootGroup/ChildGroup/StrokeLayer` holding one stroke.
pub fn grouped_stroke(builder: &SessionBuilder) -> ImmResult<ExportSession> {
    let mut session = builder.create()?;
    let root = session.create_group_layer(LayerParent::Root, LayerProps::new("RootGroup"))?;
    let child = session.create_group_layer(root, LayerProps::new("ChildGroup"))?;
    let layer = session.create_paint_layer(child, LayerProps::new("StrokeLayer"))?;
    let index = commit_stroke(&mut session, layer)?;
    tracing::debug!("Grouped stroke committed as frame {}", index);
    Ok(session)
}
