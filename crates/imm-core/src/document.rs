//! The committed document: what an export session hands to a serialization
//! sink once authoring is finished.
//!
//! Everything here is plain owned data. Drawings that were never committed
//! do not appear; a paint layer only carries the frames added to it.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::math::{Bounds3, Transform3D};
use crate::point::PaintPoint;
use crate::types::{
    BrushSectionType, LayerType, ResourceBudget, SequenceType, Timeline, VisibilityType,
};

/// Sequence-wide metadata fixed when a session is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSettings {
    pub sequence_type: SequenceType,
    /// Frames per second.
    pub frame_rate: u32,
    pub background: Color,
    /// Capability bits passed through to the file header.
    pub caps: u8,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            sequence_type: SequenceType::Still,
            frame_rate: 30,
            background: Color::BLACK,
            caps: 0,
        }
    }
}

/// Top-level document, the root of the exported tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    pub sequence: SequenceSettings,
    pub budget: ResourceBudget,
    /// Root layers in creation order.
    pub layers: Vec<LayerRecord>,
}

/// What a layer holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerContent {
    Group {
        children: Vec<LayerRecord>,
    },
    Paint {
        /// Committed frames, ordered by frame index.
        frames: Vec<FrameRecord>,
        /// Drawings created on this layer, committed or not.
        drawings_created: u32,
    },
}

/// A layer node with its committed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub transform: Transform3D,
    pub pivot: Transform3D,
    pub timeline: Option<Timeline>,
    pub content: LayerContent,
}

impl LayerRecord {
    pub fn layer_type(&self) -> LayerType {
        match self.content {
            LayerContent::Group { .. } => LayerType::Group,
            LayerContent::Paint { .. } => LayerType::Paint,
        }
    }

    pub fn children(&self) -> &[LayerRecord] {
        match &self.content {
            LayerContent::Group { children } => children,
            LayerContent::Paint { .. } => &[],
        }
    }

    pub fn frames(&self) -> &[FrameRecord] {
        match &self.content {
            LayerContent::Group { .. } => &[],
            LayerContent::Paint { frames, .. } => frames,
        }
    }

    /// Union of all committed frame bounds.
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::union_all(self.frames().iter().map(|f| &f.bounds))
    }
}

/// One committed frame of a paint layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Index assigned when the drawing was created.
    pub index: u32,
    /// Whether the drawing's orientation is mirrored.
    pub flipped: bool,
    pub bounds: Bounds3,
    pub elements: Vec<ElementRecord>,
}

/// One stroke within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub brush: BrushSectionType,
    pub visibility: VisibilityType,
    pub bounds: Bounds3,
    pub points: Vec<PaintPoint>,
}

impl ElementRecord {
    /// Triangles the brush profile is tessellated into.
    pub fn triangle_count(&self) -> i64 {
        let segments = (self.points.len() as i64 - 1).max(1);
        segments * 2 * self.brush.sides()
    }
}

/// Aggregate counts used for budget enforcement and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub layers: i64,
    pub frames: i64,
    /// Committed elements; each is one render call.
    pub render_calls: i64,
    pub points: i64,
    pub triangles: i64,
    /// Estimated in-memory size in bytes.
    pub memory: i64,
    pub sound_channels: i64,
}

const POINT_BYTES: i64 = 64;
const ELEMENT_BYTES: i64 = 64;
const FRAME_BYTES: i64 = 128;
const LAYER_BYTES: i64 = 256;

/// Flattened view of one layer, as reported by a document inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Depth-first position in the tree.
    pub id: usize,
    pub kind: LayerType,
    pub parent_id: Option<usize>,
    pub is_timeline: bool,
    pub visible: bool,
    pub opacity: f32,
    pub bounds: Option<Bounds3>,
    pub num_children: usize,
    pub paint_num_drawings: u32,
    pub paint_num_frames: usize,
    pub paint_num_strokes: usize,
    pub name: String,
    /// Slash-separated names from the root down to this layer.
    pub full_name: String,
}

impl Document {
    /// Walk every layer depth-first, parents before children.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a LayerRecord, usize)) {
        fn go<'a>(
            layers: &'a [LayerRecord],
            depth: usize,
            visit: &mut impl FnMut(&'a LayerRecord, usize),
        ) {
            for layer in layers {
                visit(layer, depth);
                go(layer.children(), depth + 1, visit);
            }
        }
        go(&self.layers, 0, &mut visit);
    }

    /// Total number of layers in the tree.
    pub fn layer_count(&self) -> usize {
        let mut n = 0;
        self.walk(|_, _| n += 1);
        n
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        self.walk(|layer, _| {
            stats.layers += 1;
            for frame in layer.frames() {
                stats.frames += 1;
                for element in &frame.elements {
                    stats.render_calls += 1;
                    stats.points += element.points.len() as i64;
                    stats.triangles += element.triangle_count();
                }
            }
        });
        stats.memory = stats.layers * LAYER_BYTES
            + stats.frames * FRAME_BYTES
            + stats.render_calls * ELEMENT_BYTES
            + stats.points * POINT_BYTES;
        stats
    }

    /// Depth-first list of per-layer summaries.
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        let mut out = Vec::new();
        let mut path: Vec<String> = Vec::new();
        collect_infos(&self.layers, None, &mut path, &mut out);
        out
    }
}

fn collect_infos(
    layers: &[LayerRecord],
    parent_id: Option<usize>,
    path: &mut Vec<String>,
    out: &mut Vec<LayerInfo>,
) {
    for layer in layers {
        let id = out.len();
        path.push(layer.name.clone());
        let (drawings, frames, strokes) = match &layer.content {
            LayerContent::Group { .. } => (0, 0, 0),
            LayerContent::Paint {
                frames,
                drawings_created,
            } => (
                *drawings_created,
                frames.len(),
                frames.iter().map(|f| f.elements.len()).sum(),
            ),
        };
        out.push(LayerInfo {
            id,
            kind: layer.layer_type(),
            parent_id,
            is_timeline: layer.timeline.is_some(),
            visible: layer.visible,
            opacity: layer.opacity,
            bounds: layer.bounds(),
            num_children: layer.children().len(),
            paint_num_drawings: drawings,
            paint_num_frames: frames,
            paint_num_strokes: strokes,
            name: layer.name.clone(),
            full_name: path.join("/"),
        });
        collect_infos(layer.children(), Some(id), path, out);
        path.pop();
    }
}
