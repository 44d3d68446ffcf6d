use serde::{Deserialize, Serialize};

/// How a document plays back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceType {
    /// A single still scene.
    Still,
    /// A timed animation.
    Animated,
    /// A sequence of panels advanced by the viewer.
    Comic,
}

impl Default for SequenceType {
    fn default() -> Self {
        SequenceType::Still
    }
}

impl std::fmt::Display for SequenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceType::Still => write!(f, "still"),
            SequenceType::Animated => write!(f, "animated"),
            SequenceType::Comic => write!(f, "comic"),
        }
    }
}

/// Audio codec used for sound embedded in the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCodec {
    Opus,
    Ogg,
}

impl AudioCodec {
    /// Wire code stored in the container header.
    pub fn code(&self) -> u8 {
        match self {
            AudioCodec::Opus => 0,
            AudioCodec::Ogg => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AudioCodec::Opus),
            1 => Some(AudioCodec::Ogg),
            _ => None,
        }
    }
}

impl Default for AudioCodec {
    fn default() -> Self {
        AudioCodec::Opus
    }
}

/// Audio encoding parameters passed to the export sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Target bitrate in bits per second.
    pub bitrate: u32,
    pub codec: AudioCodec,
}

impl AudioSettings {
    pub const DEFAULT_BITRATE: u32 = 96_000;

    pub fn new(bitrate: u32, codec: AudioCodec) -> Self {
        Self { bitrate, codec }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            bitrate: Self::DEFAULT_BITRATE,
            codec: AudioCodec::Opus,
        }
    }
}

/// Cross-section profile of the brush that renders an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrushSectionType {
    Point,
    Segment,
    Circle,
    Ellipse,
    Square,
}

impl BrushSectionType {
    /// Number of sides the profile is tessellated into along a stroke.
    pub fn sides(&self) -> i64 {
        match self {
            BrushSectionType::Point | BrushSectionType::Segment => 1,
            BrushSectionType::Circle | BrushSectionType::Ellipse => 8,
            BrushSectionType::Square => 4,
        }
    }
}

/// When an element is drawn relative to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityType {
    /// Faded out with the square of the viewing distance.
    FadePow2,
    /// Always drawn.
    Always,
}

/// The kind of a layer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    /// A container for other layers.
    Group,
    /// A container for committed stroke frames.
    Paint,
}

impl LayerType {
    /// Name given to a layer created without one.
    pub fn default_name(&self) -> &'static str {
        match self {
            LayerType::Group => "Group",
            LayerType::Paint => "Paint",
        }
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Group => write!(f, "group"),
            LayerType::Paint => write!(f, "paint"),
        }
    }
}

/// Ceilings the serialization backend enforces on a document.
///
/// Zero means "no explicit limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBudget {
    pub max_memory: i64,
    pub max_render_calls: i64,
    pub max_triangles: i64,
    pub max_sound_channels: i64,
}

impl ResourceBudget {
    /// A budget with no explicit limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// The first field that holds a negative ceiling, if any.
    pub fn first_negative(&self) -> Option<&'static str> {
        [
            ("max_memory", self.max_memory),
            ("max_render_calls", self.max_render_calls),
            ("max_triangles", self.max_triangles),
            ("max_sound_channels", self.max_sound_channels),
        ]
        .into_iter()
        .find(|(_, v)| *v < 0)
        .map(|(name, _)| name)
    }
}

/// Timing for a layer that plays on its own timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Length of one loop, in engine ticks.
    pub duration_ticks: i64,
    /// How many times the loop repeats; 0 repeats forever.
    pub max_repeat_count: u32,
}
