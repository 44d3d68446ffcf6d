use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::document::SequenceSettings;
use crate::error::{ImmError, ImmResult};
use crate::types::{AudioSettings, ResourceBudget, SequenceType};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub sequence_type: SequenceType,
    pub frame_rate: u32,
    pub background: String, // "#RRGGBB"
    pub caps: u8,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            sequence_type: SequenceType::Still,
            frame_rate: 30,
            background: "#000000".to_string(),
            caps: 0,
        }
    }
}

/// Export settings read from an `imm.toml` file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub budget: ResourceBudget,
}

impl ExportConfig {
    pub fn load_from_file(path: &std::path::Path) -> ImmResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ImmResult<Self> {
        toml::from_str(contents).map_err(|e| ImmError::Config(e.to_string()))
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> ImmResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ImmError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the `[sequence]` table into session settings.
    pub fn sequence_settings(&self) -> ImmResult<SequenceSettings> {
        let background = Color::from_hex(&self.sequence.background).map_err(|e| {
            ImmError::Config(format!("background '{}': {}", self.sequence.background, e))
        })?;
        Ok(SequenceSettings {
            sequence_type: self.sequence.sequence_type,
            frame_rate: self.sequence.frame_rate,
            background,
            caps: self.sequence.caps,
        })
    }
}
