use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color with f32 channels in [0.0, 1.0].
///
/// Stroke points and sequence backgrounds carry opacity separately, so the
/// color itself has no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional). Alpha digits are not
    /// accepted.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }
        let packed =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))?;
        let unit = |shift: u32| ((packed >> shift) & 0xFF) as f32 / 255.0;
        Ok(Self::rgb(unit(16), unit(8), unit(0)))
    }

    /// Channels quantized to 8 bits.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Whether every channel is finite and inside [0.0, 1.0].
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("'{0}' is not a #RRGGBB color")]
    InvalidHex(String),
}
