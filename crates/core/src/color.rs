//! sRGB colors for field sources and vertex-color blending.
//!
//! Source colors are authored in sRGB (hex strings or CSS color names) and
//! blended in linear RGB, where weighted sums of light are meaningful. Linear
//! colors are plain `glam::Vec3` values so they can ride along with mesh data.

use crate::error::EngineError;
use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. Deserialization also accepts the
/// CSS color names listed in [`Srgb::NAMED`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Srgb {
    /// CSS color names understood by [`Srgb::parse`].
    pub const NAMED: &'static [(&'static str, &'static str)] = &[
        ("black", "#000000"),
        ("white", "#ffffff"),
        ("silver", "#c0c0c0"),
        ("gray", "#808080"),
        ("red", "#ff0000"),
        ("gold", "#ffd700"),
        ("orange", "#ffa500"),
        ("green", "#008000"),
        ("cyan", "#00ffff"),
        ("blue", "#0000ff"),
        ("violet", "#ee82ee"),
        ("magenta", "#ff00ff"),
    ];

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid red component: {e}")))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid green component: {e}")))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid blue component: {e}")))?;
        Ok(Srgb {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        })
    }

    /// Parses either a CSS color name from [`Srgb::NAMED`] or a hex string.
    pub fn parse(s: &str) -> Result<Srgb, EngineError> {
        let trimmed = s.trim();
        match Self::NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        {
            Some((_, hex)) => Self::from_hex(hex),
            None => Self::from_hex(trimmed),
        }
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    ///
    /// Components are quantized to 8-bit (0-255) with rounding.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels, clamping out-of-range components.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Gamma-decodes into linear RGB.
    pub fn to_linear(self) -> Vec3 {
        Vec3::new(
            srgb_component_to_linear(self.r),
            srgb_component_to_linear(self.g),
            srgb_component_to_linear(self.b),
        )
    }

    /// Gamma-encodes a linear RGB color. Components are clamped to [0, 1] first.
    pub fn from_linear(c: Vec3) -> Srgb {
        let c = c.clamp(Vec3::ZERO, Vec3::ONE);
        Srgb {
            r: linear_component_to_srgb(c.x),
            g: linear_component_to_srgb(c.y),
            b: linear_component_to_srgb(c.z),
        }
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Applies inverse sRGB gamma to convert a single sRGB component to linear.
fn srgb_component_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Applies sRGB gamma to convert a single linear component to sRGB.
fn linear_component_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
