//! RGB colors, weighted mixing and the player palette.

use serde::{Deserialize, Serialize};

/// An RGB color with unrounded channels in 0..=255.
///
/// Channels stay as floats while mixing so repeated blends do not drift from
/// rounding; renderers round when they draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A hex color string that is not of the form `#RRGGBB` / `RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color '{input}'")]
pub struct ColorParseError {
    pub input: String,
}

impl Rgb {
    /// Empty-payload color carried by ants.
    pub const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: hex.to_string(),
        };
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(
            f32::from(channel(0)?),
            f32::from(channel(2)?),
            f32::from(channel(4)?),
        ))
    }

    /// Channels rounded and clamped to bytes.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// Weight-proportional average of two colors.
///
/// When `w1 + w2 == 0` the first color is returned unchanged.
pub fn mix(c1: Rgb, w1: f32, c2: Rgb, w2: f32) -> Rgb {
    let total = w1 + w2;
    if total == 0.0 {
        return c1;
    }
    Rgb {
        r: (c1.r * w1 + c2.r * w2) / total,
        g: (c1.g * w1 + c2.g * w2) / total,
        b: (c1.b * w1 + c2.b * w2) / total,
    }
}

/// The honey colors a player can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaletteColor {
    #[default]
    Ruby,
    Amber,
    Citrine,
    Emerald,
    Sapphire,
    Amethyst,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 6] = [
        PaletteColor::Ruby,
        PaletteColor::Amber,
        PaletteColor::Citrine,
        PaletteColor::Emerald,
        PaletteColor::Sapphire,
        PaletteColor::Amethyst,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            PaletteColor::Ruby => "#FF3333",
            PaletteColor::Amber => "#FF9933",
            PaletteColor::Citrine => "#FFE033",
            PaletteColor::Emerald => "#33CC66",
            PaletteColor::Sapphire => "#3399FF",
            PaletteColor::Amethyst => "#AA55FF",
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            PaletteColor::Ruby => Rgb::new(255.0, 51.0, 51.0),
            PaletteColor::Amber => Rgb::new(255.0, 153.0, 51.0),
            PaletteColor::Citrine => Rgb::new(255.0, 224.0, 51.0),
            PaletteColor::Emerald => Rgb::new(51.0, 204.0, 102.0),
            PaletteColor::Sapphire => Rgb::new(51.0, 153.0, 255.0),
            PaletteColor::Amethyst => Rgb::new(170.0, 85.0, 255.0),
        }
    }
}
