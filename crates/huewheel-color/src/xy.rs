//! CIE 1931 chromaticity coordinates and the device ↔ hex conversions.

use serde::{Deserialize, Serialize};

use crate::convert::{self, ColorError};
use crate::gamut::Gamut;

/// A point in the CIE 1931 chromaticity diagram, the bridge's native
/// color representation. Serializes as the two-element array the bridge
/// uses on the wire (`[0.4091, 0.518]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to an sRGB hex string at the given luminance (`0.0..=1.0`).
    ///
    /// `brightness` is the Y of the XYZ reconstruction; the wheel renders
    /// markers at full luminance regardless of the lamp's `bri`.
    pub fn to_hex(self, brightness: f64) -> String {
        let (r, g, b) = convert::xy_to_rgb(self, brightness.clamp(0.0, 1.0));
        convert::rgb_to_hex(r, g, b)
    }

    /// Parse an sRGB hex string into chromaticity coordinates, clamped
    /// into the default lamp gamut.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        Self::from_hex_in(hex, &Gamut::HUE_BULB)
    }

    /// Like [`Xy::from_hex`], but clamping into a specific gamut.
    pub fn from_hex_in(hex: &str, gamut: &Gamut) -> Result<Self, ColorError> {
        let (r, g, b) = convert::hex_to_rgb(hex)?;
        let xy = convert::rgb_to_xy(r, g, b);
        Ok(gamut.clamp(xy))
    }

    /// Euclidean distance to another chromaticity point.
    pub fn distance(self, other: Xy) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Xy {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Xy> for [f64; 2] {
    fn from(xy: Xy) -> [f64; 2] {
        [xy.x, xy.y]
    }
}

impl std::fmt::Display for Xy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}
