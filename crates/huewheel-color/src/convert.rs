//! The conversion plumbing: sRGB hex parsing/formatting, the Philips
//! RGB ↔ XYZ matrices, and the HSV leg through [`palette`].

use palette::{FromColor, Hsv, Srgb};
use thiserror::Error;

use crate::gamut::Gamut;
use crate::xy::Xy;

/// Errors from parsing a color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("hex color must be 6 digits, got {0:?}")]
    InvalidHexLength(String),

    #[error("invalid hex digit in {0:?}")]
    InvalidHexDigit(String),
}

/// Parse `#rrggbb` (leading `#` optional) into gamma-encoded components
/// in `0.0..=1.0`.
pub(crate) fn hex_to_rgb(hex: &str) -> Result<(f64, f64, f64), ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return Err(ColorError::InvalidHexLength(hex.to_string()));
    }
    if !digits.is_ascii() {
        return Err(ColorError::InvalidHexDigit(hex.to_string()));
    }
    let byte = |range| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| ColorError::InvalidHexDigit(hex.to_string()))
    };
    let r = byte(0..2)?;
    let g = byte(2..4)?;
    let b = byte(4..6)?;
    Ok((
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    ))
}

/// Format components in `0.0..=1.0` as `#rrggbb`.
pub(crate) fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Gamma-expanded sRGB channel → linear light.
fn to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Linear light → gamma-encoded sRGB channel.
fn to_gamma(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Gamma-encoded sRGB → CIE 1931 chromaticity, using the Philips wide-gamut
/// conversion matrix. The result is *not* gamut-clamped; callers clamp
/// against the lamp's triangle.
pub(crate) fn rgb_to_xy(r: f64, g: f64, b: f64) -> Xy {
    let r = to_linear(r);
    let g = to_linear(g);
    let b = to_linear(b);

    let x = r * 0.664511 + g * 0.154324 + b * 0.162028;
    let y = r * 0.283881 + g * 0.668433 + b * 0.047685;
    let z = r * 0.000088 + g * 0.072310 + b * 0.986039;

    let sum = x + y + z;
    if sum == 0.0 {
        return Xy::new(0.0, 0.0);
    }
    Xy::new(x / sum, y / sum)
}

/// Chromaticity + luminance → gamma-encoded sRGB, using the Philips
/// reverse matrix. Components are floored at zero and normalized by the
/// largest component before gamma encoding.
pub(crate) fn xy_to_rgb(xy: Xy, brightness: f64) -> (f64, f64, f64) {
    if xy.y <= 0.0 || brightness <= 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let y = brightness;
    let x = (y / xy.y) * xy.x;
    let z = (y / xy.y) * (1.0 - xy.x - xy.y);

    let r = x * 1.612 - y * 0.203 - z * 0.302;
    let g = -x * 0.509 + y * 1.412 + z * 0.066;
    let b = x * 0.026 - y * 0.072 + z * 0.962;

    let r = r.max(0.0);
    let g = g.max(0.0);
    let b = b.max(0.0);

    let max = r.max(g).max(b);
    let (r, g, b) = if max > 1.0 {
        (r / max, g / max, b / max)
    } else {
        (r, g, b)
    };

    (to_gamma(r), to_gamma(g), to_gamma(b))
}

/// Parse a hex color into HSV for marker display.
pub fn hex_to_hsv(hex: &str) -> Result<Hsv, ColorError> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let rgb = Srgb::new(r as f32, g as f32, b as f32);
    Ok(Hsv::from_color(rgb))
}

/// Format a marker's HSV as a hex color.
pub fn hsv_to_hex(hsv: Hsv) -> String {
    let rgb = Srgb::from_color(hsv);
    rgb_to_hex(f64::from(rgb.red), f64::from(rgb.green), f64::from(rgb.blue))
}

/// Device chromaticity → marker HSV, through the same 8-bit quantization as
/// the hex leg so both paths agree on the resulting hue.
pub fn xy_to_hsv(xy: Xy, brightness: f64) -> Hsv {
    let (r, g, b) = xy_to_rgb(xy, brightness);
    let q = |c: f64| ((c.clamp(0.0, 1.0) * 255.0).round() / 255.0) as f32;
    Hsv::from_color(Srgb::new(q(r), q(g), q(b)))
}

/// Marker HSV → device chromaticity, clamped into the classic bulb gamut.
pub fn hsv_to_xy(hsv: Hsv) -> Xy {
    let rgb = Srgb::from_color(hsv);
    let q = |c: f32| f64::from((c.clamp(0.0, 1.0) * 255.0).round()) / 255.0;
    Gamut::HUE_BULB.clamp(rgb_to_xy(q(rgb.red), q(rgb.green), q(rgb.blue)))
}
