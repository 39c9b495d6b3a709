//! Color conversions between the Hue bridge's device color space and UI
//! color spaces.
//!
//! Lamps report color as CIE 1931 chromaticity coordinates (`xy`); the
//! wheel works in hue/saturation/value. The two one-way paths meet at an
//! sRGB hex string:
//!
//! - Device → UI: `xy` → hex ([`Xy::to_hex`]) → HSV ([`hex_to_hsv`])
//! - UI → device: HSV → hex ([`hsv_to_hex`]) → `xy` ([`Xy::from_hex`])
//!
//! The `xy` leg uses the Philips conversion matrices and clamps
//! chromaticities into the lamp's gamut triangle. The HSV leg goes through
//! [`palette`]. Round-tripping an in-gamut `xy` pair through hex reproduces
//! it within 8-bit quantization error.

pub mod convert;
pub mod gamut;
pub mod xy;

pub use convert::{ColorError, hex_to_hsv, hsv_to_hex, hsv_to_xy, xy_to_hsv};
pub use gamut::Gamut;
pub use xy::Xy;

// UI-side color type; markers store one of these.
pub use palette::Hsv;
