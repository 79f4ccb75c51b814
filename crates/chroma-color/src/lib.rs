//! chroma-color: RGB, CMYKW and HSL conversions for ink-mixing controllers
//!
//! This library keeps three representations of one color numerically in
//! step while an operator drags sliders, picks pixels or clicks palette
//! swatches. Every function is pure: no state, no I/O, no panics on
//! out-of-domain input.
//!
//! # Quick Start
//!
//! ```
//! use chroma_color::{cmykw_to_rgb, rgb_to_cmykw, rgb_to_hsl, Rgb};
//!
//! let picked = Rgb::new(205, 127, 50);
//! let ink = rgb_to_cmykw(picked);
//! assert_eq!(ink.w, 0);
//!
//! // CMYKW is derived and lossy: the way back is close, not exact
//! let back = cmykw_to_rgb(ink);
//! assert!((i16::from(back.r) - 205).abs() <= 3);
//!
//! let hsl = rgb_to_hsl(picked);
//! assert_eq!(hsl.rounded(), (30, 61, 50));
//! ```
//!
//! # Color Models
//!
//! | Model | Domain | Used For |
//! |-------|--------|----------|
//! | [`Rgb`] | three `u8` channels | canonical value, previews, history |
//! | [`Cmykw`] | five percentages | device instructions |
//! | [`Hsl`] | degrees + percentages (`f64`) | picker sliders, hue wheel |
//!
//! ## The White Channel
//!
//! CMYKW extends CMYK with a white ink channel that acts as an override,
//! not as an additive component: any `w > 0` converts to pure white. The
//! conversion from RGB only ever sets `w` for exactly `(255, 255, 255)`,
//! and pure black and pure white are the only colors that set `k = 100`
//! or `w = 100`, never both.
//!
//! ## Numeric Contract
//!
//! - Rounding is to the nearest integer, half away from zero, everywhere.
//! - Hue wraps modulo 360; saturation and lightness clamp to 0..=100.
//! - RGB results clamp to 0..=255; CMYKW percentages are not clamped on
//!   input but the RGB-facing conversions always produce in-range output.
//! - HSL values stay unrounded so `hsl_to_rgb(rgb_to_hsl(x))` is within
//!   one unit per channel of `x`.

pub mod color;
pub mod convert;
pub mod error;
pub mod wheel;


pub use color::{Cmykw, CmykwChannel, Contrast, Hsl, HslChannel, Rgb};
pub use convert::{cmykw_to_rgb, hsl_to_rgb, rgb_to_cmykw, rgb_to_hsl};
pub use error::ParseColorError;
pub use wheel::HueWheel;
