//! Color value types
//!
//! Three representations of the same color, each with its own domain:
//!
//! - **Rgb**: 8-bit device color, the canonical value.
//! - **Cmykw**: ink percentages sent to the controller.
//! - **Hsl**: hue/saturation/lightness for the picker controls.
//!
//! # Example
//!
//! ```
//! use chroma_color::{Cmykw, Hsl, Rgb};
//!
//! let rgb = Rgb::new(255, 0, 0);
//! let ink = Cmykw::from(rgb);
//! assert_eq!(ink.channels(), [0, 100, 100, 0, 0]);
//!
//! let hsl = Hsl::from(rgb);
//! assert_eq!(hsl.rounded(), (0, 100, 50));
//! ```

mod cmykw;
mod hsl;
mod rgb;

pub use cmykw::{Cmykw, CmykwChannel};
pub use hsl::{Hsl, HslChannel};
pub use rgb::{Contrast, Rgb};
