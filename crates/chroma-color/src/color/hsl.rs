//! HSL color type
//!
//! Hue in degrees, saturation and lightness in percent. Fields stay
//! unrounded so that HSL -> RGB -> HSL stays within rounding tolerance;
//! use [`Hsl::rounded`] for display.

use std::fmt;
use std::str::FromStr;

use crate::error::{split_components, ParseColorError};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsl {
    /// Hue in degrees (0.0..360.0)
    pub h: f64,
    /// Saturation in percent (0.0..=100.0)
    pub s: f64,
    /// Lightness in percent (0.0..=100.0)
    pub l: f64,
}

/// One of the three HSL channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HslChannel {
    Hue,
    Saturation,
    Lightness,
}

impl Hsl {
    #[inline]
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Integer display triple `(h, s, l)`, rounded half away from zero.
    ///
    /// A hue that rounds up to 360 is reported as 0.
    pub fn rounded(self) -> (u16, u8, u8) {
        let h = self.h.round() as u16 % 360;
        (h, self.s.round() as u8, self.l.round() as u8)
    }

    pub fn get(self, channel: HslChannel) -> f64 {
        match channel {
            HslChannel::Hue => self.h,
            HslChannel::Saturation => self.s,
            HslChannel::Lightness => self.l,
        }
    }

    /// Copy of `self` with one channel replaced.
    pub fn with(mut self, channel: HslChannel, value: f64) -> Self {
        match channel {
            HslChannel::Hue => self.h = value,
            HslChannel::Saturation => self.s = value,
            HslChannel::Lightness => self.l = value,
        }
        self
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, s, l) = self.rounded();
        write!(f, "HSL({}°, {}%, {}%)", h, s, l)
    }
}

impl FromStr for Hsl {
    type Err = ParseColorError;

    /// Parse `H,S,L` decimal values. Values are not range-checked here;
    /// [`crate::hsl_to_rgb`] wraps the hue and clamps the rest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [h, s, l] = split_components::<3>(s.trim())?;
        let parse = |part: &str| {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseColorError::InvalidComponent(part.to_string()))
        };
        Ok(Self::new(parse(h)?, parse(s)?, parse(l)?))
    }
}
