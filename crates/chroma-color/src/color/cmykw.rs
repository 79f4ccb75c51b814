//! CMYKW ink color type
//!
//! Five ink percentages: cyan, magenta, yellow, key (black) and white.
//! White is an override channel: any non-zero `w` means pure white,
//! whatever the other four channels say.

use std::fmt;
use std::str::FromStr;

use crate::error::{parse_u8_component, split_components, ParseColorError};

/// Subtractive ink fractions plus a white override, each a percentage.
///
/// Channels are conceptually in 0..=100. Values above 100 are accepted
/// (they come from callers, not from the conversions) and clamp out in
/// [`crate::cmykw_to_rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmykw {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
    pub w: u8,
}

/// One of the five CMYKW channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmykwChannel {
    Cyan,
    Magenta,
    Yellow,
    Key,
    White,
}

impl CmykwChannel {
    /// All channels in wire order.
    pub const ALL: [CmykwChannel; 5] = [
        CmykwChannel::Cyan,
        CmykwChannel::Magenta,
        CmykwChannel::Yellow,
        CmykwChannel::Key,
        CmykwChannel::White,
    ];

    /// Single-letter label (`C`, `M`, `Y`, `K`, `W`).
    pub fn letter(self) -> char {
        match self {
            CmykwChannel::Cyan => 'C',
            CmykwChannel::Magenta => 'M',
            CmykwChannel::Yellow => 'Y',
            CmykwChannel::Key => 'K',
            CmykwChannel::White => 'W',
        }
    }
}

impl Cmykw {
    /// Pure white: only the white channel set.
    pub const WHITE: Cmykw = Cmykw::new(0, 0, 0, 0, 100);
    /// Pure black: only the key channel set.
    pub const BLACK: Cmykw = Cmykw::new(0, 0, 0, 100, 0);

    #[inline]
    pub const fn new(c: u8, m: u8, y: u8, k: u8, w: u8) -> Self {
        Self { c, m, y, k, w }
    }

    /// True when the white override is active.
    #[inline]
    pub fn is_white(self) -> bool {
        self.w > 0
    }

    /// Channel values in wire order `[c, m, y, k, w]`.
    #[inline]
    pub fn channels(self) -> [u8; 5] {
        [self.c, self.m, self.y, self.k, self.w]
    }

    pub fn get(self, channel: CmykwChannel) -> u8 {
        match channel {
            CmykwChannel::Cyan => self.c,
            CmykwChannel::Magenta => self.m,
            CmykwChannel::Yellow => self.y,
            CmykwChannel::Key => self.k,
            CmykwChannel::White => self.w,
        }
    }

    /// Copy of `self` with one channel replaced.
    pub fn with(mut self, channel: CmykwChannel, value: u8) -> Self {
        match channel {
            CmykwChannel::Cyan => self.c = value,
            CmykwChannel::Magenta => self.m = value,
            CmykwChannel::Yellow => self.y = value,
            CmykwChannel::Key => self.k = value,
            CmykwChannel::White => self.w = value,
        }
        self
    }
}

impl From<[u8; 5]> for Cmykw {
    fn from([c, m, y, k, w]: [u8; 5]) -> Self {
        Self::new(c, m, y, k, w)
    }
}

impl fmt::Display for Cmykw {
    /// Clipboard form: `CMYKW(c, m, y, k, w)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CMYKW({}, {}, {}, {}, {})",
            self.c, self.m, self.y, self.k, self.w
        )
    }
}

impl FromStr for Cmykw {
    type Err = ParseColorError;

    /// Parse `C,M,Y,K,W` decimal percentages.
    ///
    /// ```
    /// use chroma_color::Cmykw;
    /// let red: Cmykw = "0,100,100,0,0".parse().unwrap();
    /// assert_eq!(red.channels(), [0, 100, 100, 0, 0]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_components::<5>(s.trim())?;
        let mut channels = [0u8; 5];
        for (slot, part) in channels.iter_mut().zip(parts) {
            *slot = parse_u8_component(part)?;
        }
        Ok(Self::from(channels))
    }
}
