//! Error types for color parsing
//!
//! Conversions never fail: out-of-domain numbers are clamped or wrapped.
//! The only fallible operations are the text parsers used by the command
//! line and the palette definitions.

use std::fmt;
use std::num::ParseIntError;

/// Error type for parsing color strings.
///
/// Returned when a hex string, a decimal component list or a single
/// component cannot be turned into a color value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    InvalidLength,
    /// Invalid hexadecimal character encountered
    InvalidHex(ParseIntError),
    /// A decimal component could not be parsed or does not fit its channel
    InvalidComponent(String),
    /// Wrong number of comma-separated components
    ComponentCount {
        /// Number of components the color type needs
        expected: usize,
        /// Number of components found in the input
        found: usize,
    },
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::InvalidHex(err) => {
                write!(f, "invalid hex character: {}", err)
            }
            ParseColorError::InvalidComponent(component) => {
                write!(f, "invalid color component: {:?}", component)
            }
            ParseColorError::ComponentCount { expected, found } => {
                write!(
                    f,
                    "expected {} comma-separated components, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

/// Split `s` on commas into exactly `N` trimmed components.
pub(crate) fn split_components<const N: usize>(s: &str) -> Result<[&str; N], ParseColorError> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ParseColorError::ComponentCount {
            expected: N,
            found: parts.len(),
        });
    }

    let mut out = [""; N];
    out.copy_from_slice(&parts);
    Ok(out)
}

/// Parse one decimal `u8` component.
pub(crate) fn parse_u8_component(s: &str) -> Result<u8, ParseColorError> {
    s.parse::<u8>()
        .map_err(|_| ParseColorError::InvalidComponent(s.to_string()))
}
