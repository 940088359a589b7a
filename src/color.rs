//! ARGB color values and hex parsing
//!
//! The catalog and the map palette store colors as (Alpha, Red, Green, Blue).
//! Image buffers store (Red, Green, Blue, Alpha). [`Argb::to_rgba`] and
//! [`Argb::from_rgba`] are the only places where the channel order is swapped.
//!
//! Supported hex formats:
//! - `#RRGGBB` - alpha defaults to 255 (opaque)
//! - `#AARRGGBB` - explicit alpha channel in front

use std::fmt;

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 6 or 8 hex chars after #)
    #[error("invalid color length {0}, expected 6 or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// A color in catalog channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Build from a packed `0xAARRGGBB` value.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Convert to an image pixel (RGBA order).
    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Convert from an image pixel (RGBA order).
    pub const fn from_rgba(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self { a, r, g, b }
    }

    /// Same RGB with a different alpha byte.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Format as `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.to_u32())
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.a, self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Argb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_argb(s)
    }
}

/// Parse a hex color string into an ARGB color.
///
/// # Examples
///
/// ```
/// use mapsmith::color::{parse_argb, Argb};
///
/// let ground = parse_argb("#FF844715").unwrap();
/// assert_eq!(ground, Argb::new(255, 132, 71, 21));
///
/// let opaque = parse_argb("#844715").unwrap();
/// assert_eq!(opaque.a, 255);
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, lacks the leading `#`, has the
/// wrong number of digits, or contains non-hex characters.
pub fn parse_argb(s: &str) -> Result<Argb, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    match hex.len() {
        6 => {
            let r = parse_hex_pair(&hex[0..2])?;
            let g = parse_hex_pair(&hex[2..4])?;
            let b = parse_hex_pair(&hex[4..6])?;
            Ok(Argb::new(255, r, g, b))
        }
        8 => {
            let a = parse_hex_pair(&hex[0..2])?;
            let r = parse_hex_pair(&hex[2..4])?;
            let g = parse_hex_pair(&hex[4..6])?;
            let b = parse_hex_pair(&hex[6..8])?;
            Ok(Argb::new(a, r, g, b))
        }
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Parse a two-character hex string to u8 (0-255)
fn parse_hex_pair(s: &str) -> Result<u8, ColorError> {
    let mut value = 0u8;
    for c in s.chars() {
        value = value * 16 + parse_hex_digit(c)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argb_eight_digits() {
        assert_eq!(parse_argb("#FF844715"), Ok(Argb::new(255, 132, 71, 21)));
        assert_eq!(parse_argb("#80a5bdc8"), Ok(Argb::new(128, 165, 189, 200)));
    }

    #[test]
    fn test_parse_argb_six_digits_is_opaque() {
        assert_eq!(parse_argb("#A5BDC8"), Ok(Argb::new(255, 165, 189, 200)));
    }

    #[test]
    fn test_parse_argb_errors() {
        assert_eq!(parse_argb(""), Err(ColorError::Empty));
        assert_eq!(parse_argb("FF844715"), Err(ColorError::MissingHash));
        assert_eq!(parse_argb("#FFF"), Err(ColorError::InvalidLength(3)));
        assert_eq!(parse_argb("#FF84471G"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_rgba_swap() {
        let ground = Argb::new(255, 132, 71, 21);
        assert_eq!(ground.to_rgba(), Rgba([132, 71, 21, 255]));
        assert_eq!(Argb::from_rgba(Rgba([132, 71, 21, 255])), ground);
    }

    #[test]
    fn test_packed_u32() {
        let sky = Argb::from_u32(0xFFA5BDC8);
        assert_eq!(sky, Argb::new(255, 165, 189, 200));
        assert_eq!(sky.to_u32(), 0xFFA5BDC8);
        assert_eq!(sky.to_hex(), "#FFA5BDC8");
    }
}
