use std::str::FromStr;

use palette::{LinSrgb, Srgb};

/// Error returned when a string is not a `#rrggbb` hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("invalid hex color {0:?}: expected 6 hex digits")]
    Length(String),
    #[error("invalid hex color {0:?}: non-hex digit")]
    Digit(String),
}

/// Core color type shared by the palette registry and the rewriter.
/// Wraps sRGB u8 components; equality and hashing are on the channel values,
/// so two spellings of the same hex code compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    ///
    /// The leading `#` is optional. Shorthand (`#fff`) and alpha forms are rejected.
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ParseColorError::Length(hex.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::Digit(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ParseColorError::Digit(hex.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to the canonical lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Create from `palette::Srgb<u8>`.
    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self {
            r: srgb.red,
            g: srgb.green,
            b: srgb.blue,
        }
    }

    /// WCAG 2.0 relative luminance, computed on the linearized channels.
    pub fn relative_luminance(self) -> f32 {
        let linear: LinSrgb<f32> = self.to_srgb_u8().into_format::<f32>().into_linear();
        0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
    }

    /// Whether dark text reads better than light text on this color.
    pub fn is_light(self) -> bool {
        self.relative_luminance() > 0.4
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(srgb: Srgb<u8>) -> Self {
        Self::from_srgb_u8(srgb)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color::new(0, 0, 0);
    const WHITE: Color = Color::new(255, 255, 255);

    #[test]
    fn hex_parse_channels() {
        let color = Color::from_hex("#ff8800").unwrap();
        assert_eq!((color.r, color.g, color.b), (255, 136, 0));
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input_is_canonicalized() {
        let color = Color::from_hex("#BF2116").unwrap();
        assert_eq!(color.to_hex(), "#bf2116");
        assert_eq!(color, Color::from_hex("#bf2116").unwrap());
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_invalid_length() {
        assert_eq!(
            Color::from_hex("#fff"),
            Err(ParseColorError::Length("#fff".to_string()))
        );
        assert!(Color::from_hex("#ffffff00").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(matches!(
            Color::from_hex("#gggggg"),
            Err(ParseColorError::Digit(_))
        ));
        // A sign would slip through from_str_radix.
        assert!(Color::from_hex("#+1ffff").is_err());
    }

    #[test]
    fn from_str_matches_from_hex() {
        let parsed: Color = "#562C82".parse().unwrap();
        assert_eq!(parsed, Color::new(0x56, 0x2c, 0x82));
    }

    #[test]
    fn srgb_round_trip() {
        let color = Color::new(0x44, 0x7d, 0x29);
        assert_eq!(Color::from(color.to_srgb_u8()), color);
    }

    #[test]
    fn relative_luminance_extremes() {
        assert!(BLACK.relative_luminance() < 0.001);
        assert!((WHITE.relative_luminance() - 1.0).abs() < 0.001);
    }

    #[test]
    fn lightness_picks_label_color() {
        assert!(WHITE.is_light());
        assert!(Color::from_hex("#ffc72c").unwrap().is_light());
        assert!(!Color::from_hex("#00345f").unwrap().is_light());
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
