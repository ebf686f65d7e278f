//! Text styling: the properties the floating style panel edits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Text style ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Per-element text style override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub color: Color,
    pub alignment: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: Color::BLACK,
            alignment: Alignment::Left,
        }
    }
}

/// One edit issued from the style panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "property", content = "value")]
pub enum StyleChange {
    FontSize(f64),
    FontFamily(String),
    Color(Color),
    Alignment(Alignment),
}

/// A style value the canvas refuses to store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidStyle {
    #[error("font size {0} is not a positive number")]
    FontSize(f64),
    #[error("font family {0:?} is not a plain family name")]
    FontFamily(String),
}

impl StyleChange {
    /// Font sizes must be positive and finite. Family names end up inside
    /// a quoted CSS string, so quotes, escapes and declaration punctuation
    /// are rejected.
    pub fn validate(&self) -> Result<(), InvalidStyle> {
        match self {
            Self::FontSize(size) if !size.is_finite() || *size <= 0.0 => {
                Err(InvalidStyle::FontSize(*size))
            }
            Self::FontFamily(family) if !is_plain_family(family) => {
                Err(InvalidStyle::FontFamily(family.clone()))
            }
            _ => Ok(()),
        }
    }

    pub fn apply(&self, style: &mut TextStyle) {
        match self {
            Self::FontSize(size) => style.font_size = *size,
            Self::FontFamily(family) => style.font_family.clone_from(family),
            Self::Color(color) => style.color = *color,
            Self::Alignment(alignment) => style.alignment = *alignment,
        }
    }
}

fn is_plain_family(family: &str) -> bool {
    !family.trim().is_empty()
        && !family
            .chars()
            .any(|c| c.is_control() || matches!(c, '"' | '\\' | ';' | '{' | '}' | '<' | '>'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("1A2B3C"), Some(Color::rgb(0x1A, 0x2B, 0x3C)));
        assert_eq!(
            Color::from_hex("#00000080"),
            Some(Color {
                r: 0,
                g: 0,
                b: 0,
                a: 0x80
            })
        );
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#ggg"), None);
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#FF0010");
    }

    #[test]
    fn style_change_applies_one_property() {
        let mut style = TextStyle::default();
        StyleChange::FontSize(32.0).apply(&mut style);
        StyleChange::Alignment(Alignment::Center).apply(&mut style);
        assert_eq!(style.font_size, 32.0);
        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn invalid_style_values_are_rejected() {
        assert_eq!(StyleChange::FontSize(24.0).validate(), Ok(()));
        assert_eq!(StyleChange::FontFamily("Playfair Display".into()).validate(), Ok(()));
        assert_eq!(StyleChange::FontSize(-4.0).validate(), Err(InvalidStyle::FontSize(-4.0)));
        assert!(StyleChange::FontSize(f64::NAN).validate().is_err());
        assert!(StyleChange::FontSize(f64::INFINITY).validate().is_err());
        assert!(StyleChange::FontFamily("Inter; color: red".into()).validate().is_err());
        assert!(StyleChange::FontFamily("Inter\" onload".into()).validate().is_err());
        assert!(StyleChange::FontFamily("   ".into()).validate().is_err());
    }

    #[test]
    fn style_change_json_shape() {
        let change: StyleChange =
            serde_json::from_str(r##"{"property":"color","value":"#336699"}"##).unwrap();
        assert_eq!(change, StyleChange::Color(Color::rgb(0x33, 0x66, 0x99)));
    }
}
