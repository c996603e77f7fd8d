//! Render options chosen by the user before a run.

use crate::error::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the source image is sized onto the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Fit inside the usable area, keeping the aspect ratio
    #[default]
    #[value(name = "fit")]
    Fit,
    /// Stretch to exactly the usable width and height
    #[value(name = "absolute")]
    Absolute,
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::Fit => write!(f, "ScaleToFit"),
            ScaleMode::Absolute => write!(f, "ScaleAbsolute"),
        }
    }
}

/// An RGB colour, written as `#RRGGBB` in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const MID_GRAY: Rgb = Rgb(128, 128, 128);

    /// Composites this colour at `opacity` over white paper
    pub fn flatten_on_white(self, opacity: f64) -> Rgb {
        let alpha = opacity.clamp(0.0, 1.0);
        let blend = |c: u8| (255.0 - alpha * (255.0 - f64::from(c))).round() as u8;
        Rgb(blend(self.0), blend(self.1), blend(self.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConverterError::Config(format!("invalid colour {:?}, expected #RRGGBB", s));
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Font selection for the label text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    /// Size in points
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "LiberationSans".to_string(),
            size: 12,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// The text-box fields as the user typed them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBoxInput {
    pub x: String,
    pub y: String,
    pub width: String,
}

impl Default for TextBoxInput {
    fn default() -> Self {
        Self {
            x: "50".to_string(),
            y: "750".to_string(),
            width: "500".to_string(),
        }
    }
}

impl TextBoxInput {
    /// Parses all three fields, naming the first one that is not an integer
    pub fn parse(&self) -> Result<TextBox> {
        Ok(TextBox {
            x: parse_field("text_x", &self.x)?,
            y: parse_field("text_y", &self.y)?,
            width: parse_field("text_width", &self.width)?,
        })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ConverterError::InvalidNumericField {
            field,
            value: value.to_string(),
        })
}

/// Validated text-box geometry in page points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub x: i32,
    /// Bottom edge of the text block, measured from the bottom of the page
    pub y: i32,
    pub width: i32,
}

/// Everything the user configures before pressing start
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub scale_mode: ScaleMode,
    pub font: FontSpec,
    pub color: Rgb,
    pub center: bool,
    pub text_box: TextBoxInput,
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl RenderOptions {
    /// Checks the user-entered fields once, before any file is touched
    pub fn validate(&self) -> Result<ValidatedOptions> {
        if self.font.size == 0 {
            return Err(ConverterError::Config("font size must be greater than zero".to_string()));
        }
        let text_box = self.text_box.parse()?;
        Ok(ValidatedOptions {
            scale_mode: self.scale_mode,
            font: self.font.clone(),
            color: self.color,
            center: self.center,
            text_box,
        })
    }
}

/// Render options whose numeric fields are known to be valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOptions {
    pub scale_mode: ScaleMode,
    pub font: FontSpec,
    pub color: Rgb,
    pub center: bool,
    pub text_box: TextBox,
}
