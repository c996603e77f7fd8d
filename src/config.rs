//! Configuration file: render defaults and font search paths.

use crate::error::{ConverterError, Result};
use crate::fonts::FontResolver;
use crate::options::{FontSpec, RenderOptions, Rgb, ScaleMode, TextBoxInput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Application configuration with validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Defaults for the render options of every run
    #[serde(default)]
    pub render: RenderConfig,
    /// Where fonts are looked up
    #[serde(default)]
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub scale_mode: ScaleMode,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: u8,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default = "default_color")]
    pub color: Rgb,
    #[serde(default)]
    pub center: bool,
    /// Kept as text: these mirror user-entered fields and are parsed at run start
    #[serde(default = "default_text_x")]
    pub text_x: String,
    #[serde(default = "default_text_y")]
    pub text_y: String,
    #[serde(default = "default_text_width")]
    pub text_width: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
    /// Tried in order when the requested family cannot be loaded
    #[serde(default = "default_fallback_families")]
    pub fallback_families: Vec<String>,
}

fn default_font_family() -> String {
    FontSpec::default().family
}
fn default_font_size() -> u8 {
    FontSpec::default().size
}
fn default_color() -> Rgb {
    Rgb::BLACK
}
fn default_text_x() -> String {
    TextBoxInput::default().x
}
fn default_text_y() -> String {
    TextBoxInput::default().y
}
fn default_text_width() -> String {
    TextBoxInput::default().width
}
fn default_fallback_families() -> Vec<String> {
    vec![default_font_family(), "DejaVuSans".to_string(), "Arial".to_string()]
}
fn default_search_dirs() -> Vec<PathBuf> {
    [
        "./fonts",
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/TTF",
        "/usr/share/fonts",
        "/System/Library/Fonts",
        r"C:\Windows\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from(&RenderOptions::default())
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
            fallback_families: default_fallback_families(),
        }
    }
}

impl From<&RenderOptions> for RenderConfig {
    fn from(options: &RenderOptions) -> Self {
        Self {
            scale_mode: options.scale_mode,
            font_family: options.font.family.clone(),
            font_size: options.font.size,
            bold: options.font.bold,
            italic: options.font.italic,
            underline: options.font.underline,
            color: options.color,
            center: options.center,
            text_x: options.text_box.x.clone(),
            text_y: options.text_box.y.clone(),
            text_width: options.text_box.width.clone(),
        }
    }
}

impl RenderConfig {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            scale_mode: self.scale_mode,
            font: FontSpec {
                family: self.font_family.clone(),
                size: self.font_size,
                bold: self.bold,
                italic: self.italic,
                underline: self.underline,
            },
            color: self.color,
            center: self.center,
            text_box: TextBoxInput {
                x: self.text_x.clone(),
                y: self.text_y.clone(),
                width: self.text_width.clone(),
            },
        }
    }
}

impl FontConfig {
    pub fn resolver(&self) -> FontResolver {
        FontResolver::new(self.search_dirs.clone(), self.fallback_families.clone())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file with validation
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| ConverterError::filesystem(path, e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| ConverterError::Config(format!("invalid TOML in {}: {}", path.display(), e)))?;

        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConverterError::Config(format!("failed to serialize configuration: {}", e)))?;

        fs::write(path, content).map_err(|e| ConverterError::filesystem(path, e))?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.fonts.fallback_families.is_empty() {
            return Err(ConverterError::Config("fonts.fallback_families must name at least one family".to_string()));
        }
        if self.fonts.fallback_families.iter().any(|family| family.trim().is_empty()) {
            return Err(ConverterError::Config("fonts.fallback_families must not contain empty names".to_string()));
        }
        if self.fonts.search_dirs.is_empty() {
            return Err(ConverterError::Config("fonts.search_dirs must list at least one directory".to_string()));
        }
        self.render.to_options().validate()?;
        Ok(())
    }
}
