//! Resolves a font family name to embeddable TrueType data.

use crate::error::{ConverterError, Result};
use genpdf::fonts::{FontData, FontFamily};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Font files belonging to one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyFiles {
    pub regular: PathBuf,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
}

// Suffixes appended to the family name, tried in order. They cover the
// `Family-Regular.ttf` convention, DejaVu's bare `Family.ttf` with `-Oblique`
// faces, and Windows' `arialbd.ttf` style names.
const REGULAR_SUFFIXES: &[&str] = &["-Regular", ""];
const BOLD_SUFFIXES: &[&str] = &["-Bold", "bd"];
const ITALIC_SUFFIXES: &[&str] = &["-Italic", "-Oblique", "i"];
const BOLD_ITALIC_SUFFIXES: &[&str] = &["-BoldItalic", "-BoldOblique", "bi"];

/// Looks for the family's faces directly inside `dir`. File names are
/// compared ignoring ASCII case; a regular face is required.
pub fn find_family_files(dir: &Path, family: &str) -> Option<FamilyFiles> {
    let files: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    let face = |suffixes: &[&str]| {
        suffixes.iter().find_map(|suffix| {
            let wanted = format!("{}{}.ttf", family, suffix);
            files
                .iter()
                .find(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map_or(false, |name| name.eq_ignore_ascii_case(&wanted))
                })
                .cloned()
        })
    };

    Some(FamilyFiles {
        regular: face(REGULAR_SUFFIXES)?,
        bold: face(BOLD_SUFFIXES),
        italic: face(ITALIC_SUFFIXES),
        bold_italic: face(BOLD_ITALIC_SUFFIXES),
    })
}

/// A loaded family, remembering whether it replaced the one asked for
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub family: String,
    pub fell_back: bool,
    pub fonts: FontFamily<FontData>,
}

/// Searches a list of directories for font families, with an ordered list of
/// families to fall back on
#[derive(Debug)]
pub struct FontResolver {
    search_dirs: Vec<PathBuf>,
    fallback_families: Vec<String>,
    cache: HashMap<String, FontFamily<FontData>>,
}

impl FontResolver {
    pub fn new(search_dirs: Vec<PathBuf>, fallback_families: Vec<String>) -> Self {
        Self {
            search_dirs,
            fallback_families,
            cache: HashMap::new(),
        }
    }

    /// Finds the family in the search directories or one level below them
    pub fn locate(&self, family: &str) -> Option<FamilyFiles> {
        for dir in &self.search_dirs {
            if let Some(files) = find_family_files(dir, family) {
                return Some(files);
            }

            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            let mut subdirs: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect();
            subdirs.sort();

            if let Some(files) = subdirs.iter().find_map(|sub| find_family_files(sub, family)) {
                return Some(files);
            }
        }
        None
    }

    /// Loads `family`, or the first fallback family that can be loaded
    pub fn resolve(&mut self, family: &str) -> Result<ResolvedFont> {
        let missing = match self.load_cached(family) {
            Ok(fonts) => {
                return Ok(ResolvedFont {
                    family: family.to_string(),
                    fell_back: false,
                    fonts,
                })
            }
            Err(e) => e,
        };

        let fallbacks: Vec<String> = self
            .fallback_families
            .iter()
            .filter(|fallback| fallback.as_str() != family)
            .cloned()
            .collect();
        for fallback in fallbacks {
            match self.load_cached(&fallback) {
                Ok(fonts) => {
                    warn!("Could not load font '{}' ({}), falling back to '{}'", family, missing, fallback);
                    return Ok(ResolvedFont {
                        family: fallback,
                        fell_back: true,
                        fonts,
                    });
                }
                Err(e) => debug!("Fallback font '{}' unavailable: {}", fallback, e),
            }
        }

        Err(ConverterError::FontResolution {
            family: family.to_string(),
            reason: format!("{}; none of the fallbacks {:?} could be loaded", missing, self.fallback_families),
        })
    }

    fn load_cached(&mut self, family: &str) -> Result<FontFamily<FontData>> {
        if let Some(fonts) = self.cache.get(family) {
            return Ok(fonts.clone());
        }

        let files = self.locate(family).ok_or_else(|| ConverterError::FontResolution {
            family: family.to_string(),
            reason: format!("no regular face found in {:?}", self.search_dirs),
        })?;
        let fonts = load_family(family, &files)?;
        debug!("Loaded font '{}' from {}", family, files.regular.display());

        self.cache.insert(family.to_string(), fonts.clone());
        Ok(fonts)
    }
}

fn load_face(family: &str, path: &Path) -> Result<FontData> {
    let bytes = fs::read(path).map_err(|e| ConverterError::filesystem(path, e))?;
    FontData::new(bytes, None).map_err(|e| ConverterError::FontResolution {
        family: family.to_string(),
        reason: format!("{}: {}", path.display(), e),
    })
}

/// Missing bold or italic faces reuse the closest face that exists
fn load_family(family: &str, files: &FamilyFiles) -> Result<FontFamily<FontData>> {
    let regular = load_face(family, &files.regular)?;
    let optional = |path: &Option<PathBuf>, fallback: &FontData| -> Result<FontData> {
        match path {
            Some(path) => load_face(family, path),
            None => Ok(fallback.clone()),
        }
    };

    let bold = optional(&files.bold, &regular)?;
    let italic = optional(&files.italic, &regular)?;
    let bold_italic = optional(&files.bold_italic, &bold)?;

    Ok(FontFamily {
        regular,
        bold,
        italic,
        bold_italic,
    })
}
