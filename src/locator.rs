//! Finds the images to label inside a single folder.

use crate::error::{ConverterError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted as images, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "tiff"];

/// A raster image found in the scanned folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    /// File name without its extension
    pub base_name: String,
}

impl ImageFile {
    pub fn new(path: PathBuf) -> Option<Self> {
        let base_name = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self { path, base_name })
    }

    /// Pixel width and height, read from the file header
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        image::image_dimensions(&self.path).map_err(|e| ConverterError::ImageDecode {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Upper-cases `c` when that maps it to exactly one char (`ß` and `ﬁ` stay as they are)
fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Compares two strings ignoring case, one char at a time
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().map(simple_upper).eq(b.chars().map(simple_upper))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|known| eq_ignore_case(ext, known)))
        .unwrap_or(false)
}

/// Lists the supported images directly inside `dir`, sorted by file name.
///
/// Subdirectories are not entered. A folder with no matching files yields an
/// empty list; a missing or unreadable folder is an error.
pub fn locate_images<P: AsRef<Path>>(dir: P) -> Result<Vec<ImageFile>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| ConverterError::filesystem(dir, e))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConverterError::filesystem(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| ConverterError::filesystem(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let path = entry.path();
        if !has_supported_extension(&path) {
            debug!("Skipping non-image file {}", path.display());
            continue;
        }
        match ImageFile::new(path) {
            Some(image) => {
                if image.path.file_stem().and_then(|stem| stem.to_str()).is_none() {
                    warn!(
                        "Image name {} is not valid UTF-8, matching it as '{}'",
                        image.path.display(),
                        image.base_name
                    );
                }
                images.push(image);
            }
            None => debug!("Skipping {} without a file name", entry.path().display()),
        }
    }

    images.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!("Located {} images in {}", images.len(), dir.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_filters_by_extension_case_insensitively() {
        let dir = TempDir::new().unwrap();
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.tiff", "e.gif", "f.txt", "g.tif", "noext"] {
            touch(dir.path(), name);
        }

        let names: Vec<String> = locate_images(dir.path())
            .unwrap()
            .into_iter()
            .map(|image| image.base_name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_does_not_recurse() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.png");
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        touch(&dir.path().join("nested.png"), "inner.png");

        let images = locate_images(dir.path()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].base_name, "top");
    }

    #[test]
    fn test_empty_folder_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(locate_images(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_folder_is_a_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            locate_images(&missing),
            Err(ConverterError::Filesystem { .. })
        ));
    }

    #[test]
    fn test_dimensions_from_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::new(40, 10).save(&path).unwrap();

        let image = ImageFile::new(path).unwrap();
        assert_eq!(image.dimensions().unwrap(), (40, 10));
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Foo", "fOO"));
        assert!(eq_ignore_case("ÉTÉ", "été"));
        assert!(!eq_ignore_case("foo", "foo2"));
    }

    #[test]
    fn test_multi_char_upper_cases_do_not_fold() {
        assert!(!eq_ignore_case("straße", "STRASSE"));
        assert!(!eq_ignore_case("ﬁle", "FILE"));
        assert!(eq_ignore_case("straße", "STRAßE"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_kept_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.png"));
        let image = ImageFile::new(path.clone()).unwrap();
        assert_eq!(image.base_name, "caf\u{FFFD}");

        fs::write(&path, b"").unwrap();
        let names: Vec<String> = locate_images(dir.path())
            .unwrap()
            .into_iter()
            .map(|image| image.base_name)
            .collect();
        assert_eq!(names, vec!["caf\u{FFFD}"]);
    }
}
