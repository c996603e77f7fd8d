//! One "start" action: locate, load, match, then compose and emit each page.

use crate::csv_loader::{self, CsvRecord};
use crate::emitter::PdfEmitter;
use crate::error::{ConverterError, Result};
use crate::layout;
use crate::locator::{self, ImageFile};
use crate::matcher::{self, MatchReport};
use crate::options::RenderOptions;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs for a single run. Nothing survives between runs.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub image_dir: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub options: RenderOptions,
}

/// What a completed run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub images_found: usize,
    pub written: Vec<PathBuf>,
    pub unmatched_images: Vec<String>,
    pub unused_records: Vec<CsvRecord>,
}

/// Inputs located and matched, before anything is written
#[derive(Debug, Clone)]
pub struct Prepared {
    pub image_dir: PathBuf,
    pub images: Vec<ImageFile>,
    pub report: MatchReport,
}

fn require<'a>(value: &'a Option<PathBuf>, what: &'static str) -> Result<&'a Path> {
    value
        .as_deref()
        .ok_or(ConverterError::SelectionMissing { what })
}

/// Checks selections, locates images and loads the CSV, then matches them.
///
/// Fails before the CSV is read when the folder is missing or empty.
pub fn prepare(request: &RunRequest) -> Result<Prepared> {
    let image_dir = require(&request.image_dir, "images folder")?;
    let images = locator::locate_images(image_dir)?;
    if images.is_empty() {
        return Err(ConverterError::EmptyFolder {
            path: image_dir.to_path_buf(),
        });
    }
    info!("Found {} images in {}", images.len(), image_dir.display());

    let csv_path = require(&request.csv_path, "CSV file")?;
    let records = csv_loader::load_records(csv_path)?;

    let report = matcher::match_images(&images, &records);
    info!(
        "Matched {} of {} images ({} CSV rows unused)",
        report.pairs.len(),
        images.len(),
        report.unused_records.len()
    );

    Ok(Prepared {
        image_dir: image_dir.to_path_buf(),
        images,
        report,
    })
}

/// Runs the whole batch synchronously.
///
/// Numeric options are validated before any I/O. The first failure stops the
/// batch; PDFs already written stay on disk.
pub fn run<E: PdfEmitter>(request: &RunRequest, emitter: &mut E) -> Result<RunSummary> {
    let options = request.options.validate()?;
    let prepared = prepare(request)?;

    let mut summary = RunSummary {
        images_found: prepared.images.len(),
        unmatched_images: prepared.report.unmatched_names(),
        unused_records: prepared.report.unused_records.clone(),
        ..Default::default()
    };
    for name in &summary.unmatched_images {
        warn!("No CSV row for image '{}', no PDF written", name);
    }

    for pair in &prepared.report.pairs {
        let (width, height) = pair.image.dimensions()?;
        if width == 0 || height == 0 {
            return Err(ConverterError::ImageDecode {
                path: pair.image.path.clone(),
                reason: "image has no pixels".to_string(),
            });
        }

        let page = layout::compose_page(pair, (width, height), &options, &prepared.image_dir);
        emitter.emit(&page)?;
        summary.written.push(page.output_path);
    }

    info!("Done: wrote {} PDFs", summary.written.len());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        pages: Vec<PageLayout>,
    }

    impl PdfEmitter for Recorder {
        fn emit(&mut self, page: &PageLayout) -> Result<()> {
            self.pages.push(page.clone());
            Ok(())
        }
    }

    #[test]
    fn test_missing_folder_selection() {
        let request = RunRequest {
            csv_path: Some(PathBuf::from("table.csv")),
            ..Default::default()
        };
        let err = run(&request, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, ConverterError::SelectionMissing { what: "images folder" }));
    }

    #[test]
    fn test_missing_csv_selection() {
        let dir = TempDir::new().unwrap();
        image::RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();

        let request = RunRequest {
            image_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = run(&request, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, ConverterError::SelectionMissing { what: "CSV file" }));
    }

    #[test]
    fn test_invalid_numbers_stop_before_io() {
        let mut request = RunRequest {
            image_dir: Some(PathBuf::from("/does/not/exist")),
            csv_path: Some(PathBuf::from("/does/not/exist.csv")),
            ..Default::default()
        };
        request.options.text_box.x = "fifty".to_string();

        let mut recorder = Recorder::default();
        let err = run(&request, &mut recorder).unwrap_err();
        assert!(matches!(err, ConverterError::InvalidNumericField { field: "text_x", .. }));
        assert!(recorder.pages.is_empty());
    }

    #[test]
    fn test_prepare_reports_matches() {
        let dir = TempDir::new().unwrap();
        image::RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();
        image::RgbImage::new(2, 2).save(dir.path().join("b.png")).unwrap();
        let csv = dir.path().join("table.csv");
        std::fs::write(&csv, "ImageName,X,Y\nA,1,2\nz,3,4\n").unwrap();

        let prepared = prepare(&RunRequest {
            image_dir: Some(dir.path().to_path_buf()),
            csv_path: Some(csv),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(prepared.images.len(), 2);
        assert_eq!(prepared.report.pairs.len(), 1);
        assert_eq!(prepared.report.unmatched_names(), vec!["b".to_string()]);
        assert_eq!(prepared.report.unused_records[0].image_name, "z");
    }
}
