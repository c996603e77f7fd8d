//! Pairs located images with their CSV rows.

use crate::csv_loader::CsvRecord;
use crate::locator::{eq_ignore_case, ImageFile};
use tracing::debug;

/// An image together with the CSV row that names it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub image: ImageFile,
    pub record: CsvRecord,
}

/// Outcome of matching, including what was left over on either side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Matched pairs in image order
    pub pairs: Vec<MatchedPair>,
    /// Images without a CSV row; these produce no output
    pub unmatched_images: Vec<ImageFile>,
    /// CSV rows no image asked for
    pub unused_records: Vec<CsvRecord>,
}

impl MatchReport {
    pub fn unmatched_names(&self) -> Vec<String> {
        self.unmatched_images.iter().map(|image| image.base_name.clone()).collect()
    }
}

/// Finds, for every image, the first record whose name equals the image's
/// base name ignoring case. Unmatched images are dropped from the pairs.
pub fn match_images(images: &[ImageFile], records: &[CsvRecord]) -> MatchReport {
    let mut used = vec![false; records.len()];
    let mut report = MatchReport::default();

    for image in images {
        let found = records
            .iter()
            .position(|record| eq_ignore_case(&record.image_name, &image.base_name));

        match found {
            Some(index) => {
                used[index] = true;
                debug!("Matched {} to CSV row {:?}", image.path.display(), records[index].image_name);
                report.pairs.push(MatchedPair {
                    image: image.clone(),
                    record: records[index].clone(),
                });
            }
            None => {
                debug!("No CSV row for {}, skipping", image.path.display());
                report.unmatched_images.push(image.clone());
            }
        }
    }

    report.unused_records = records
        .iter()
        .zip(used)
        .filter(|(_, used)| !used)
        .map(|(record, _)| record.clone())
        .collect();

    report
}
