//! Loads the `ImageName,X,Y` lookup table.
//!
//! Parsing is deliberately naive: the first line is dropped as a header and
//! every other line is split on literal commas. Quoted fields are not
//! understood, so an image name containing a comma cannot be expressed.

use crate::error::{ConverterError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One data row of the lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub image_name: String,
    pub x: String,
    pub y: String,
}

impl CsvRecord {
    /// The two-line label drawn on the page
    pub fn label(&self) -> String {
        format!("{}\n X = {}, Y = {}", self.image_name, self.x, self.y)
    }
}

/// Reads and parses the CSV file at `path`
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<CsvRecord>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ConverterError::filesystem(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let records = parse_records(&content)?;
    info!("Loaded {} CSV records from {}", records.len(), path.display());
    Ok(records)
}

/// Parses CSV text, skipping the header line and blank lines.
///
/// A data line with fewer than three fields fails the whole load.
pub fn parse_records(content: &str) -> Result<Vec<CsvRecord>> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            return Err(ConverterError::MalformedCsvRow {
                line: index + 1,
                fields: fields.len(),
                content: line.to_string(),
            });
        }

        let record = CsvRecord {
            image_name: fields[0].trim().to_string(),
            x: fields[1].trim().to_string(),
            y: fields[2].trim().to_string(),
        };
        debug!("CSV line {}: {:?}", index + 1, record);
        records.push(record);
    }

    Ok(records)
}
