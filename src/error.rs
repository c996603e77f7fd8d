use std::path::PathBuf;
use thiserror::Error;

/// Error types for the image-to-PDF labelling pipeline
#[derive(Error, Debug)]
pub enum ConverterError {
    /// A required input (image folder or CSV file) was not chosen
    #[error("Please select your {what} and try again")]
    SelectionMissing { what: &'static str },

    /// The selected folder holds no supported images
    #[error("Your folder is empty: no supported images in {}", path.display())]
    EmptyFolder { path: PathBuf },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV data line had fewer than three comma-separated fields
    #[error("Malformed CSV row at line {line}: expected at least 3 fields, found {fields} in {content:?}")]
    MalformedCsvRow {
        line: usize,
        fields: usize,
        content: String,
    },

    #[error("Invalid numeric value for {field}: {value:?} is not an integer")]
    InvalidNumericField { field: &'static str, value: String },

    /// Neither the requested font family nor the default one could be loaded
    #[error("Font loading failed for '{family}': {reason}")]
    FontResolution { family: String, reason: String },

    #[error("Could not decode image {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("PDF generation failed for {}: {reason}", path.display())]
    PdfGeneration { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConverterError {
    /// Wraps an I/O error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for failures the user fixes by choosing different inputs before any work starts
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::SelectionMissing { .. } | Self::EmptyFolder { .. } | Self::InvalidNumericField { .. }
        )
    }
}

/// Convenience Result type with ConverterError
pub type Result<T> = std::result::Result<T, ConverterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_underlying_description() {
        let err = ConverterError::filesystem(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        let message = err.to_string();
        assert!(message.contains("/missing"));
        assert!(message.contains("no such directory"));

        let err = ConverterError::InvalidNumericField {
            field: "text_x",
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("text_x"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_malformed_row_is_not_a_precondition() {
        let err = ConverterError::MalformedCsvRow {
            line: 2,
            fields: 1,
            content: "onlyonefield".to_string(),
        };
        assert!(!err.is_precondition());
        assert!(err.to_string().contains("line 2"));
    }
}
