//! Image-to-PDF labeller
//!
//! Turns every image in a folder into its own A4 PDF, labelled with the
//! image name and the X/Y coordinates found for it in a CSV lookup table.

pub mod config;
pub mod csv_loader;
pub mod emitter;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod locator;
pub mod matcher;
pub mod options;
pub mod pipeline;

pub use config::AppConfig;
pub use error::{ConverterError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::AppConfig,
        csv_loader::CsvRecord,
        emitter::{GenpdfEmitter, PdfEmitter},
        error::{ConverterError, Result},
        fonts::FontResolver,
        layout::PageLayout,
        locator::ImageFile,
        matcher::{MatchReport, MatchedPair},
        options::{FontSpec, RenderOptions, Rgb, ScaleMode},
        pipeline::{RunRequest, RunSummary},
    };

    pub use tracing::{debug, error, info, warn};
}
