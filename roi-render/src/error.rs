use std::path::PathBuf;

use thiserror::Error;

use crate::charts::ChartKind;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font {path} could not be loaded: {reason}")]
    FontLoad { path: PathBuf, reason: String },

    #[error("{kind} chart failed: {reason}")]
    Chart { kind: ChartKind, reason: String },

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
