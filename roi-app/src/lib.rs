//! Command-line shell for the ROI report calculator: configuration,
//! logging, session state and the submission pipeline.

pub mod config;
pub mod dashboard;
pub mod form;
pub mod logging;
pub mod pipeline;
pub mod state;
pub mod utils;

pub use config::{ConfigError, Settings};
pub use pipeline::{Remote, Services, SubmissionOutcome, SubmitError, SyncReport, build_registry, submit, submit_at};
pub use state::{SessionState, SyncStatus};
