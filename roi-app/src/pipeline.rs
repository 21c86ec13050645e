//! One "compute and save" action, from form input to synced report.
//!
//! Steps run in order: validate, build the report, render charts and the
//! PDF, write the local copy, then upload and insert. Only invalid input
//! stops a submission; every later failure becomes a warning or a failed
//! sync status on the returned state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use roi_core::time::now_wib;
use roi_core::{
    BackendRegistry, InputError, ReportBuilder, ReportBuilderError, ReportRecord, RoiInput, StoragePath,
    SyncError, SyncGateway, SyncOutcome,
};
use roi_db_sqlite::SqliteBackendFactory;
use roi_render::{ChartKind, ReportRenderer};
use roi_supabase::SupabaseBackendFactory;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::state::{SessionState, SyncStatus};

/// Errors that stop a submission before anything is produced.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Build(#[from] ReportBuilderError),
}

/// Registry with every backend this binary ships.
pub fn build_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(Box::new(SqliteBackendFactory));
    registry.register(Box::new(SupabaseBackendFactory));
    registry
}

/// Where finished reports are sent.
#[derive(Debug)]
pub enum Remote {
    Ready(SyncGateway),
    /// The backend could not be set up; the reason is shown once per
    /// submission.
    Unavailable(String),
    Disabled,
}

#[derive(Debug)]
pub struct Services {
    pub renderer: ReportRenderer,
    pub remote: Remote,
    pub output_dir: PathBuf,
}

impl Services {
    /// Loads fonts, picks the currency locale and opens the configured
    /// backend. Never fails: a backend that cannot be opened leaves the
    /// shell in local-only mode.
    pub async fn connect(
        settings: &Settings,
        registry: &BackendRegistry,
    ) -> Self {
        let renderer =
            ReportRenderer::new(settings.report.font_dir.as_deref()).with_locale(settings.currency_locale());

        let remote = if !settings.sync.enabled {
            debug!("sync disabled");
            Remote::Disabled
        } else {
            match registry.create(&settings.backend_config()).await {
                Ok(backend) => {
                    let gateway = SyncGateway::new(backend, settings.sync_target())
                        .with_timeout(settings.sync_timeout());
                    Remote::Ready(gateway)
                }
                Err(err) => {
                    warn!(backend = %settings.sync.backend, error = %err, "sync backend unavailable");
                    Remote::Unavailable(err.to_string())
                }
            }
        };

        Self {
            renderer,
            remote,
            output_dir: settings.report.output_dir.clone(),
        }
    }

    pub fn gateway(&self) -> Option<&SyncGateway> {
        match &self.remote {
            Remote::Ready(gateway) => Some(gateway),
            _ => None,
        }
    }
}

/// What happened to the sync step of a submission.
#[derive(Debug)]
pub enum SyncReport {
    Synced(SyncOutcome),
    Skipped(String),
    Failed(SyncError),
}

impl SyncReport {
    pub fn status(&self) -> SyncStatus {
        match self {
            SyncReport::Synced(_) => SyncStatus::Succeeded,
            SyncReport::Skipped(_) => SyncStatus::NotAttempted,
            SyncReport::Failed(_) => SyncStatus::Failed,
        }
    }

    pub fn public_url(&self) -> Option<&str> {
        match self {
            SyncReport::Synced(outcome) => Some(outcome.upload.url()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    /// The report as calculated, with `pdf_link` set once synced.
    pub report: ReportRecord,
    pub charts: Vec<ChartKind>,
    pub storage_path: StoragePath,
    /// Local copy of the PDF, when one was produced and written.
    pub pdf_file: Option<PathBuf>,
    pub sync: SyncReport,
    pub warnings: Vec<String>,
}

/// Runs one submission stamped with the current WIB time.
pub async fn submit(
    state: &SessionState,
    input: &RoiInput,
    services: &Services,
) -> Result<(SessionState, SubmissionOutcome), SubmitError> {
    submit_at(state, input, services, now_wib()).await
}

/// Runs one submission stamped with `timestamp`.
///
/// # Errors
///
/// [`SubmitError`] when the input is incomplete or out of range, or the
/// figures overflow. `state` is not advanced in that case.
pub async fn submit_at(
    state: &SessionState,
    input: &RoiInput,
    services: &Services,
    timestamp: DateTime<FixedOffset>,
) -> Result<(SessionState, SubmissionOutcome), SubmitError> {
    input
        .validate()
        .inspect_err(|err| warn!(error = %err, "submission rejected"))?;

    let report = ReportBuilder::new(input).build(timestamp)?;
    info!(
        client = %input.client.name,
        roi_1_year = %report.roi_1_year.display_percent(),
        "ROI calculated"
    );

    let rendered = services.renderer.render(&report);
    let mut warnings = rendered.warnings;
    let charts = rendered.charts.iter().map(|chart| chart.kind).collect();
    let storage_path = StoragePath::for_report(&report);

    let pdf_file = match &rendered.pdf {
        Some(bytes) => match save_local_copy(&services.output_dir, &storage_path, bytes) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %err, "could not write local PDF");
                warnings.push(format!("Could not save the PDF locally: {err}"));
                None
            }
        },
        None => None,
    };

    let sync = match (rendered.pdf, &services.remote) {
        (None, _) => {
            warnings.push("PDF content could not be created; sync will not run.".to_string());
            SyncReport::Skipped("no PDF".to_string())
        }
        (Some(_), Remote::Disabled) => SyncReport::Skipped("sync disabled".to_string()),
        (Some(_), Remote::Unavailable(reason)) => {
            warnings.push(format!("Remote storage unavailable, sync skipped: {reason}"));
            SyncReport::Skipped(reason.clone())
        }
        (Some(pdf), Remote::Ready(gateway)) => match gateway.sync(&report, pdf).await {
            Ok(outcome) => SyncReport::Synced(outcome),
            Err(err) => {
                error!(error = %err, "sync failed");
                SyncReport::Failed(err)
            }
        },
    };

    let report = match &sync {
        SyncReport::Synced(outcome) => outcome.report.clone(),
        _ => report,
    };
    let next = state.after_submission(report.clone(), sync.status());

    Ok((
        next,
        SubmissionOutcome {
            report,
            charts,
            storage_path,
            pdf_file,
            sync,
            warnings,
        },
    ))
}

/// Writes `pdf` to `dir` under the storage file name, replacing an older
/// copy from the same day.
fn save_local_copy(
    dir: &Path,
    path: &StoragePath,
    pdf: &[u8],
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let file = dir.join(path.file_name());
    std::fs::write(&file, pdf)?;
    debug!(file = %file.display(), "local PDF written");
    Ok(file)
}
