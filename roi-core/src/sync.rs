//! Publishing a finished report: PDF to object storage, row to the table.
//!
//! The upload always runs first and the insert only runs once the upload
//! has produced a public address, which is written into the row's
//! `pdf_link`. Each remote call is tried once and bounded by the gateway's
//! timeout.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::db::{RepositoryError, SyncBackend};
use crate::models::{PersistedReport, ReportRecord};
use crate::paths::StoragePath;
use crate::storage::{StorageError, UploadOutcome, upload_or_reuse};

pub const DEFAULT_BUCKET: &str = "laporan-pdf";
pub const DEFAULT_TABLE: &str = "laporan_roi";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

/// Bucket and table a gateway writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub bucket: String,
    pub table: String,
}

impl Default for SyncTarget {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// Result of a completed sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub upload: UploadOutcome,
    pub path: StoragePath,
    /// The report as persisted, with `pdf_link` attached.
    pub report: ReportRecord,
}

#[derive(Debug)]
pub struct SyncGateway {
    backend: SyncBackend,
    target: SyncTarget,
    timeout: Duration,
}

impl SyncGateway {
    pub fn new(
        backend: SyncBackend,
        target: SyncTarget,
    ) -> Self {
        Self {
            backend,
            target,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }

    pub fn backend(&self) -> &SyncBackend {
        &self.backend
    }

    /// Uploads `pdf` at `path`. An object already at `path` is reused.
    pub async fn upload_pdf(
        &self,
        path: &StoragePath,
        pdf: Vec<u8>,
    ) -> Result<UploadOutcome, SyncError> {
        let key = path.key();
        let upload = upload_or_reuse(self.backend.blobs.as_ref(), &self.target.bucket, &key, pdf);
        Ok(self.bounded("upload", upload).await??)
    }

    /// Inserts the sanitized form of `report`.
    pub async fn insert_report(
        &self,
        report: &ReportRecord,
    ) -> Result<(), SyncError> {
        let row = report.to_persisted();
        let insert = self.backend.reports.insert_report(&self.target.table, &row);
        Ok(self.bounded("insert", insert).await??)
    }

    /// Uploads the PDF, then inserts the report carrying its address.
    pub async fn sync(
        &self,
        report: &ReportRecord,
        pdf: Vec<u8>,
    ) -> Result<SyncOutcome, SyncError> {
        let path = StoragePath::for_report(report);
        debug!(%path, bytes = pdf.len(), "syncing report");

        let upload = self.upload_pdf(&path, pdf).await.inspect_err(|err| {
            error!(%path, error = %err, "PDF upload failed");
        })?;

        let report = report.with_pdf_link(upload.url());
        self.insert_report(&report).await.inspect_err(|err| {
            error!(table = %self.target.table, error = %err, "report insert failed");
        })?;

        info!(url = upload.url(), "report synced");
        Ok(SyncOutcome {
            upload,
            path,
            report,
        })
    }

    /// Latest rows of the target table, newest first.
    pub async fn recent_reports(
        &self,
        limit: u32,
    ) -> Result<Vec<PersistedReport>, SyncError> {
        let list = self.backend.reports.list_reports(&self.target.table, limit);
        Ok(self.bounded("list", list).await??)
    }

    async fn bounded<F, T>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<T, SyncError>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| SyncError::Timeout {
                operation,
                timeout: self.timeout,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::ReportBuilder;
    use crate::db::ReportRepository;
    use crate::models::{PersistedReport, RoiInput};
    use crate::storage::BlobStore;
    use crate::time::wib;

    #[derive(Clone, Default)]
    struct Recorder {
        uploads: Arc<Mutex<Vec<String>>>,
        rows: Arc<Mutex<Vec<(String, PersistedReport)>>>,
    }

    struct RecordingStore {
        recorder: Recorder,
        fail_with: Option<StorageError>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            _bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), StorageError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            assert_eq!(content_type, "application/pdf");
            self.recorder
                .uploads
                .lock()
                .unwrap()
                .push(format!("{bucket}/{key}"));
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn public_url(
            &self,
            bucket: &str,
            key: &str,
        ) -> Result<String, StorageError> {
            Ok(format!("https://files.test/{bucket}/{key}"))
        }
    }

    struct RecordingRepository {
        recorder: Recorder,
        fail: bool,
    }

    #[async_trait]
    impl ReportRepository for RecordingRepository {
        async fn insert_report(
            &self,
            table: &str,
            report: &PersistedReport,
        ) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Database("constraint violated".to_string()));
            }
            self.recorder
                .rows
                .lock()
                .unwrap()
                .push((table.to_string(), report.clone()));
            Ok(())
        }

        async fn list_reports(
            &self,
            table: &str,
            limit: u32,
        ) -> Result<Vec<PersistedReport>, RepositoryError> {
            let rows = self.recorder.rows.lock().unwrap();
            Ok(rows
                .iter()
                .rev()
                .filter(|(t, _)| t == table)
                .take(limit as usize)
                .map(|(_, row)| row.clone())
                .collect())
        }
    }

    fn gateway(
        recorder: &Recorder,
        store_error: Option<StorageError>,
        insert_fails: bool,
    ) -> SyncGateway {
        let backend = SyncBackend {
            blobs: Box::new(RecordingStore {
                recorder: recorder.clone(),
                fail_with: store_error,
                delay: None,
            }),
            reports: Box::new(RecordingRepository {
                recorder: recorder.clone(),
                fail: insert_fails,
            }),
        };
        SyncGateway::new(backend, SyncTarget::default())
    }

    fn report() -> ReportRecord {
        let timestamp = wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        ReportBuilder::new(&RoiInput::default()).build(timestamp).unwrap()
    }

    #[tokio::test]
    async fn sync_uploads_then_inserts_with_link() {
        let recorder = Recorder::default();
        let gateway = gateway(&recorder, None, false);

        let outcome = gateway.sync(&report(), b"%PDF".to_vec()).await.unwrap();

        let key = "250131 Project Alpha Jakarta/250131 Project Alpha Jakarta.pdf";
        assert_eq!(*recorder.uploads.lock().unwrap(), vec![format!("laporan-pdf/{key}")]);
        let expected_url = format!("https://files.test/laporan-pdf/{key}");
        assert_eq!(outcome.upload, UploadOutcome::Created(expected_url.clone()));
        assert_eq!(outcome.report.pdf_link.as_deref(), Some(expected_url.as_str()));

        let rows = recorder.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "laporan_roi");
        assert_eq!(rows[0].1.pdf_link.as_deref(), Some(expected_url.as_str()));
    }

    #[tokio::test]
    async fn duplicate_upload_still_inserts_with_existing_link() {
        let recorder = Recorder::default();
        let duplicate = StorageError::Duplicate { key: "x".to_string() };
        let gateway = gateway(&recorder, Some(duplicate), false);

        let outcome = gateway.sync(&report(), vec![0]).await.unwrap();

        assert!(outcome.upload.is_reused());
        assert_eq!(recorder.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_upload_skips_insert() {
        let recorder = Recorder::default();
        let gateway = gateway(&recorder, Some(StorageError::Upload("403".to_string())), false);

        let err = gateway.sync(&report(), vec![0]).await.unwrap_err();

        assert_eq!(err, SyncError::Storage(StorageError::Upload("403".to_string())));
        assert!(recorder.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_insert_is_surfaced() {
        let recorder = Recorder::default();
        let gateway = gateway(&recorder, None, true);

        let err = gateway.sync(&report(), vec![0]).await.unwrap_err();

        assert!(matches!(err, SyncError::Repository(RepositoryError::Database(_))));
        assert_eq!(recorder.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upload_times_out() {
        let recorder = Recorder::default();
        let backend = SyncBackend {
            blobs: Box::new(RecordingStore {
                recorder: recorder.clone(),
                fail_with: None,
                delay: Some(Duration::from_secs(60)),
            }),
            reports: Box::new(RecordingRepository {
                recorder: recorder.clone(),
                fail: false,
            }),
        };
        let gateway = SyncGateway::new(backend, SyncTarget::default())
            .with_timeout(Duration::from_secs(5));

        let err = gateway.sync(&report(), vec![0]).await.unwrap_err();

        assert_eq!(
            err,
            SyncError::Timeout {
                operation: "upload",
                timeout: Duration::from_secs(5),
            }
        );
        assert!(recorder.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_reports_reads_target_table() {
        let recorder = Recorder::default();
        let gateway = gateway(&recorder, None, false);
        gateway.sync(&report(), vec![0]).await.unwrap();

        let rows = gateway.recent_reports(10).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client_name, "Project Alpha");
        assert!(gateway.recent_reports(0).await.unwrap().is_empty());
    }
}
