pub mod calculations;
pub mod currency;
pub mod db;
pub mod models;
pub mod paths;
pub mod storage;
pub mod sync;
pub mod time;

pub use calculations::{ReportBuilder, ReportBuilderError, calculate_roi};
pub use currency::{CurrencyLocale, format_currency, format_currency_f64, format_currency_str};
pub use db::{BackendConfig, BackendFactory, BackendRegistry, ReportRepository, RepositoryError, SyncBackend};
pub use models::*;
pub use paths::StoragePath;
pub use storage::{BlobStore, StorageError, UploadOutcome};
pub use sync::{SyncError, SyncGateway, SyncOutcome, SyncTarget};
