pub mod factory;
pub mod repository;

pub use factory::{BackendConfig, BackendFactory, BackendRegistry, SyncBackend};
pub use repository::{ReportRepository, RepositoryError};
