pub mod blobs;
pub mod decimal;
pub mod factory;
pub mod repository;

pub use blobs::FsBlobStore;
pub use factory::SqliteBackendFactory;
pub use repository::SqliteReportRepository;
