//! Remote sync backend: Supabase Storage for PDFs and the PostgREST API for
//! report rows.

pub mod client;
pub mod factory;
pub mod rest;
pub mod storage;

pub use client::{ClientError, SupabaseClient};
pub use factory::SupabaseBackendFactory;
pub use rest::SupabaseReportRepository;
pub use storage::SupabaseBlobStore;
