//! Application settings loaded from `roi.toml`.
//!
//! Every field has a default, so a missing default file is not an error.
//! Supabase credentials can also come from the environment:
//!
//! | variable       | effect                                          |
//! |----------------|-------------------------------------------------|
//! | `SUPABASE_URL` | selects the `supabase` backend at this project  |
//! | `SUPABASE_KEY` | API key sent with every request                 |

use std::path::{Path, PathBuf};
use std::time::Duration;

use roi_core::currency::DEFAULT_LOCALE_CANDIDATES;
use roi_core::sync::{DEFAULT_BUCKET, DEFAULT_TABLE, DEFAULT_TIMEOUT};
use roi_core::{BackendConfig, CurrencyLocale, SyncTarget};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "roi.toml";
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sync: SyncSettings,
    pub report: ReportSettings,
    pub currency: CurrencySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// When false the report is only written locally.
    pub enabled: bool,
    pub backend: String,
    /// Database file for `sqlite`, project URL for `supabase`.
    pub connection_string: String,
    pub api_key: Option<String>,
    /// Where the `sqlite` backend stores uploaded PDFs.
    pub blob_dir: PathBuf,
    pub public_base_url: Option<String>,
    pub bucket: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "sqlite".to_string(),
            connection_string: "roi_reports.db".to_string(),
            api_key: None,
            blob_dir: PathBuf::from("storage"),
            public_base_url: None,
            bucket: DEFAULT_BUCKET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Overrides the bundled DejaVu fonts with `DejaVuSans.ttf` and
    /// `DejaVuSans-Bold.ttf` from this directory.
    pub font_dir: Option<PathBuf>,
    /// Local copy of every generated PDF lands here.
    pub output_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            font_dir: None,
            output_dir: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrencySettings {
    /// Tried in order; the manual `Rp 1.234` format is used if none match.
    pub locales: Vec<String>,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            locales: DEFAULT_LOCALE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl Settings {
    /// Reads `path`, or `roi.toml` in the working directory when `path` is
    /// `None`. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let settings = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        settings.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sync.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [("sync.bucket", &self.sync.bucket), ("sync.table", &self.sync.table)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies `SUPABASE_URL` / `SUPABASE_KEY`. `lookup` is usually
    /// `std::env::var(..).ok()`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(SUPABASE_URL_VAR) {
            debug!("using Supabase project from environment");
            self.sync.backend = "supabase".to_string();
            self.sync.connection_string = url;
        }
        if let Some(key) = non_empty(SUPABASE_KEY_VAR) {
            self.sync.api_key = Some(key);
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            backend: self.sync.backend.clone(),
            connection_string: self.sync.connection_string.clone(),
            api_key: self.sync.api_key.clone(),
            blob_root: self.sync.blob_dir.clone(),
            public_base_url: self.sync.public_base_url.clone(),
        }
    }

    pub fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            bucket: self.sync.bucket.clone(),
            table: self.sync.table.clone(),
        }
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout_secs)
    }

    pub fn currency_locale(&self) -> CurrencyLocale {
        CurrencyLocale::resolve(&self.currency.locales)
    }
}
