//! Store connection settings and logging setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable naming the relational store host.
pub const RELATIONAL_HOST_VAR: &str = "POSTGRES_HOST";
/// Environment variable naming the document store host.
pub const DOCUMENT_HOST_VAR: &str = "MONGO_HOST";

/// Environment variable for the default log level (`RUST_LOG` still wins).
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
/// Environment variable selecting `text`, `pretty` or `json` log output.
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "localhost";

/// Fixed relational store parameters.
pub mod relational {
    use std::time::Duration;

    pub const PORT: u16 = 5432;
    pub const USER: &str = "postgres";
    pub const PASSWORD: &str = "docker";
    pub const DATABASE: &str = "operations";
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Fixed document store parameters.
pub mod document {
    use std::time::Duration;

    pub const PORT: u16 = 27017;
    pub const DATABASE: &str = "calculator";
    pub const COLLECTION: &str = "calculator";
    pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Hosts for the two stores. Everything else is a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub relational_host: String,
    pub document_host: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            relational_host: DEFAULT_HOST.to_string(),
            document_host: DEFAULT_HOST.to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads hosts from the process environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Unset or empty values fall back to `localhost`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string())
        };
        Self {
            relational_host: host(RELATIONAL_HOST_VAR),
            document_host: host(DOCUMENT_HOST_VAR),
        }
    }

    /// Connection URI for the document store.
    pub fn document_uri(&self) -> String {
        format!(
            "mongodb://{}:{}/?serverSelectionTimeoutMS={}",
            self.document_host,
            document::PORT,
            document::SERVER_SELECTION_TIMEOUT.as_millis()
        )
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Reads `LOG_LEVEL` and `LOG_FORMAT`, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or empty values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str, fallback: String| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            level: value(LOG_LEVEL_VAR, defaults.level),
            format: value(LOG_FORMAT_VAR, defaults.format),
        }
    }

    /// Installs the global tracing subscriber. `RUST_LOG` overrides `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).try_init(),
            "pretty" => fmt().pretty().with_env_filter(filter).try_init(),
            _ => fmt().with_env_filter(filter).try_init(),
        };
        if let Err(err) = result {
            tracing::debug!(error = %err, "tracing subscriber already installed");
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
