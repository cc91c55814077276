use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials for the external data sources.
///
/// Every key is optional at load time; each collector checks for the key it
/// needs and fails fast with [`crate::ConfigError::MissingEnvVar`].
#[derive(Clone, Default)]
pub struct SourceKeys {
    pub ceidg_api_key: Option<String>,
    pub gus_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub wykop_api_key: Option<String>,
    pub wykop_secret_key: Option<String>,
}

impl std::fmt::Debug for SourceKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("SourceKeys")
            .field("ceidg_api_key", &redact(&self.ceidg_api_key))
            .field("gus_api_key", &redact(&self.gus_api_key))
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("wykop_api_key", &redact(&self.wykop_api_key))
            .field("wykop_secret_key", &redact(&self.wykop_secret_key))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub tags_path: PathBuf,
    pub data_dir: PathBuf,
    pub keys: SourceKeys,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Directory holding `firmy_*.csv` registry exports.
    #[must_use]
    pub fn ceidg_dir(&self) -> PathBuf {
        self.data_dir.join("ceidg")
    }

    /// Directory holding dated `financial_report_*.json` files.
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports_financial")
    }

    #[must_use]
    pub fn ticker_cache_path(&self) -> PathBuf {
        self.data_dir.join("tickers_cache.json")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("tags_path", &self.tags_path)
            .field("data_dir", &self.data_dir)
            .field("database_url", &"[redacted]")
            .field("keys", &self.keys)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
