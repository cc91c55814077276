use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::app_config::{AppConfig, Environment, SourceKeys};
use crate::ConfigError;

/// Characters escaped in the user and password of a database URL.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let database_url = match optional("DATABASE_URL") {
        Some(url) => url,
        None => database_url_from_parts(&lookup)?,
    };

    let env = parse_environment(&or_default("PKDSCORE_ENV", "development"));
    let bind_addr: SocketAddr = parsed_or(&lookup, "PKDSCORE_BIND_ADDR", "127.0.0.1:8000")?;
    let log_level = or_default("PKDSCORE_LOG_LEVEL", "info");
    let tags_path = PathBuf::from(or_default("PKDSCORE_TAGS_PATH", "./config/tags.yaml"));
    let data_dir = PathBuf::from(or_default("PKDSCORE_DATA_DIR", "./data"));

    let keys = SourceKeys {
        ceidg_api_key: optional("CEIDG_API_KEY"),
        gus_api_key: optional("GUS_API_KEY"),
        youtube_api_key: optional("YOUTUBE_API_KEY"),
        wykop_api_key: optional("WYKOP_API_KEY"),
        wykop_secret_key: optional("WYKOP_SECRET_KEY"),
    };

    let db_max_connections = parsed_or(&lookup, "PKDSCORE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parsed_or(&lookup, "PKDSCORE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parsed_or(&lookup, "PKDSCORE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parsed_or(&lookup, "PKDSCORE_HTTP_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("PKDSCORE_USER_AGENT", "pkdscore/0.1 (sector-scoring)");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        tags_path,
        data_dir,
        keys,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        user_agent,
    })
}

/// Assemble a Postgres URL from the discrete `DB_*` variables.
///
/// Every part is required once `DATABASE_URL` is absent. User and password
/// are percent-encoded.
fn database_url_from_parts<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let host = require("DB_HOST")?;
    let port = require("DB_PORT")?;
    let name = require("DB_NAME")?;
    let user = require("DB_USER")?;
    let pass = require("DB_PASS")?;

    parse_var::<u16>("DB_PORT", &port)?;

    let user = utf8_percent_encode(&user, USERINFO);
    let pass = utf8_percent_encode(&pass, USERINFO);
    Ok(format!("postgres://{user}:{pass}@{host}:{port}/{name}"))
}

/// `var` parsed as `T`, or `default` parsed when unset.
fn parsed_or<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    parse_var(var, &raw)
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

impl SourceKeys {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `CEIDG_API_KEY` is unset.
    pub fn ceidg(&self) -> Result<&str, ConfigError> {
        require_key(self.ceidg_api_key.as_deref(), "CEIDG_API_KEY")
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GUS_API_KEY` is unset.
    pub fn gus(&self) -> Result<&str, ConfigError> {
        require_key(self.gus_api_key.as_deref(), "GUS_API_KEY")
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `YOUTUBE_API_KEY` is unset.
    pub fn youtube(&self) -> Result<&str, ConfigError> {
        require_key(self.youtube_api_key.as_deref(), "YOUTUBE_API_KEY")
    }

    /// Wykop key and secret, both required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn wykop(&self) -> Result<(&str, &str), ConfigError> {
        let key = require_key(self.wykop_api_key.as_deref(), "WYKOP_API_KEY")?;
        let secret = require_key(self.wykop_secret_key.as_deref(), "WYKOP_SECRET_KEY")?;
        Ok((key, secret))
    }
}

fn require_key<'a>(value: Option<&'a str>, var: &str) -> Result<&'a str, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}
