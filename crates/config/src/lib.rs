use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "carebridge.toml",
    "config/carebridge.toml",
    "crates/config/carebridge.toml",
    "../carebridge.toml",
    "../config/carebridge.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub tenancy: TenancyConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

/// Gates tenant routing. When disabled every request is served from the
/// default store and any supplied tenant id is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    pub multi_tenant_enabled: bool,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            multi_tenant_enabled: true,
        }
    }
}

/// Store locators and the limits applied to every store connection.
///
/// ```
/// use carebridge_config::DatabaseConfig;
///
/// let database = DatabaseConfig::default();
/// assert_eq!(database.connect_timeout().as_secs(), 5);
/// assert!(database.registry_url.starts_with("sqlite://"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub registry_url: String,
    pub default_url: String,
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "DatabaseConfig::default_operation_timeout")]
    pub operation_timeout_seconds: u64,
}

impl DatabaseConfig {
    const fn default_connect_timeout() -> u64 {
        5
    }

    const fn default_operation_timeout() -> u64 {
        5
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds.max(1))
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_seconds.max(1))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            registry_url: "sqlite://data/registry.db".to_string(),
            default_url: "sqlite://data/default.db".to_string(),
            max_connections: 10,
            connect_timeout_seconds: Self::default_connect_timeout(),
            operation_timeout_seconds: Self::default_operation_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub session_signing_secret: String,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    /// Sessions carry no expiry unless this is set.
    #[serde(default)]
    pub session_ttl_seconds: Option<u64>,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "carebridge".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_signing_secret: "change-me-in-production".to_string(),
            issuer: Self::default_issuer(),
            session_ttl_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    #[default]
    Log,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub provider: MailProvider,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "MailConfig::default_from")]
    pub from_address: String,
}

impl MailConfig {
    fn default_from() -> String {
        "no-reply@carebridge.local".to_string()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            endpoint: None,
            api_key: None,
            from_address: Self::default_from(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use carebridge_config::load;
///
/// std::env::remove_var("CAREBRIDGE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default(
            "tenancy.multi_tenant_enabled",
            defaults.tenancy.multi_tenant_enabled,
        )?
        .set_default("database.registry_url", defaults.database.registry_url.clone())?
        .set_default("database.default_url", defaults.database.default_url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default(
            "database.connect_timeout_seconds",
            i64::try_from(defaults.database.connect_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default(
            "database.operation_timeout_seconds",
            i64::try_from(defaults.database.operation_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default(
            "auth.session_signing_secret",
            defaults.auth.session_signing_secret.clone(),
        )?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?;

    let environment_overrides = config::Environment::with_prefix("CAREBRIDGE")
        .separator("__")
        .try_parsing(true);

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("CAREBRIDGE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via CAREBRIDGE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_signing_secret == defaults.auth.session_signing_secret {
        tracing::warn!("session signing secret is the built-in default; set auth.session_signing_secret");
    }

    debug!(
        multi_tenant = config.tenancy.multi_tenant_enabled,
        registry = %config.database.registry_url,
        default_store = %config.database.default_url,
        "loaded backend configuration"
    );
    Ok(config)
}
