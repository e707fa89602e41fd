//! Test plan for the `carebridge-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use carebridge_config::{load, AppConfig, AuthConfig, DatabaseConfig, HttpConfig, MailProvider};

const ENV_VARS_TO_RESET: &[&str] = &[
    "CAREBRIDGE_CONFIG",
    "CAREBRIDGE__AUTH__ISSUER",
    "CAREBRIDGE__AUTH__SESSION_SIGNING_SECRET",
    "CAREBRIDGE__AUTH__SESSION_TTL_SECONDS",
    "CAREBRIDGE__DATABASE__CONNECT_TIMEOUT_SECONDS",
    "CAREBRIDGE__DATABASE__DEFAULT_URL",
    "CAREBRIDGE__DATABASE__MAX_CONNECTIONS",
    "CAREBRIDGE__DATABASE__OPERATION_TIMEOUT_SECONDS",
    "CAREBRIDGE__DATABASE__REGISTRY_URL",
    "CAREBRIDGE__HTTP__ADDRESS",
    "CAREBRIDGE__HTTP__PORT",
    "CAREBRIDGE__MAIL__PROVIDER",
    "CAREBRIDGE__TENANCY__MULTI_TENANT_ENABLED",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated_context() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated_context();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.registry_url, defaults.database.registry_url);
    assert_eq!(config.database.default_url, defaults.database.default_url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert!(config.tenancy.multi_tenant_enabled);
    assert_eq!(config.auth.issuer, "carebridge");
    assert_eq!(config.mail.provider, MailProvider::Log);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "carebridge.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/carebridge.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "carebridge.toml",
        r#"
        [tenancy]
        multi_tenant_enabled = false

        [database]
        max_connections = 50
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert!(!config.tenancy.multi_tenant_enabled);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.default_url, defaults.database.default_url);
    assert_eq!(
        config.database.operation_timeout_seconds,
        defaults.database.operation_timeout_seconds
    );
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "carebridge.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("CAREBRIDGE__HTTP__PORT", "8080");
    ctx.set_var("CAREBRIDGE__DATABASE__DEFAULT_URL", "sqlite://shared.db");
    ctx.set_var("CAREBRIDGE__TENANCY__MULTI_TENANT_ENABLED", "false");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.database.default_url, "sqlite://shared.db");
    assert!(!config.tenancy.multi_tenant_enabled);
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [auth]
        session_signing_secret = "from-explicit-file"
        "#,
    );
    let explicit = temp_dir.path().join("elsewhere/custom.toml");
    ctx.set_var("CAREBRIDGE_CONFIG", explicit.to_string_lossy());

    let config = load().expect("explicit configuration path should load");
    assert_eq!(config.auth.session_signing_secret, "from-explicit-file");
}

#[test]
#[serial]
fn session_ttl_is_absent_unless_configured() {
    let (_temp_dir, mut ctx) = isolated_context();

    let config = load().expect("configuration load should succeed");
    assert!(config.auth.session_ttl_seconds.is_none());

    ctx.set_var("CAREBRIDGE__AUTH__SESSION_TTL_SECONDS", "3600");
    let config = load().expect("configuration load should read session ttl");
    assert_eq!(config.auth.session_ttl_seconds, Some(3600));
}

#[test]
#[serial]
fn load_reads_http_mail_provider() {
    let (temp_dir, _ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "carebridge.toml",
        r#"
        [mail]
        provider = "http"
        endpoint = "https://mail.example.com/send"
        api_key = "relay-key"
        "#,
    );

    let config = load().expect("configuration load should parse mail section");
    assert_eq!(config.mail.provider, MailProvider::Http);
    assert_eq!(
        config.mail.endpoint.as_deref(),
        Some("https://mail.example.com/send")
    );
    assert_eq!(config.mail.from_address, "no-reply@carebridge.local");
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated_context();

    write_config_file(
        temp_dir.path(),
        "carebridge.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn auth_config_defaults_have_no_session_expiry() {
    let defaults = AuthConfig::default();
    assert!(defaults.session_ttl_seconds.is_none());
    assert!(!defaults.session_signing_secret.is_empty());
}

#[test]
fn database_config_timeouts_never_drop_to_zero() {
    let config = DatabaseConfig {
        connect_timeout_seconds: 0,
        operation_timeout_seconds: 0,
        ..DatabaseConfig::default()
    };
    assert_eq!(config.connect_timeout().as_secs(), 1);
    assert_eq!(config.operation_timeout().as_secs(), 1);
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 7070);
}
