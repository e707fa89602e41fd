use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use carebridge_config::{AppConfig, MailProvider};
use carebridge_database::{NewTenant, TenantBranding};
use carebridge_identity::{LoginRequest, RegisterRequest};
use carebridge_runtime::{self, BackendServices};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.registry_url = sqlite_url(&dir.path().join("runtime/registry.db"));
    config.database.default_url = sqlite_url(&dir.path().join("runtime/default.db"));
    config.database.max_connections = 2;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_creates_registry_and_default_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);

    let services = initialise(&config).await?;
    assert!(temp_dir.path().join("runtime/registry.db").exists());
    assert!(services.pool.registry().list_all_tenants().await?.is_empty());

    services.pool.acquire(None).await?;
    assert!(temp_dir.path().join("runtime/default.db").exists());

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_wires_identity_service_to_the_pool() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);
    let services = initialise(&config).await?;

    services
        .pool
        .registry()
        .upsert_tenant(&NewTenant {
            id: "clinic1".to_string(),
            name: "Harbor Clinic".to_string(),
            backing_store_locator: sqlite_url(&temp_dir.path().join("runtime/clinic1.db")),
            active: true,
            branding: TenantBranding::default(),
        })
        .await?;

    services
        .identity
        .register(RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secur3Pass".to_string(),
            confirm_password: "Secur3Pass".to_string(),
            tenant_id: Some("clinic1".to_string()),
            ..RegisterRequest::default()
        })
        .await?;

    let grant = services
        .identity
        .login(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "Secur3Pass".to_string(),
            tenant_id: Some("clinic1".to_string()),
        })
        .await?;
    let claims = services.identity.authenticate(&grant.token)?;
    assert_eq!(claims.tenant_id.as_deref(), Some("clinic1"));
    assert!(claims.exp.is_none(), "sessions do not expire unless configured");

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_applies_configured_session_lifetime() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = build_config(&temp_dir);
    config.auth.session_ttl_seconds = Some(600);
    let services = initialise(&config).await?;

    services
        .identity
        .register(RegisterRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            password: "Secur3Pass".to_string(),
            confirm_password: "Secur3Pass".to_string(),
            ..RegisterRequest::default()
        })
        .await?;
    let grant = services
        .identity
        .login(LoginRequest {
            email: "grace@example.com".to_string(),
            password: "Secur3Pass".to_string(),
            tenant_id: None,
        })
        .await?;

    let claims = services.identity.authenticate(&grant.token)?;
    let exp = claims.exp.context("session should carry an expiry")?;
    assert!(exp > claims.iat && exp <= claims.iat + 600);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_rejects_http_mail_without_endpoint() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = build_config(&temp_dir);
    config.mail.provider = MailProvider::Http;
    config.mail.endpoint = None;

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("expected mail configuration to fail without an endpoint"),
        Err(error) => error,
    };
    let message = format!("{error:?}");
    assert!(
        message.contains("failed to configure mail delivery"),
        "expected mail configuration context, got {message}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_reports_unusable_registry_location() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = build_config(&temp_dir);
    config.database.registry_url = sqlite_url(temp_dir.path());

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("expected registry initialisation to fail for a directory"),
        Err(error) => error,
    };
    assert!(
        error.to_string().contains("failed to open tenant registry"),
        "registry errors should propagate with context"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_releases_cached_store_connections() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);
    let services = initialise(&config).await?;

    let handle = services.pool.acquire(None).await?;
    assert_eq!(services.pool.cached_keys().await, vec![None]);

    services.shutdown().await;
    assert!(services.pool.cached_keys().await.is_empty());
    assert!(!handle.is_healthy());
    Ok(())
}

#[test]
fn telemetry_init_tracing_sets_global_subscriber() {
    carebridge_runtime::telemetry::init_tracing().expect("first initialisation should succeed");

    let second = carebridge_runtime::telemetry::init_tracing();
    assert!(
        second.is_err(),
        "initialising telemetry twice should fail with global subscriber already set"
    );
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(unix), ignore = "requires Unix signal handling")]
async fn shutdown_signal_completes_on_ctrl_c_notification() -> Result<()> {
    let shutdown_task = tokio::spawn(async { carebridge_runtime::shutdown_signal().await });

    sleep(Duration::from_millis(50)).await;
    #[cfg(unix)]
    unsafe {
        libc::raise(libc::SIGINT);
    }

    timeout(Duration::from_secs(2), shutdown_task).await??;
    Ok(())
}
