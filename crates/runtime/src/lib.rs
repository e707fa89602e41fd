use std::sync::Arc;

use anyhow::{Context, Result};
use carebridge_config::AppConfig;
use carebridge_database::{initialize_pool, ConnectionPool};
use carebridge_gateway::GatewayState;
use carebridge_identity::{mailer_from_config, IdentityResolver, IdentityService, SessionIssuer};
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the server needs, built once from configuration.
#[derive(Clone)]
pub struct BackendServices {
    pub pool: Arc<ConnectionPool>,
    pub identity: Arc<IdentityService>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let pool = Arc::new(
            initialize_pool(&config.database)
                .await
                .context("failed to open tenant registry")?,
        );

        let mailer = mailer_from_config(&config.mail).context("failed to configure mail delivery")?;
        let resolver = IdentityResolver::new(pool.clone(), config.tenancy.multi_tenant_enabled);
        let sessions = SessionIssuer::from_config(&config.auth);
        let identity = Arc::new(IdentityService::new(resolver, sessions, mailer));

        info!(
            multi_tenant = config.tenancy.multi_tenant_enabled,
            mail_provider = ?config.mail.provider,
            session_ttl_seconds = ?config.auth.session_ttl_seconds,
            "identity services ready"
        );

        Ok(Self { pool, identity })
    }

    pub fn gateway_state(&self) -> GatewayState {
        GatewayState::new(self.identity.clone())
    }

    /// Close every cached store connection, then the registry.
    pub async fn shutdown(&self) {
        self.pool.release_all().await;
        self.pool.registry().close().await;
        info!("store connections closed");
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
