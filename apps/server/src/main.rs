use anyhow::Context;
use clap::{Parser, Subcommand};
use carebridge_config::load as load_config;
use carebridge_database::{validate_tenant_id, NewTenant, RegistryStore, TenantBranding};
use carebridge_gateway::create_router;
use carebridge_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "carebridge")]
#[command(about = "Carebridge multi-tenant identity backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// List active tenants from the registry
    Tenants,
    /// Register a tenant, or replace an existing entry with the same id
    SeedTenant {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Store locator, e.g. sqlite://data/clinic1.db
        #[arg(long)]
        locator: String,
        /// Register the tenant as inactive
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        primary_color: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Tenants => list_tenants().await,
        Commands::SeedTenant {
            id,
            name,
            locator,
            inactive,
            display_name,
            primary_color,
        } => {
            let tenant = NewTenant {
                id,
                name,
                backing_store_locator: locator,
                active: !inactive,
                branding: TenantBranding {
                    display_name,
                    primary_color,
                    ..TenantBranding::default()
                },
            };
            seed_tenant(tenant).await
        }
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Carebridge backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;
    let app = create_router(services.gateway_state());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.shutdown().await;
    info!("backend shut down");
    Ok(())
}

async fn open_registry() -> anyhow::Result<RegistryStore> {
    let config = load_config().context("failed to load configuration")?;
    RegistryStore::connect(&config.database)
        .await
        .context("failed to open tenant registry")
}

async fn list_tenants() -> anyhow::Result<()> {
    let registry = open_registry().await?;
    let tenants = registry
        .list_active_tenants()
        .await
        .context("failed to list tenants")?;

    if tenants.is_empty() {
        println!("No active tenants registered");
    } else {
        println!("{:<24} {:<32} {:<25}", "ID", "Name", "Updated At");
        println!("{}", "-".repeat(81));
        for tenant in &tenants {
            println!(
                "{:<24} {:<32} {:<25}",
                tenant.id,
                tenant.name,
                tenant.updated_at.to_rfc3339()
            );
        }
    }

    registry.close().await;
    Ok(())
}

async fn seed_tenant(tenant: NewTenant) -> anyhow::Result<()> {
    validate_tenant_id(&tenant.id).context("invalid tenant id")?;

    let registry = open_registry().await?;
    let stored = registry
        .upsert_tenant(&tenant)
        .await
        .with_context(|| format!("failed to register tenant {}", tenant.id))?;

    info!(tenant_id = %stored.id, active = stored.active, "tenant registered");
    println!(
        "Registered tenant {} ({}){}",
        stored.id,
        stored.name,
        if stored.active { "" } else { " [inactive]" }
    );

    registry.close().await;
    Ok(())
}
