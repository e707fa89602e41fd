//! Tenant registry: the authoritative list of clinics and where their data lives.

use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use carebridge_config::DatabaseConfig;

use crate::connection::{bounded, prepare_database};
use crate::entities::{NewTenant, Tenant, TenantBranding};
use crate::migrations::run_registry_migrations;
use crate::repos::{format_timestamp, parse_timestamp};
use crate::types::{DatabaseError, RegistryError, RegistryResult};

static TENANT_ID_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$"));

const TENANT_COLUMNS: &str =
    "id, name, backing_store_locator, active, branding, created_at, updated_at";

/// Reject tenant ids that are not lowercase slugs before they reach any store.
pub fn validate_tenant_id(tenant_id: &str) -> RegistryResult<()> {
    let pattern = TENANT_ID_PATTERN
        .as_ref()
        .map_err(|e| DatabaseError::QueryError(format!("Invalid tenant id regex: {e}")))?;
    if pattern.is_match(tenant_id) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTenantId(tenant_id.to_string()))
    }
}

#[derive(Clone)]
pub struct RegistryStore {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl RegistryStore {
    /// Open the registry database and bring its schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> RegistryResult<Self> {
        let pool = prepare_database(&config.registry_url, config.max_connections)
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;
        run_registry_migrations(&pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

        info!(url = %config.registry_url, "tenant registry ready");
        Ok(Self::from_pool(pool, config.operation_timeout()))
    }

    pub fn from_pool(pool: SqlitePool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    /// Look up an active tenant.
    ///
    /// Unknown and inactive tenants are both reported as
    /// [`RegistryError::TenantUnavailable`].
    pub async fn get_tenant(&self, tenant_id: &str) -> RegistryResult<Tenant> {
        validate_tenant_id(tenant_id)?;

        match self.find_tenant(tenant_id).await? {
            Some(tenant) if tenant.active => Ok(tenant),
            _ => Err(RegistryError::TenantUnavailable(tenant_id.to_string())),
        }
    }

    /// Look up a tenant regardless of its active flag.
    pub async fn find_tenant(&self, tenant_id: &str) -> RegistryResult<Option<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?");
        let row = bounded::<_, RegistryError, _>(
            self.operation_timeout,
            "tenants.find",
            sqlx::query(&sql).bind(tenant_id).fetch_optional(&self.pool),
        )
        .await?;

        row.map(|row| tenant_from_row(&row)).transpose()
    }

    pub async fn list_active_tenants(&self) -> RegistryResult<Vec<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE active = true ORDER BY name, id");
        let rows = bounded::<_, RegistryError, _>(
            self.operation_timeout,
            "tenants.list_active",
            sqlx::query(&sql).fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(tenant_from_row).collect()
    }

    /// Every tenant, active or not. Used by operator tooling.
    pub async fn list_all_tenants(&self) -> RegistryResult<Vec<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants ORDER BY name, id");
        let rows = bounded::<_, RegistryError, _>(
            self.operation_timeout,
            "tenants.list_all",
            sqlx::query(&sql).fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(tenant_from_row).collect()
    }

    /// Insert a tenant or replace the existing entry with the same id.
    pub async fn upsert_tenant(&self, tenant: &NewTenant) -> RegistryResult<Tenant> {
        validate_tenant_id(&tenant.id)?;

        let now = format_timestamp(Utc::now());
        let branding = serde_json::to_string(&tenant.branding)
            .map_err(|e| DatabaseError::QueryError(format!("unable to encode branding: {e}")))?;

        bounded::<_, RegistryError, _>(
            self.operation_timeout,
            "tenants.upsert",
            sqlx::query(
                r#"
                INSERT INTO tenants (id, name, backing_store_locator, active, branding, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    backing_store_locator = excluded.backing_store_locator,
                    active = excluded.active,
                    branding = excluded.branding,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&tenant.id)
            .bind(&tenant.name)
            .bind(&tenant.backing_store_locator)
            .bind(tenant.active)
            .bind(&branding)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool),
        )
        .await?;

        info!(tenant_id = %tenant.id, active = tenant.active, "tenant registered");
        self.find_tenant(&tenant.id)
            .await?
            .ok_or_else(|| RegistryError::TenantUnavailable(tenant.id.clone()))
    }

    /// Flip a tenant's active flag. Returns `false` when the tenant is unknown.
    pub async fn set_active(&self, tenant_id: &str, active: bool) -> RegistryResult<bool> {
        validate_tenant_id(tenant_id)?;

        let result = bounded::<_, RegistryError, _>(
            self.operation_timeout,
            "tenants.set_active",
            sqlx::query("UPDATE tenants SET active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(format_timestamp(Utc::now()))
                .bind(tenant_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn tenant_from_row(row: &SqliteRow) -> RegistryResult<Tenant> {
    let id: String = row.try_get("id")?;
    let raw_branding: Option<String> = row.try_get("branding").unwrap_or(None);
    let branding = match raw_branding.as_deref() {
        None | Some("") => TenantBranding::default(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(tenant_id = %id, error = %err, "ignoring malformed tenant branding");
            TenantBranding::default()
        }),
    };

    Ok(Tenant {
        name: row.try_get("name")?,
        backing_store_locator: row.try_get("backing_store_locator")?,
        active: row.try_get("active")?,
        branding,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?),
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?),
        id,
    })
}
