//! Per-tenant connection cache.
//!
//! The pool owns one live [`ConnectionHandle`] per store: one per active
//! tenant plus the default store. Creation is single-flight per key through a
//! `tokio::sync::OnceCell` slot, so concurrent callers for the same tenant
//! share one connection attempt while unrelated tenants connect in parallel.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use carebridge_config::DatabaseConfig;

use crate::binder::ModelBinder;
use crate::connection::prepare_database;
use crate::migrations::run_store_migrations;
use crate::registry::RegistryStore;
use crate::types::{PoolError, PoolResult};

/// Cache key: a tenant id, or `None` for the default store.
pub type PoolKey = Option<String>;

/// Failed connection attempts are retried this many times in total before
/// the error is surfaced.
const CONNECT_ATTEMPTS: u32 = 2;

type Slot = Arc<OnceCell<ConnectionHandle>>;

/// A cheap, clonable reference to a live store connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    tenant_id: PoolKey,
    pool: SqlitePool,
    opened_at: DateTime<Utc>,
    last_used_ms: AtomicI64,
}

impl ConnectionHandle {
    fn new(tenant_id: PoolKey, pool: SqlitePool) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(HandleInner {
                tenant_id,
                pool,
                opened_at: now,
                last_used_ms: AtomicI64::new(now.timestamp_millis()),
            }),
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.inner.tenant_id.as_deref()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.inner.opened_at
    }

    pub fn last_used_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.inner.last_used_ms.load(Ordering::Relaxed))
            .unwrap_or(self.inner.opened_at)
    }

    pub fn is_healthy(&self) -> bool {
        !self.inner.pool.is_closed()
    }

    /// True when both handles point at the same underlying connection.
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn touch(&self) {
        self.inner
            .last_used_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("tenant_id", &self.inner.tenant_id)
            .field("opened_at", &self.inner.opened_at)
            .field("healthy", &self.is_healthy())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct StoreSettings {
    default_url: String,
    max_connections: u32,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

pub struct ConnectionPool {
    registry: RegistryStore,
    settings: StoreSettings,
    slots: RwLock<HashMap<PoolKey, Slot>>,
    created: AtomicU64,
}

impl ConnectionPool {
    pub fn new(registry: RegistryStore, config: &DatabaseConfig) -> Self {
        Self {
            registry,
            settings: StoreSettings {
                default_url: config.default_url.clone(),
                max_connections: config.max_connections,
                connect_timeout: config.connect_timeout(),
                operation_timeout: config.operation_timeout(),
            },
            slots: RwLock::new(HashMap::new()),
            created: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }

    /// Binder whose repositories inherit this pool's operation timeout.
    pub fn binder(&self) -> ModelBinder {
        ModelBinder::new(self.settings.operation_timeout)
    }

    /// Return the cached connection for `tenant_id`, creating it on first use.
    ///
    /// A tenant id is checked against the registry on every call, so a tenant
    /// deactivated after its connection was cached no longer yields a handle.
    pub async fn acquire(&self, tenant_id: Option<&str>) -> PoolResult<ConnectionHandle> {
        let (key, locator) = match tenant_id {
            Some(id) => {
                let tenant = self.registry.get_tenant(id).await?;
                (Some(tenant.id), tenant.backing_store_locator)
            }
            None => (None, self.settings.default_url.clone()),
        };

        let slot = self.slot(&key).await;
        let handle = self.initialise(&slot, &key, &locator).await?;
        if handle.is_healthy() {
            handle.touch();
            return Ok(handle);
        }

        warn!(store = %store_label(&key), "cached store connection was closed, reconnecting");
        self.evict(&key, &slot).await;

        let slot = self.slot(&key).await;
        let handle = self.initialise(&slot, &key, &locator).await?;
        handle.touch();
        Ok(handle)
    }

    /// Drop the cached connection for one store. Returns whether a live
    /// connection was closed.
    pub async fn release(&self, tenant_id: Option<&str>) -> bool {
        let key: PoolKey = tenant_id.map(str::to_owned);
        let removed = self.slots.write().await.remove(&key);

        match removed.as_deref().and_then(|slot| slot.get()) {
            Some(handle) => {
                handle.pool().close().await;
                info!(store = %store_label(&key), "store connection released");
                true
            }
            None => false,
        }
    }

    /// Close every cached connection. Used on shutdown.
    pub async fn release_all(&self) {
        let drained: Vec<(PoolKey, Slot)> = self.slots.write().await.drain().collect();
        for (key, slot) in drained {
            if let Some(handle) = slot.get() {
                handle.pool().close().await;
                debug!(store = %store_label(&key), "store connection closed");
            }
        }
        info!("all store connections released");
    }

    /// Keys with an established connection, default store first.
    pub async fn cached_keys(&self) -> Vec<PoolKey> {
        let mut keys: Vec<PoolKey> = self
            .slots
            .read()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of connections this pool has established since it was built.
    pub fn connections_created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    async fn slot(&self, key: &PoolKey) -> Slot {
        if let Some(slot) = self.slots.read().await.get(key) {
            return slot.clone();
        }

        self.slots
            .write()
            .await
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    async fn initialise(&self, slot: &Slot, key: &PoolKey, locator: &str) -> PoolResult<ConnectionHandle> {
        slot.get_or_try_init(|| self.establish(key, locator))
            .await
            .cloned()
    }

    /// Remove `slot` from the cache if it is still the registered one.
    async fn evict(&self, key: &PoolKey, slot: &Slot) {
        let mut slots = self.slots.write().await;
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
    }

    async fn establish(&self, key: &PoolKey, locator: &str) -> PoolResult<ConnectionHandle> {
        let mut failure = PoolError::ConnectionFailed {
            tenant_id: key.clone(),
            cause: "no connection attempt was made".to_string(),
        };

        for attempt in 1..=CONNECT_ATTEMPTS {
            let opened = tokio::time::timeout(
                self.settings.connect_timeout,
                open_store(locator, self.settings.max_connections),
            )
            .await;

            match opened {
                Ok(Ok(pool)) => {
                    let created = self.created.fetch_add(1, Ordering::SeqCst) + 1;
                    info!(store = %store_label(key), attempt, created, "store connection established");
                    return Ok(ConnectionHandle::new(key.clone(), pool));
                }
                Ok(Err(err)) => {
                    let cause = format!("{err:#}");
                    warn!(store = %store_label(key), attempt, error = %cause, "store connection attempt failed");
                    failure = PoolError::ConnectionFailed {
                        tenant_id: key.clone(),
                        cause,
                    };
                }
                Err(_) => {
                    warn!(store = %store_label(key), attempt, "store connection attempt timed out");
                    failure = PoolError::Timeout {
                        tenant_id: key.clone(),
                    };
                }
            }
        }

        Err(failure)
    }
}

async fn open_store(locator: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = prepare_database(locator, max_connections).await?;
    run_store_migrations(&pool).await?;
    Ok(pool)
}

fn store_label(key: &PoolKey) -> &str {
    key.as_deref().unwrap_or("default")
}
