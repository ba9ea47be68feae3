//! # Shop Settings Repository
//!
//! The singleton settings row with a process-local read-through cache.
//!
//! ## Caching Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_or_create()                                                        │
//! │     │                                                                   │
//! │     ├── cache hit ──────────────► cached ShopSettings (no DB trip)     │
//! │     │                                                                   │
//! │     └── cache miss ─► INSERT OR IGNORE singleton ─► SELECT ─► cache    │
//! │                                                                         │
//! │  update(patch) ─► UPDATE row ─► invalidate cache                       │
//! │                   (next reader refetches fresh values)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cache is process-local and best-effort, not a distributed cache: in
//! a multi-process deployment each process holds its own copy and an update
//! only invalidates the local one. That staleness window is accepted; this
//! row changes a few times a year. A reader racing an invalidator can get
//! one stale read, also accepted.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DbResult;
use market_core::ShopSettings;

const SETTINGS_COLUMNS: &str = "line_oa_id, bank_name_code, bank_account, updated_at";

/// Process-local cache of the settings row.
///
/// Injectable and shared: every repository built from the same `Database`
/// clones the same handle, so an admin update invalidates what the next
/// public request reads.
#[derive(Debug, Clone, Default)]
pub struct SettingsCache {
    inner: Arc<RwLock<Option<ShopSettings>>>,
}

impl SettingsCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        SettingsCache::default()
    }

    async fn get(&self) -> Option<ShopSettings> {
        self.inner.read().await.clone()
    }

    async fn put(&self, settings: ShopSettings) {
        *self.inner.write().await = Some(settings);
    }

    /// Clears the cached row; the next read goes to the database.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

/// Partial update of the settings row; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub line_oa_id: Option<String>,
    pub bank_name_code: Option<String>,
    pub bank_account: Option<String>,
}

/// Repository for the shop-settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    cache: SettingsCache,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository sharing the given cache.
    pub fn new(pool: SqlitePool, cache: SettingsCache) -> Self {
        SettingsRepository { pool, cache }
    }

    /// Returns the settings row, creating it with schema defaults on first
    /// read; cached until the next [`SettingsCache::invalidate`].
    pub async fn get_or_create(&self) -> DbResult<ShopSettings> {
        if let Some(settings) = self.cache.get().await {
            return Ok(settings);
        }

        debug!("Settings cache miss, loading from database");

        // Lazy singleton creation; the column defaults fill the values.
        sqlx::query(
            "INSERT OR IGNORE INTO shop_settings (singleton_key, updated_at) \
             VALUES ('default', ?)",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let sql =
            format!("SELECT {SETTINGS_COLUMNS} FROM shop_settings WHERE singleton_key = 'default'");
        let settings = sqlx::query_as::<_, ShopSettings>(&sql)
            .fetch_one(&self.pool)
            .await?;

        self.cache.put(settings.clone()).await;
        Ok(settings)
    }

    /// Applies a partial update and invalidates the cache, so the next read
    /// (including the one returning from here) reflects the new values.
    pub async fn update(&self, patch: SettingsPatch) -> DbResult<ShopSettings> {
        // Make sure the row exists before patching it.
        self.get_or_create().await?;

        sqlx::query(
            "UPDATE shop_settings SET \
                line_oa_id = COALESCE(?, line_oa_id), \
                bank_name_code = COALESCE(?, bank_name_code), \
                bank_account = COALESCE(?, bank_account), \
                updated_at = ? \
             WHERE singleton_key = 'default'",
        )
        .bind(&patch.line_oa_id)
        .bind(&patch.bank_name_code)
        .bind(&patch.bank_account)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.cache.invalidate().await;

        self.get_or_create().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
