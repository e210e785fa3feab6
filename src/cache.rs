//! In-memory caching using moka
//!
//! Only tenant settings are cached. Reservations and availability always
//! go to the store.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::booking::models::Settings;

/// Application cache holding per-organization settings
#[derive(Clone)]
pub struct AppCache {
    /// Settings (organization_id -> Settings)
    pub settings: Cache<Uuid, Arc<Settings>>,
}

impl AppCache {
    /// Create a new cache instance with the given settings TTL
    pub fn new(settings_ttl: Duration) -> Self {
        Self {
            // One entry per active organization
            settings: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(settings_ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            settings_size: self.settings.entry_count(),
        }
    }

    /// Drop the cached settings of one organization
    pub async fn invalidate_settings(&self, organization_id: Uuid) {
        self.settings.invalidate(&organization_id).await;
        info!("Settings cache invalidated for organization {}", organization_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub settings_size: u64,
}
