//! Multi-region database connection management.
//!
//! Each region of the logging platform has its own independent Postgres
//! pool. The pool registry is an explicit object built at application
//! startup and passed by reference to callers; there is no global mutable
//! state, and no transaction ever spans regions.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Pool sizing and timeout settings shared by all regions.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// One region's connection target.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    pub name: String,
    pub url: String,
}

/// Requested region does not exist in the registry.
#[derive(Debug, Error)]
#[error("unknown region: {0}")]
pub struct UnknownRegion(pub String);

/// Explicit per-region pool registry with lifecycle tied to application
/// startup/shutdown.
#[derive(Clone)]
pub struct RegionPools {
    pools: HashMap<String, PgPool>,
    default_region: String,
}

impl RegionPools {
    /// Connects a pool per configured region. The caller guarantees that
    /// `default_region` names one of the configured regions.
    pub async fn connect(
        regions: &[RegionConfig],
        default_region: &str,
        settings: &PoolSettings,
    ) -> Result<Self, sqlx::Error> {
        let mut pools = HashMap::with_capacity(regions.len());
        for region in regions {
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
                .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
                .connect(&region.url)
                .await?;
            tracing::info!(region = %region.name, "connected database pool");
            pools.insert(region.name.clone(), pool);
        }
        Ok(Self {
            pools,
            default_region: default_region.to_string(),
        })
    }

    /// Resolves the pool for a region key, falling back to the default
    /// region when none is given.
    pub fn pool(&self, region: Option<&str>) -> Result<&PgPool, UnknownRegion> {
        let key = region.unwrap_or(&self.default_region);
        self.pools
            .get(key)
            .ok_or_else(|| UnknownRegion(key.to_string()))
    }

    /// Name of the default region.
    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    /// Iterates all regions and their pools.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PgPool)> {
        self.pools.iter().map(|(name, pool)| (name.as_str(), pool))
    }

    /// Closes every pool. Called on shutdown.
    pub async fn close(&self) {
        for (name, pool) in &self.pools {
            tracing::info!(region = %name, "closing database pool");
            pool.close().await;
        }
    }
}
