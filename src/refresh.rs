//! Refresh policy
//!
//! Decides when the local cache is stale and runs fetch → parse → replace.
//! A failed fetch never touches the cache: with existing data the caller
//! keeps serving it, without data the failure is returned.

use crate::fetch::Fetcher;
use crate::parser;
use crate::storage::SqliteStore;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};

/// Default staleness threshold, in days
pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;

/// True when the cache was never populated or is older than `max_age`.
pub fn should_refresh(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>, max_age: Duration) -> bool {
    match last_updated {
        None => true,
        Some(ts) => now - ts > max_age,
    }
}

/// Summary of one successful ingestion
#[derive(Debug, Clone, serde::Serialize)]
pub struct RefreshReport {
    pub source: String,
    pub vendors: usize,
    pub devices: usize,
    pub warnings: usize,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vendors, {} devices from {} ({} lines skipped)",
            self.vendors, self.devices, self.source, self.warnings
        )
    }
}

/// What `refresh_if_stale` ended up doing
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Cache is within `max_age`
    UpToDate { last_updated: DateTime<Utc> },
    /// Cache was replaced
    Refreshed(RefreshReport),
    /// Refresh failed; existing cache is still served
    Degraded { last_updated: DateTime<Utc>, error: Error },
}

/// Runs the refresh pipeline against one store
pub struct Refresher<'a, F: Fetcher> {
    store: &'a mut SqliteStore,
    fetcher: &'a F,
    max_age: Duration,
}

impl<'a, F: Fetcher> Refresher<'a, F> {
    pub fn new(store: &'a mut SqliteStore, fetcher: &'a F, max_age: Duration) -> Self {
        Self { store, fetcher, max_age }
    }

    /// Refresh only if the cache is stale.
    ///
    /// Network failures (and documents without any vendor) degrade to the
    /// cached data when there is some. Storage failures are always returned.
    pub fn refresh_if_stale(&mut self, now: DateTime<Utc>) -> Result<RefreshOutcome> {
        let last_updated = self.store.last_updated()?;
        if !should_refresh(last_updated, now, self.max_age) {
            if let Some(last_updated) = last_updated {
                tracing::debug!("Cache is fresh (last updated {})", last_updated);
                return Ok(RefreshOutcome::UpToDate { last_updated });
            }
        }

        match (self.force_refresh(now), last_updated) {
            (Ok(report), _) => Ok(RefreshOutcome::Refreshed(report)),
            (Err(error), Some(last_updated)) if error.is_network() => {
                tracing::warn!("Refresh failed, using cached data from {}: {}", last_updated, error);
                Ok(RefreshOutcome::Degraded { last_updated, error })
            }
            (Err(error), _) => Err(error),
        }
    }

    /// Fetch, parse and replace unconditionally.
    pub fn force_refresh(&mut self, now: DateTime<Utc>) -> Result<RefreshReport> {
        tracing::info!("Refreshing registry from {}", self.fetcher.source());
        let raw = self.fetcher.fetch()?;
        let parsed = parser::parse(&raw);
        if parsed.registry.is_empty() {
            return Err(Error::EmptyRegistry);
        }

        self.store.replace_all(&parsed.registry, self.fetcher.source(), now)?;

        let report = RefreshReport {
            source: self.fetcher.source().to_string(),
            vendors: parsed.registry.vendors.len(),
            devices: parsed.registry.devices.len(),
            warnings: parsed.warning_count(),
            updated_at: now,
        };
        tracing::info!("Registry refreshed: {}", report);
        Ok(report)
    }
}
