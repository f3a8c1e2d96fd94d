use crate::models::DownloadGrant;
use chrono::Utc;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use std::time::Duration;
use thiserror::Error;

/// How long spent or expired grants are remembered after their deadline, so
/// that replaying a verified callback cannot mint a fresh grant.
const GRANT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Grants held when no capacity is configured.
pub const DEFAULT_GRANT_CAPACITY: u64 = 100_000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantError {
    #[error("no grant for payment")]
    NotFound,

    #[error("grant expired")]
    Expired,

    #[error("download limit reached")]
    Exhausted,
}

/// In-memory Download Grants keyed by payment id.
///
/// The store is bounded by `capacity`. Past that bound the cache evicts, so
/// a paid grant may disappear before its deadline; size it above the number
/// of sales expected within one grant lifetime plus the retention window.
pub struct GrantStore {
    grants: Cache<String, DownloadGrant>,
    download_limit: u32,
    ttl: Duration,
    capacity: u64,
}

impl GrantStore {
    pub fn new(download_limit: u32, ttl: Duration) -> Self {
        Self::with_capacity(download_limit, ttl, DEFAULT_GRANT_CAPACITY)
    }

    pub fn with_capacity(download_limit: u32, ttl: Duration, capacity: u64) -> Self {
        let grants = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl.saturating_add(GRANT_RETENTION))
            .build();

        Self {
            grants,
            download_limit,
            ttl,
            capacity,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Records a grant for a verified payment. An existing grant for the
    /// same payment id is returned untouched.
    pub async fn issue(&self, payment_id: &str, order_id: &str) -> DownloadGrant {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let download_limit = self.download_limit;
        let order_id = order_id.to_string();

        let entry = self
            .grants
            .entry(payment_id.to_string())
            .or_insert_with(async move {
                let issued_at = Utc::now();
                DownloadGrant {
                    payment_id: payment_id.to_string(),
                    order_id,
                    issued_at,
                    expires_at: issued_at
                        .checked_add_signed(ttl)
                        .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC),
                    downloads_used: 0,
                    download_limit,
                }
            })
            .await;

        if entry.is_fresh() {
            tracing::info!(payment_id = %payment_id, "Download grant issued");
            if self.grants.entry_count() >= self.capacity {
                tracing::warn!(
                    capacity = self.capacity,
                    "Grant store is full, older grants may be evicted"
                );
            }
        } else {
            tracing::debug!(payment_id = %payment_id, "Download grant already issued");
        }

        entry.into_value()
    }

    /// Checks a grant is usable without spending a download.
    pub async fn authorize(&self, payment_id: &str) -> Result<DownloadGrant, GrantError> {
        let grant = self.grants.get(payment_id).await.ok_or(GrantError::NotFound)?;
        Self::check(&grant)?;
        Ok(grant)
    }

    /// Atomically spends one download.
    pub async fn redeem(&self, payment_id: &str) -> Result<DownloadGrant, GrantError> {
        let result = self
            .grants
            .entry(payment_id.to_string())
            .and_compute_with(|maybe_entry| {
                let op = match maybe_entry {
                    Some(entry) => {
                        let mut grant = entry.into_value();
                        if Self::check(&grant).is_ok() {
                            grant.downloads_used += 1;
                            Op::Put(grant)
                        } else {
                            Op::Nop
                        }
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::ReplacedWith(entry) | CompResult::Inserted(entry) => {
                let grant = entry.into_value();
                tracing::info!(
                    payment_id = %payment_id,
                    downloads_used = grant.downloads_used,
                    download_limit = grant.download_limit,
                    "Download grant redeemed"
                );
                Ok(grant)
            }
            CompResult::Unchanged(entry) => Err(Self::check(entry.value())
                .err()
                .unwrap_or(GrantError::Exhausted)),
            CompResult::StillNone(_) | CompResult::Removed(_) => Err(GrantError::NotFound),
        }
    }

    fn check(grant: &DownloadGrant) -> Result<(), GrantError> {
        if grant.is_expired(Utc::now()) {
            return Err(GrantError::Expired);
        }
        if grant.is_exhausted() {
            return Err(GrantError::Exhausted);
        }
        Ok(())
    }
}
