use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission to fetch the e-book, minted by a successful signature check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadGrant {
    pub payment_id: String,
    pub order_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub downloads_used: u32,
    pub download_limit: u32,
}

impl DownloadGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.downloads_used >= self.download_limit
    }

    pub fn downloads_remaining(&self) -> u32 {
        self.download_limit.saturating_sub(self.downloads_used)
    }
}
