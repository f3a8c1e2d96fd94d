use crate::models::Stats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-local sales counters. Reset on restart.
pub struct SalesLedger {
    orders_created: AtomicU64,
    payments_verified: AtomicU64,
    verification_failures: AtomicU64,
    downloads_served: AtomicU64,
    start_time: Instant,
}

impl SalesLedger {
    pub fn new() -> Self {
        Self {
            orders_created: AtomicU64::new(0),
            payments_verified: AtomicU64::new(0),
            verification_failures: AtomicU64::new(0),
            downloads_served: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_order(&self) {
        self.orders_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verification(&self, valid: bool) {
        if valid {
            self.payments_verified.fetch_add(1, Ordering::Relaxed);
        } else {
            self.verification_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_download(&self) {
        self.downloads_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            orders_created: self.orders_created.load(Ordering::Relaxed),
            payments_verified: self.payments_verified.load(Ordering::Relaxed),
            verification_failures: self.verification_failures.load(Ordering::Relaxed),
            downloads_served: self.downloads_served.load(Ordering::Relaxed),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for SalesLedger {
    fn default() -> Self {
        Self::new()
    }
}
