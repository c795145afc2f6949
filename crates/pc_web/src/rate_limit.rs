use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Entries kept before stale windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Window index in the high half, request count in the low half.
fn pack(window: u64, count: u64) -> u64 {
    (window << 32) | (count & 0xFFFF_FFFF)
}

fn unpack(word: u64) -> (u64, u64) {
    (word >> 32, word & 0xFFFF_FFFF)
}

/// Fixed-window request limiter, one counter per client key.
///
/// Each client's state is a single `AtomicU64`, so admitting a request is a
/// compare-and-swap on that word. The map itself is only locked to insert
/// new clients or sweep old ones.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    epoch: Instant,
    clients: DashMap<String, AtomicU64>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window: window.max(Duration::from_millis(1)),
            epoch: Instant::now(),
            clients: DashMap::new(),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn current_window(&self) -> u64 {
        let elapsed = self.epoch.elapsed().as_millis() / self.window.as_millis();
        (elapsed as u64) & 0xFFFF_FFFF
    }

    fn admit(&self, slot: &AtomicU64, window: u64) -> bool {
        let limit = u64::from(self.limit);
        let mut current = slot.load(Ordering::Acquire);
        loop {
            let (seen_window, count) = unpack(current);
            let next = if seen_window != window {
                pack(window, 1)
            } else if count >= limit {
                return false;
            } else {
                pack(window, count + 1)
            };
            match slot.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Counts a request for `client` and reports whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        if self.limit == 0 {
            return false;
        }
        let window = self.current_window();
        if let Some(slot) = self.clients.get(client) {
            return self.admit(slot.value(), window);
        }

        if self.clients.len() >= SWEEP_THRESHOLD {
            self.sweep(window);
        }
        let slot = self
            .clients
            .entry(client.to_string())
            .or_insert_with(|| AtomicU64::new(pack(window, 0)))
            .downgrade();
        self.admit(slot.value(), window)
    }

    fn sweep(&self, window: u64) {
        let before = self.clients.len();
        self.clients
            .retain(|_, slot| unpack(slot.load(Ordering::Acquire)).0 == window);
        tracing::debug!(
            "Rate limiter swept {} stale clients",
            before.saturating_sub(self.clients.len())
        );
    }
}
