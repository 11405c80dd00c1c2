//! Blacklist and bad-request stores consulted by the filters.
//!
//! # Responsibilities
//! - Look up blocked client identities and IP addresses
//! - Record requests that ended in a 404 for the temporary blacklist
//! - Count recent bad requests for a client + IP pair
//!
//! # Design Decisions
//! - Traits at the seam so a database-backed store can replace the
//!   in-memory one without touching the filters
//! - In-memory stores use `DashMap` and are safe to share across workers
//! - Old bad-request records are pruned on insert, and the whole log is
//!   swept periodically so idle client + IP pairs do not accumulate

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::{DashMap, DashSet};

/// A set of blocked values (user agents or IP addresses).
pub trait BlacklistStore: Send + Sync {
    fn is_blacklisted(&self, value: &str) -> bool;
}

/// Log of requests that ended in "not found".
pub trait BadRequestLog: Send + Sync {
    /// Record one bad request.
    fn record(&self, request: BadRequest);

    /// Number of bad requests from `client` at `ip` seen at or after `since`.
    fn count_since(&self, client: &str, ip: &str, since: SystemTime) -> usize;
}

/// One request that was answered with a 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadRequest {
    pub client: String,
    pub ip: String,
    pub uri: String,
    pub at: SystemTime,
}

impl BadRequest {
    pub fn new(client: impl Into<String>, ip: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ip: ip.into(),
            uri: uri.into(),
            at: SystemTime::now(),
        }
    }
}

/// In-memory blacklist.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlacklist {
    entries: Arc<DashSet<String>>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, value: impl Into<String>) {
        self.entries.insert(value.into());
    }

    pub fn remove(&self, value: &str) -> bool {
        self.entries.remove(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryBlacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let list = Self::new();
        for value in iter {
            list.add(value);
        }
        list
    }
}

impl BlacklistStore for MemoryBlacklist {
    fn is_blacklisted(&self, value: &str) -> bool {
        self.entries.contains(value)
    }
}

/// Records between full sweeps of the bad-request log.
const SWEEP_EVERY: usize = 256;

/// In-memory bad-request log keyed by client + IP.
#[derive(Debug, Clone)]
pub struct MemoryBadRequestLog {
    entries: Arc<DashMap<(String, String), Vec<BadRequest>>>,
    retention: Duration,
    recorded: Arc<AtomicUsize>,
}

impl MemoryBadRequestLog {
    /// Records older than `retention` are dropped. Every `SWEEP_EVERY`
    /// inserts the whole log is swept, so pairs that went quiet are evicted.
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            retention,
            recorded: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Drop expired records and every client + IP pair left empty.
    pub fn prune(&self) {
        let Some(cutoff) = self.cutoff() else {
            return;
        };
        let before = self.entries.len();
        self.entries.retain(|_, records| {
            records.retain(|r| r.at >= cutoff);
            !records.is_empty()
        });
        tracing::debug!(
            evicted = before.saturating_sub(self.entries.len()),
            pairs = self.entries.len(),
            "Bad-request log swept"
        );
    }

    /// Total records currently held.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct client + IP pairs currently held.
    pub fn pairs(&self) -> usize {
        self.entries.len()
    }

    fn cutoff(&self) -> Option<SystemTime> {
        SystemTime::now().checked_sub(self.retention)
    }
}

impl BadRequestLog for MemoryBadRequestLog {
    fn record(&self, request: BadRequest) {
        let cutoff = self.cutoff();
        if cutoff.is_some_and(|cutoff| request.at < cutoff) {
            return;
        }

        // Sweep before taking the entry lock; retain locks every shard.
        if self.recorded.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.prune();
        }

        let mut records = self
            .entries
            .entry((request.client.clone(), request.ip.clone()))
            .or_default();
        if let Some(cutoff) = cutoff {
            records.retain(|r| r.at >= cutoff);
        }
        records.push(request);
    }

    fn count_since(&self, client: &str, ip: &str, since: SystemTime) -> usize {
        self.entries
            .get(&(client.to_string(), ip.to_string()))
            .map(|records| records.iter().filter(|r| r.at >= since).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_blacklist() {
        let list: MemoryBlacklist = ["BadBot/1.0", "EvilCrawler"].into_iter().collect();
        assert!(list.is_blacklisted("BadBot/1.0"));
        assert!(!list.is_blacklisted("Mozilla/5.0"));
        assert!(list.remove("EvilCrawler"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_bad_request_counts_per_pair() {
        let log = MemoryBadRequestLog::new(Duration::from_secs(600));
        let since = SystemTime::now() - Duration::from_secs(1);
        log.record(BadRequest::new("bot", "10.0.0.1", "/a"));
        log.record(BadRequest::new("bot", "10.0.0.1", "/b"));
        log.record(BadRequest::new("bot", "10.0.0.2", "/c"));

        assert_eq!(log.count_since("bot", "10.0.0.1", since), 2);
        assert_eq!(log.count_since("bot", "10.0.0.2", since), 1);
        assert_eq!(log.count_since("human", "10.0.0.1", since), 0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_old_records_outside_window() {
        let log = MemoryBadRequestLog::new(Duration::from_secs(600));
        let mut old = BadRequest::new("bot", "10.0.0.1", "/old");
        old.at = SystemTime::now() - Duration::from_secs(300);
        log.record(old);
        log.record(BadRequest::new("bot", "10.0.0.1", "/new"));

        let since = SystemTime::now() - Duration::from_secs(60);
        assert_eq!(log.count_since("bot", "10.0.0.1", since), 1);
    }

    #[test]
    fn test_records_pruned_after_retention() {
        let log = MemoryBadRequestLog::new(Duration::from_secs(60));
        let mut old = BadRequest::new("bot", "10.0.0.1", "/old");
        old.at = SystemTime::now() - Duration::from_secs(120);
        log.record(old);
        log.record(BadRequest::new("bot", "10.0.0.1", "/new"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_expired_records_are_not_kept() {
        let log = MemoryBadRequestLog::new(Duration::from_secs(60));
        for i in 0..1000 {
            let mut stale = BadRequest::new(format!("scanner-{i}"), "10.0.0.9", "/wp-login.php");
            stale.at = SystemTime::now() - Duration::from_secs(3600);
            log.record(stale);
        }
        for _ in 0..10 {
            log.record(BadRequest::new("bot", "10.0.0.1", "/missing"));
        }

        assert_eq!(log.len(), 10);
        assert_eq!(log.pairs(), 1);
    }

    #[test]
    fn test_idle_pairs_evicted_by_sweep() {
        let log = MemoryBadRequestLog::new(Duration::from_millis(50));
        log.record(BadRequest::new("quiet", "10.0.0.1", "/a"));
        assert_eq!(log.pairs(), 1);

        std::thread::sleep(Duration::from_millis(100));
        for _ in 0..SWEEP_EVERY {
            log.record(BadRequest::new("busy", "10.0.0.2", "/b"));
        }

        assert_eq!(log.count_since("quiet", "10.0.0.1", SystemTime::UNIX_EPOCH), 0);
        assert_eq!(log.pairs(), 1);
    }

    #[test]
    fn test_prune_drops_empty_pairs() {
        let log = MemoryBadRequestLog::new(Duration::from_millis(50));
        log.record(BadRequest::new("a", "10.0.0.1", "/x"));
        log.record(BadRequest::new("b", "10.0.0.2", "/y"));
        std::thread::sleep(Duration::from_millis(100));

        log.prune();
        assert!(log.is_empty());
        assert_eq!(log.pairs(), 0);
    }
}
