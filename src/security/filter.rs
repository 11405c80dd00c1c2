//! Pre-dispatch filter chain.
//!
//! # Responsibilities
//! - Define the `Filter` capability
//! - Run filters in registration order, stopping at the first rejection
//! - Build the configured filters from their names
//!
//! # Design Decisions
//! - Filters signal rejection only by returning `ResourceNotAllowed`
//! - The chain holds no request state; counters live in the stores
//! - Filter names map to constructor functions; unknown names are errors

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::FiltersConfig;
use crate::error::{AlphaError, AlphaResult};
use crate::http::Request;
use crate::observability::metrics;
use crate::security::client_blacklist::ClientBlacklistFilter;
use crate::security::ip_blacklist::IpBlacklistFilter;
use crate::security::store::{BadRequestLog, BlacklistStore};
use crate::security::temp_blacklist::ClientTempBlacklistFilter;

/// Names accepted in `filters.order`.
pub const KNOWN_FILTERS: &[&str] = &["client_blacklist", "ip_blacklist", "client_temp_blacklist"];

/// A check run before a request reaches its handler.
pub trait Filter: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Return `ResourceNotAllowed` to block the request.
    fn process(&self, request: &Request) -> AlphaResult<()>;
}

/// Ordered list of filters.
#[derive(Default, Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, filter: Arc<dyn Filter>) {
        tracing::debug!(filter = filter.name(), "Filter registered");
        self.filters.push(filter);
    }

    /// Append every filter of `other`, keeping its order.
    pub fn extend(&mut self, other: FilterChain) {
        self.filters.extend(other.filters);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter in order. The first rejection is returned as is.
    pub fn run_all(&self, request: &Request) -> AlphaResult<()> {
        for filter in &self.filters {
            if let Err(e) = filter.process(request) {
                tracing::warn!(
                    filter = filter.name(),
                    uri = %request.uri(),
                    reason = %e,
                    "Request blocked"
                );
                metrics::record_blocked(filter.name());
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Stores the built-in filters consult.
#[derive(Clone)]
pub struct FilterStores {
    pub client_blacklist: Arc<dyn BlacklistStore>,
    pub ip_blacklist: Arc<dyn BlacklistStore>,
    pub bad_requests: Arc<dyn BadRequestLog>,
}

/// Constructor for a named filter. `None` means the filter is disabled.
pub type FilterFactory =
    Box<dyn Fn(&FiltersConfig, &FilterStores) -> Option<Arc<dyn Filter>> + Send + Sync>;

/// Maps filter names to constructors.
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(
            "client_blacklist",
            Box::new(|config: &FiltersConfig, stores: &FilterStores| {
                config.client_blacklist.enabled.then(|| {
                    Arc::new(ClientBlacklistFilter::new(stores.client_blacklist.clone()))
                        as Arc<dyn Filter>
                })
            }),
        );
        registry.register(
            "ip_blacklist",
            Box::new(|config: &FiltersConfig, stores: &FilterStores| {
                config.ip_blacklist.enabled.then(|| {
                    Arc::new(IpBlacklistFilter::new(stores.ip_blacklist.clone())) as Arc<dyn Filter>
                })
            }),
        );
        registry.register(
            "client_temp_blacklist",
            Box::new(|config: &FiltersConfig, stores: &FilterStores| {
                config.client_temp_blacklist.enabled.then(|| {
                    Arc::new(ClientTempBlacklistFilter::new(
                        stores.bad_requests.clone(),
                        &config.client_temp_blacklist,
                    )) as Arc<dyn Filter>
                })
            }),
        );
        registry
    }
}

impl FilterRegistry {
    pub fn register(&mut self, name: impl Into<String>, factory: FilterFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Build the chain named by `config.order`, skipping disabled filters.
    pub fn build_chain(&self, config: &FiltersConfig, stores: &FilterStores) -> AlphaResult<FilterChain> {
        let mut chain = FilterChain::new();
        for name in &config.order {
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| AlphaError::UnknownFilter(name.clone()))?;
            match factory(config, stores) {
                Some(filter) => chain.register(filter),
                None => tracing::debug!(filter = %name, "Filter disabled"),
            }
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::store::{MemoryBadRequestLog, MemoryBlacklist};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingFilter {
        calls: Arc<AtomicUsize>,
        block: bool,
    }

    impl Filter for CountingFilter {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn process(&self, _request: &Request) -> AlphaResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.block {
                Err(AlphaError::ResourceNotAllowed("Not allowed!".into()))
            } else {
                Ok(())
            }
        }
    }

    fn stores() -> FilterStores {
        FilterStores {
            client_blacklist: Arc::new(MemoryBlacklist::new()),
            ip_blacklist: Arc::new(MemoryBlacklist::new()),
            bad_requests: Arc::new(MemoryBadRequestLog::new(Duration::from_secs(60))),
        }
    }

    #[test]
    fn test_first_rejection_stops_chain() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut chain = FilterChain::new();
        chain.register(Arc::new(CountingFilter { calls: first.clone(), block: true }));
        chain.register(Arc::new(CountingFilter { calls: second.clone(), block: false }));

        let err = chain.run_all(&Request::get("/")).unwrap_err();
        assert!(matches!(err, AlphaError::ResourceNotAllowed(_)));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_pass() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = FilterChain::new();
        chain.register(Arc::new(CountingFilter { calls: calls.clone(), block: false }));
        chain.register(Arc::new(CountingFilter { calls: calls.clone(), block: false }));
        assert!(chain.run_all(&Request::get("/")).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_registry_skips_disabled() {
        let mut config = FiltersConfig::default();
        config.ip_blacklist.enabled = true;
        config.client_blacklist.enabled = true;
        let chain = FilterRegistry::default().build_chain(&config, &stores()).unwrap();
        assert_eq!(chain.names(), vec!["client_blacklist", "ip_blacklist"]);
    }

    #[test]
    fn test_registry_follows_configured_order() {
        let mut config = FiltersConfig::default();
        config.order = vec!["ip_blacklist".into(), "client_blacklist".into()];
        config.ip_blacklist.enabled = true;
        config.client_blacklist.enabled = true;
        let chain = FilterRegistry::default().build_chain(&config, &stores()).unwrap();
        assert_eq!(chain.names(), vec!["ip_blacklist", "client_blacklist"]);
    }

    #[test]
    fn test_registry_rejects_unknown_name() {
        let mut config = FiltersConfig::default();
        config.order.push("captcha".into());
        let err = FilterRegistry::default().build_chain(&config, &stores()).unwrap_err();
        assert!(matches!(err, AlphaError::UnknownFilter(name) if name == "captcha"));
    }

    #[test]
    fn test_known_filters_match_registry() {
        let registry = FilterRegistry::default();
        for name in KNOWN_FILTERS {
            assert!(registry.factories.contains_key(*name));
        }
    }
}
