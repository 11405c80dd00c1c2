//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the stores the filters consult, seeded from configuration
//! - Assemble the front controller: built-in controllers, configured
//!   filters, token route
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Takes an already validated config; loading is the caller's job
//! - Listeners start after this returns (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;

use crate::config::AlphaConfig;
use crate::controllers;
use crate::dispatch::{FrontController, FrontControllerBuilder};
use crate::error::AlphaResult;
use crate::security::{BadRequestLog, FilterRegistry, FilterStores, MemoryBadRequestLog, MemoryBlacklist};

/// Everything the HTTP boundary needs to serve traffic.
pub struct Application {
    pub front: Arc<FrontController>,
    /// Present when the temporary blacklist is enabled; 404s are recorded here.
    pub bad_requests: Option<Arc<dyn BadRequestLog>>,
}

/// Stores backed by memory, seeded from the configured blacklists.
pub fn memory_stores(config: &AlphaConfig) -> FilterStores {
    let filters = &config.filters;
    let client_blacklist: MemoryBlacklist = filters.client_blacklist.entries.iter().cloned().collect();
    let ip_blacklist: MemoryBlacklist = filters.ip_blacklist.entries.iter().cloned().collect();
    let retention = Duration::from_secs(filters.client_temp_blacklist.window_secs);

    tracing::debug!(
        client_entries = client_blacklist.len(),
        ip_entries = ip_blacklist.len(),
        retention_secs = retention.as_secs(),
        "Filter stores seeded"
    );

    FilterStores {
        client_blacklist: Arc::new(client_blacklist),
        ip_blacklist: Arc::new(ip_blacklist),
        bad_requests: Arc::new(MemoryBadRequestLog::new(retention)),
    }
}

/// Build the application with in-memory stores.
pub fn bootstrap(config: Arc<AlphaConfig>) -> AlphaResult<Application> {
    let stores = memory_stores(&config);
    bootstrap_with(config, stores, |_| Ok(()))
}

/// Build the application with the given stores. `customize` runs after the
/// built-in routes are registered, so it can add application routes.
pub fn bootstrap_with<F>(config: Arc<AlphaConfig>, stores: FilterStores, customize: F) -> AlphaResult<Application>
where
    F: FnOnce(&mut FrontControllerBuilder) -> AlphaResult<()>,
{
    let mut builder = FrontController::builder(config.clone())?;
    controllers::register_defaults(&mut builder)?;
    customize(&mut builder)?;
    builder.configure_filters(&FilterRegistry::default(), &stores)?;
    let front = Arc::new(builder.build()?);

    let bad_requests = config
        .filters
        .client_temp_blacklist
        .enabled
        .then(|| stores.bad_requests.clone());

    tracing::info!(
        temp_blacklist = bad_requests.is_some(),
        "Application assembled"
    );

    Ok(Application { front, bad_requests })
}
