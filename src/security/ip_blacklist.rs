//! IP address blacklist filter.

use std::sync::Arc;

use crate::error::{AlphaError, AlphaResult};
use crate::http::Request;
use crate::security::filter::Filter;
use crate::security::store::BlacklistStore;

/// Blocks requests whose source address is on the blacklist.
pub struct IpBlacklistFilter {
    store: Arc<dyn BlacklistStore>,
}

impl IpBlacklistFilter {
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }
}

impl Filter for IpBlacklistFilter {
    fn name(&self) -> &'static str {
        "ip_blacklist"
    }

    fn process(&self, request: &Request) -> AlphaResult<()> {
        let Some(ip) = request.ip() else {
            return Ok(());
        };

        let ip = ip.to_string();
        if self.store.is_blacklisted(&ip) {
            tracing::warn!(ip = %ip, uri = %request.uri(), "Blacklisted IP");
            return Err(AlphaError::ResourceNotAllowed("Not allowed!".to_string()));
        }
        Ok(())
    }
}
