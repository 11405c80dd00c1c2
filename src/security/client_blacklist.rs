//! Client identity blacklist filter.

use std::sync::Arc;

use crate::error::{AlphaError, AlphaResult};
use crate::http::Request;
use crate::security::filter::Filter;
use crate::security::store::BlacklistStore;

/// Blocks requests whose user agent is on the blacklist.
pub struct ClientBlacklistFilter {
    store: Arc<dyn BlacklistStore>,
}

impl ClientBlacklistFilter {
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }
}

impl Filter for ClientBlacklistFilter {
    fn name(&self) -> &'static str {
        "client_blacklist"
    }

    fn process(&self, request: &Request) -> AlphaResult<()> {
        match request.user_agent() {
            Some(agent) if self.store.is_blacklisted(agent) => {
                tracing::warn!(client = %agent, uri = %request.uri(), "Blacklisted client");
                Err(AlphaError::ResourceNotAllowed("Not allowed!".to_string()))
            }
            _ => Ok(()),
        }
    }
}
