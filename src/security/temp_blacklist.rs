//! Temporary client blacklist.
//!
//! Blocks a client + IP pair once it has produced `limit` bad requests
//! within the configured window. The block lifts by itself as old bad
//! requests age out of the window.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::TempBlacklistConfig;
use crate::error::{AlphaError, AlphaResult};
use crate::http::Request;
use crate::security::filter::Filter;
use crate::security::store::BadRequestLog;

pub struct ClientTempBlacklistFilter {
    log: Arc<dyn BadRequestLog>,
    limit: usize,
    window: Duration,
}

impl ClientTempBlacklistFilter {
    pub fn new(log: Arc<dyn BadRequestLog>, config: &TempBlacklistConfig) -> Self {
        Self {
            log,
            limit: config.limit as usize,
            window: Duration::from_secs(config.window_secs),
        }
    }
}

impl Filter for ClientTempBlacklistFilter {
    fn name(&self) -> &'static str {
        "client_temp_blacklist"
    }

    fn process(&self, request: &Request) -> AlphaResult<()> {
        let (Some(client), Some(ip)) = (request.user_agent(), request.ip()) else {
            return Ok(());
        };

        let ip = ip.to_string();
        let since = SystemTime::now()
            .checked_sub(self.window)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let count = self.log.count_since(client, &ip, since);

        if count >= self.limit {
            tracing::warn!(
                client = %client,
                ip = %ip,
                bad_requests = count,
                limit = self.limit,
                "Client temporarily blacklisted"
            );
            return Err(AlphaError::ResourceNotAllowed("Not allowed!".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::store::{BadRequest, MemoryBadRequestLog};
    use std::net::IpAddr;

    fn setup(limit: u32) -> (Arc<MemoryBadRequestLog>, ClientTempBlacklistFilter) {
        let log = Arc::new(MemoryBadRequestLog::new(Duration::from_secs(600)));
        let config = TempBlacklistConfig {
            enabled: true,
            limit,
            window_secs: 600,
        };
        let filter = ClientTempBlacklistFilter::new(log.clone(), &config);
        (log, filter)
    }

    fn request() -> Request {
        let ip: IpAddr = "192.168.1.5".parse().unwrap();
        Request::get("/").with_header("User-Agent", "bot").with_ip(ip)
    }

    #[test]
    fn test_blocks_at_limit() {
        let (log, filter) = setup(3);
        for _ in 0..2 {
            log.record(BadRequest::new("bot", "192.168.1.5", "/missing"));
        }
        assert!(filter.process(&request()).is_ok());

        log.record(BadRequest::new("bot", "192.168.1.5", "/missing"));
        assert!(matches!(
            filter.process(&request()),
            Err(AlphaError::ResourceNotAllowed(_))
        ));
    }

    #[test]
    fn test_counts_only_same_pair() {
        let (log, filter) = setup(1);
        log.record(BadRequest::new("bot", "192.168.1.99", "/missing"));
        log.record(BadRequest::new("other", "192.168.1.5", "/missing"));
        assert!(filter.process(&request()).is_ok());
    }

    #[test]
    fn test_ignores_old_bad_requests() {
        let (log, filter) = setup(1);
        let mut old = BadRequest::new("bot", "192.168.1.5", "/missing");
        old.at = SystemTime::now() - Duration::from_secs(3600);
        log.record(old);
        assert!(filter.process(&request()).is_ok());
    }
}
