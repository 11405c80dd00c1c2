//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request:
//!     → filter.rs (run configured filters in order)
//!         → client_blacklist.rs (user agent lookup)
//!         → ip_blacklist.rs (source IP lookup)
//!         → temp_blacklist.rs (recent bad requests per client + IP)
//!     → Pass to handler, or ResourceNotAllowed
//!
//! Secure URLs:
//!     query string → codec.rs (AES-256-ECB + url-safe base64) → tk token
//! ```
//!
//! # Design Decisions
//! - Fail closed: the first rejecting filter ends the request
//! - Lookups go through store traits; the chain itself is stateless
//! - Token format is kept byte-compatible with existing consumers

pub mod client_blacklist;
pub mod codec;
pub mod filter;
pub mod ip_blacklist;
pub mod store;
pub mod temp_blacklist;

pub use codec::{SecurityCodec, SecurityError, UrlStyle};
pub use filter::{Filter, FilterChain, FilterRegistry, FilterStores};
pub use store::{BadRequest, BadRequestLog, BlacklistStore, MemoryBadRequestLog, MemoryBlacklist};
