//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     add_route(pattern, handler)
//!     → pattern.rs (parse, compile strict + defaulted matchers)
//!     → router.rs (append in order, index by pattern string)
//!     → with_default(name, value) on the new route
//!
//! Incoming URI:
//!     → matcher.rs phase 1: exact pattern lookup
//!     → matcher.rs phase 2: all placeholders supplied
//!     → matcher.rs phase 3: trailing placeholders omitted
//!     → RouteMatch (route, phase, captures) or RouteNotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins within a phase (registration order)

pub mod matcher;
pub mod pattern;
pub mod router;

pub use matcher::{MatchPhase, RouteMatch, RouteNotFound};
pub use pattern::RoutePattern;
pub use router::{Handler, Route, RouteBuilder, RouteTable};
