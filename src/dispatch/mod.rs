//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! FrontController::process (front.rs)
//!     → `/?tk=...` rewritten to `/tk/...`
//!     → Dispatcher::process (dispatcher.rs)
//!         → RouteTable::resolve → bind → FilterChain::run_all → Handler
//!
//! `/tk/{token}` (token.rs):
//!     decode token → controller named by `act` → merged params → Handler
//! ```

pub mod dispatcher;
pub mod front;
pub mod token;

pub use dispatcher::Dispatcher;
pub use front::{FrontController, FrontControllerBuilder};
pub use token::{ControllerFactory, ControllerRegistry, TokenHandler, TOKEN_ROUTE};
