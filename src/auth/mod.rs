//! Authentication and request admission.
//!
//! Credentials, signed session tokens, throttling identity resolution, and
//! the fixed-window admission controller.

pub mod credentials;
pub mod handlers;
pub mod identity;
pub mod rate_limit;
mod service;
mod tokens;

pub use identity::ClientIdentity;
pub use rate_limit::{CounterStore, Decision, InMemoryCounterStore, RateLimiter};
pub use service::AuthService;
pub use tokens::{Claims, TokenService, TokenType};
