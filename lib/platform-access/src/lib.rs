//! User registration and request filtering for linklet.
//!
//! Callers arrive with a transport-supplied identity; this crate owns the
//! input-filtering collaborators sitting in front of every operation:
//!
//! - **UserDirectory**: auto-registration of users on first contact
//! - **RateLimiter**: per-user fixed-window request limiting

pub mod error;
pub mod rate_limit;
pub mod user;

pub use error::AccessError;
pub use rate_limit::{RateLimitConfig, RateLimitResult, RateLimiter};
pub use user::{User, UserDirectory, UserProfile};
