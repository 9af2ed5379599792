mod auth;
mod feature_gate;
mod rate_limit;

pub use auth::require_auth;
pub use feature_gate::{Feature, feature_gate};
pub use rate_limit::{Decision, RateLimiter, rate_limit_middleware};
