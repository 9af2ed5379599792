pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{Environment, Settings};
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
