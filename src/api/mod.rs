//! HTTP API Module
//! Capture page, share endpoint and health snapshot

pub mod handlers;
pub mod middleware;
pub mod page;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
