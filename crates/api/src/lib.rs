//! GSLB control-plane API: zone/record overview plus bulk backend
//! enable/disable, optionally behind HTTP Basic Auth.
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::create_api_routes;
pub use state::AppState;
