//! Operator control plane
//!
//! HTTP endpoints for manual failover and status. Disabled by default.

mod config;
mod routes;
mod server;

pub use config::ControlConfig;
pub use routes::{control_routes, ControlError, ErrorResponse, RecheckResponse, RoleResponse, StatusResponse};
pub use server::serve;
