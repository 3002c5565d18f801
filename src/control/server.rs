//! Control Plane Server

use std::sync::Arc;

use tokio::net::TcpListener;

use super::config::ControlConfig;
use super::routes::control_routes;
use crate::failover::Decider;
use crate::observability::{Event, Logger};

/// Bind the control plane and serve until the listener fails.
pub async fn serve(config: &ControlConfig, decider: Arc<dyn Decider>) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;
    Logger::event(Event::ControlServing, &[("addr", addr.as_str())]);
    axum::serve(listener, control_routes(decider)).await
}
