//! Observability for the failover core
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Monotonic counters
//!
//! Observability describes what a pass did; it never feeds back into a
//! decision.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{FailoverMetrics, MetricsSnapshot};
