//! API interface implementations

pub mod metrics_handler;

pub use metrics_handler::{init_metrics, metrics_router};
