//! HTTP API: rates, metrics and docs

pub mod docs;
pub mod handlers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;

pub use handlers::ApiState;
pub use metrics::HttpMetrics;
pub use server::ApiServer;
