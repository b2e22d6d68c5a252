mod air_quality;
mod health;
mod insights;
mod metrics;
mod transport;
mod weather;

pub use air_quality::air_quality_handler;
pub use health::{health_handler, not_found_handler, root_handler};
pub use insights::insights_handler;
pub use metrics::metrics_handler;
pub use transport::transport_handler;
pub use weather::weather_handler;
