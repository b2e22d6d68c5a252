//! HTTP API behind the city dashboard: weather, air quality and transport
//! conditions per city.
//!
//! Every endpoint walks the same chain: normalize the city, serve a cached
//! response if one is fresh, otherwise ask the live provider (weather and air
//! quality only), otherwise synthesize plausible data, and as a last resort
//! serve a static fallback.

pub mod app;
pub mod cache;
pub mod city;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod state;
pub mod synth;
pub mod worker;

pub use app::build_router;
pub use config::Args;
pub use error::DashboardError;
pub use state::AppState;
