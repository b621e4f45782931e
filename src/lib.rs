//! Vedic Astrology API
//!
//! HTTP service that turns free-form birth data (date, time, place) into
//! Vedic chart JSON:
//! - lenient date/time normalization
//! - place -> coordinates -> DST-aware UTC offset
//! - delegation to an external chart engine
//! - summary, divisional, planet and dasha views of the engine output

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod location;
pub mod normalize;
pub mod server;
pub mod services;
pub mod utils;
pub mod views;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use error::ApiError;
pub use server::{router, run_server, AppState};
