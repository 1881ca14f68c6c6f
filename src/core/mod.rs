pub mod config;
mod logging;

pub use config::{AppConfig, CorsOrigins, Environment};
pub use logging::init_logging;
