pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigLoader, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig};
pub use logging::init_logging;
