pub mod config;
pub mod error;

pub use config::{DatabaseConfig, KeypostConfig, ServerConfig, ServiceConfig};
pub use error::{KeypostError, Result};
