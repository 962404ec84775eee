pub mod clog;
pub mod db;
pub mod gateway;
pub mod migrations;

pub use db::Database;
pub use gateway::{GatewayConfig, GatewayServer, HealthResponse};
pub use migrations::{DirSource, MigrateError, MigrationSource, Migrator, StaticSource};
