mod server;

pub use server::{GatewayConfig, GatewayServer, HealthResponse};
