use anyhow::Result;
use clap::Parser;
use tracing::info;

use keypost_core::config::KeypostConfig;
use keypost_runtime::clog;
use keypost_runtime::gateway::{GatewayConfig, GatewayServer};
use keypost_runtime::Database;

/// Run the HTTP server.
#[derive(Parser)]
pub struct RunCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "keypost.toml")]
    pub config: String,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(self) -> Result<()> {
        // Load .env if present
        dotenvy::dotenv().ok();

        let mut config = KeypostConfig::from_file(&self.config)?;
        if let Some(port) = self.port {
            config.server.port = port;
        }

        clog::init(&config.service.name);
        info!(service = %config.service.name, port = config.server.port, "configuration parsed");

        let db = Database::from_config(&config.database).await?;
        db.health_check().await?;
        info!("database reachable");

        let gateway = GatewayConfig {
            port: config.server.port,
            request_timeout_secs: config.server.request_timeout_secs,
        };

        // Blocks until ctrl-c.
        GatewayServer::new(gateway, db.clone()).run().await?;

        db.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_defaults() {
        let cmd = RunCommand {
            config: "keypost.toml".to_string(),
            port: None,
        };
        assert_eq!(cmd.config, "keypost.toml");
        assert!(cmd.port.is_none());
    }
}
