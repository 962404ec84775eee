use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::info;

use keypost_core::config::KeypostConfig;
use keypost_runtime::clog;
use keypost_runtime::migrations::{DirSource, Migrator};
use keypost_runtime::Database;

/// Apply pending database migrations, then exit without serving.
///
/// Migrating and serving are mutually exclusive phases: a migration failure
/// is fatal and the server is never started in this mode.
#[derive(Parser)]
pub struct MigrateCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "keypost.toml")]
    pub config: String,

    /// Migrations directory path.
    #[arg(short, long, default_value = "migrations")]
    pub migrations_dir: String,
}

impl MigrateCommand {
    /// Execute the migrate command.
    pub async fn execute(self) -> Result<()> {
        // Load .env if present
        dotenvy::dotenv().ok();

        let config = KeypostConfig::from_file(&self.config)?;
        clog::init(&config.service.name);

        let db = Database::from_config(&config.database).await?;
        let migrator = Migrator::new(db.pool().clone());
        let source = DirSource::new(&self.migrations_dir);

        println!();
        println!(
            "  {} Running pending migrations from {}...",
            style("→").dim(),
            style(&self.migrations_dir).cyan()
        );

        let result = migrator.run(&source).await;

        // Applied names are reported even on failure.
        let applied = match &result {
            Ok(applied) => applied,
            Err(err) => &err.applied,
        };
        for name in applied {
            println!("  {} Applied: {}", style("✓").green(), style(name).cyan());
        }

        match result {
            Ok(applied) => {
                if applied.is_empty() {
                    println!("  {} Nothing to apply", style("ℹ").blue());
                }
                println!();
                info!(applied = applied.len(), "migrated");
                db.close().await;
                Ok(())
            }
            Err(err) => {
                println!("  {} {}", style("✗").red(), err);
                println!();
                db.close().await;
                Err(err.into())
            }
        }
    }
}
