mod runner;
mod source;

pub use runner::{LogEntry, MigrateError, MigrateErrorKind, Migrator};
pub use source::{DirSource, MigrationSource, StaticSource};
