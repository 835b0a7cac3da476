// Community Complaint Tracker
// Module declarations

use std::io;
use thiserror::Error;

pub mod config;
pub mod console;
pub mod report;
pub mod state;

use config::{AppConfig, ConfigError};
use console::Console;
use state::{ComplaintDb, ComplaintStore, PersistenceGateway, SnapshotFile};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Start an interactive session on stdin/stdout
pub fn run() -> Result<(), RunError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = AppConfig::from_env()?;
    log::info!(
        "Using database {} and backup {}",
        config.db_path.display(),
        config.backup_path.display()
    );

    let db = ComplaintDb::new(&config.db_path);
    if let Err(e) = db.ensure_schema() {
        log::error!("Database setup failed: {}", e);
    }
    let gateway = PersistenceGateway::with_defaults(db, SnapshotFile::new(&config.backup_path));
    let mut store = ComplaintStore::open(gateway);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());
    console.run(&mut store)?;

    log::info!("Session ended with {} complaints", store.list_all().len());
    Ok(())
}
