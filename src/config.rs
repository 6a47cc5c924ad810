use crate::error::PlaygroundError;
use crate::store::{MemoryStateStore, SledStateStore, StateStore};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Interactive SQL playground that shows which rows each statement touches
#[derive(Parser, Debug)]
#[command(name = "sql-playground", version)]
pub struct Cli {
    /// Directory where the database state is saved between runs
    #[arg(long = "data", default_value = "playground_data")]
    pub data_dir: PathBuf,

    /// Keep everything in memory; nothing is saved
    #[arg(long)]
    pub in_memory: bool,

    /// Start from a fresh database seeded with this chapter's setup
    #[arg(long)]
    pub chapter: Option<String>,

    /// Discard the saved database before starting
    #[arg(long)]
    pub reset: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "sql_playground=trace")
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }

    pub fn open_store(&self) -> Result<Box<dyn StateStore>, PlaygroundError> {
        if self.in_memory {
            return Ok(Box::new(MemoryStateStore::new()));
        }
        Ok(Box::new(SledStateStore::open(&self.data_dir)?))
    }

    /// Whether saved state must be dropped before the session opens.
    pub fn starts_fresh(&self) -> bool {
        self.reset || self.chapter.is_some()
    }
}
