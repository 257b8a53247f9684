//! Notewall headless host
//!
//! Opens a board from the file store, replays scripted host input through the
//! engine and reports the resulting projection.

mod replay;
mod script;

pub use replay::{Replay, ReplayOutput};
pub use script::{HostEvent, Script};

use notewall_core::storage::{JsonFileStore, StorageError};
use notewall_core::{ConfigError, EngineConfig, EngineError, NoteList, Whiteboard};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the headless host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to open board: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script error: {0}")]
    Script(String),
}

/// Everything needed for one replay run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub board_id: String,
    pub script: PathBuf,
    pub engine_config: Option<PathBuf>,
    /// Board directory. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

/// Open the board, replay the script and close the engine.
pub fn run(config: &AppConfig) -> Result<ReplayOutput, AppError> {
    let engine_config = match &config.engine_config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let store = match &config.data_dir {
        Some(dir) => JsonFileStore::new(dir.clone())?,
        None => JsonFileStore::default_location()?,
    };
    log::info!("Using board directory {}", store.base_path().display());

    let script = Script::load(&config.script)?;
    let notes = NoteList::new(script.notes);
    let engine = Whiteboard::open(engine_config, store, notes, &config.board_id)?;

    let mut replay = Replay::new(engine);
    for (index, event) in script.events.into_iter().enumerate() {
        log::debug!("Replaying event {}: {:?}", index, event);
        replay.apply(event)?;
    }
    Ok(replay.finish())
}
