use thiserror::Error;

use crate::model::CellId;

/// Every failure the game core can report. None of these are fatal; the
/// session turns them into a status line and leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("cache {cell} has no coins left")]
    EmptyCache { cell: CellId },
    #[error("you have no coins to deposit")]
    EmptyInventory,
    #[error("there is no cache at {cell}")]
    MissingCache { cell: CellId },
    #[error("saved game could not be read: {0}")]
    CorruptSnapshot(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for GameError {
    fn from(value: serde_json::Error) -> Self {
        Self::CorruptSnapshot(value.to_string())
    }
}
