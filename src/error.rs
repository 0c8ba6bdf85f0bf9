//! Error type shared by the loader, the entity model and the drag controller.

use std::io;

use thiserror::Error;

/// The main error type for org chart operations.
///
/// Load failures (`Io`, `Json`) and construction failures (everything that
/// validates the document) are surfaced before a simulation is ever built.
#[derive(Debug, Error)]
pub enum OrgChartError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node `{id}` has unknown level `{level}` (expected 1, 2 or 3)")]
    UnknownLevel { id: String, level: String },

    #[error("Node id `{0}` is defined more than once")]
    DuplicateNode(String),

    #[error("Link {source_id} -> {target_id} references unknown node `{missing}`")]
    UnknownLinkEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("Node `{id}` references unknown parent `{parent}`")]
    UnknownParent { id: String, parent: String },

    #[error("Node `{id}` (level {level}) cannot have parent `{parent}` (level {parent_level})")]
    ParentLevelMismatch {
        id: String,
        level: u8,
        parent: String,
        parent_level: u8,
    },

    #[error("Department `{id}` cannot have a parent (found `{parent}`)")]
    UnexpectedParent { id: String, parent: String },

    #[error("Unknown node `{0}`")]
    UnknownNode(String),

    #[error("Node `{active}` is already being dragged")]
    DragInProgress { active: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OrgChartError>;
