//! Force-directed layout for organizational hierarchies.
//!
//! Departments, teams and individuals are laid out by an iterative
//! simulation combining generic forces (link springs, repulsion, centering,
//! collision) with a hierarchy clustering force. Nodes can be pinned and
//! moved with [`graph::DragController`].

pub mod error;
pub mod graph;
pub mod loader;
pub mod settings;

pub use error::{OrgChartError, Result};
pub use settings::LayoutSettings;
