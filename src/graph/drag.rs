//! Drag-to-pin interaction.
//!
//! Pressing on a node pins it where it is and reheats the simulation, moving
//! the pointer moves the pin, and releasing unpins the node and lets the
//! layout cool back down.

use super::simulation::Simulation;
use super::types::OrgGraph;
use crate::error::{OrgChartError, Result};
use crate::settings::{LayoutSettings, PerLevel};
use egui::Pos2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        node: usize,
    },
}

pub struct DragController {
    state: DragState,
    /// Alpha target held while dragging
    reheat_target: f32,
}

impl DragController {
    pub fn new(reheat_target: f32) -> Self {
        Self {
            state: DragState::Idle,
            reheat_target,
        }
    }

    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self::new(settings.drag_alpha_target)
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn dragged_node(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { node } => Some(node),
        }
    }

    /// Start dragging the node with the given id
    pub fn press_id(&mut self, sim: &mut Simulation, id: &str) -> Result<()> {
        let node = sim
            .graph()
            .index_of(id)
            .ok_or_else(|| OrgChartError::UnknownNode(id.to_string()))?;
        self.press(sim, node)
    }

    /// Idle -> dragging: pin the node at its current position and reheat
    pub fn press(&mut self, sim: &mut Simulation, node: usize) -> Result<()> {
        if let DragState::Dragging { node: active } = self.state {
            return Err(OrgChartError::DragInProgress {
                active: sim.graph().nodes()[active].id.clone(),
            });
        }
        let Some(target) = sim.graph_mut().nodes_mut().get_mut(node) else {
            return Err(OrgChartError::UnknownNode(format!("#{node}")));
        };
        let pos = target.pos;
        target.set_pin(Some(pos));
        tracing::debug!("Drag start on `{}` at ({:.1}, {:.1})", target.id, pos.x, pos.y);

        if sim.alpha_target() == 0.0 {
            sim.set_alpha_target(self.reheat_target);
            sim.restart();
        }
        self.state = DragState::Dragging { node };
        Ok(())
    }

    /// Move the pin of the dragged node; returns false when idle
    pub fn drag_to(&mut self, sim: &mut Simulation, pos: Pos2) -> bool {
        let DragState::Dragging { node } = self.state else {
            return false;
        };
        sim.graph_mut().nodes_mut()[node].set_pin(Some(pos));
        true
    }

    /// Dragging -> idle: unpin and let the simulation cool. Returns the node
    /// that was released.
    pub fn release(&mut self, sim: &mut Simulation) -> Option<usize> {
        let node = self.dragged_node()?;
        let released = &mut sim.graph_mut().nodes_mut()[node];
        released.set_pin(None);
        tracing::debug!("Drag end on `{}`", released.id);

        sim.set_alpha_target(0.0);
        self.state = DragState::Idle;
        Some(node)
    }
}

/// Topmost node whose disc contains `pos` (later nodes are drawn on top)
pub fn pick(graph: &OrgGraph, pos: Pos2, radius: &PerLevel<f32>) -> Option<usize> {
    graph
        .nodes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, n)| n.pos.distance(pos) <= radius.get(n.level))
        .map(|(i, _)| i)
}
