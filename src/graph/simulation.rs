//! The layout solver.
//!
//! A [`Simulation`] owns one org graph and a list of named forces. Each
//! [`Simulation::step`] anneals `alpha`, runs the forces in registration
//! order, integrates velocities into positions and notifies tick listeners.
//! Nothing runs on its own: the caller drives stepping (typically once per
//! frame) and decides when to stop.

use super::cluster::ClusterForce;
use super::forces::{self, Axis, AxisForce, Force};
use super::types::OrgGraph;
use crate::error::Result;
use crate::settings::LayoutSettings;
use egui::Vec2;

/// Snapshot handed to tick listeners after every step
pub struct Tick<'a> {
    /// Number of steps taken so far, including this one
    pub step: u64,
    pub alpha: f32,
    pub graph: &'a OrgGraph,
}

/// Handle returned by [`Simulation::on_tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TickListener = Box<dyn FnMut(&Tick<'_>)>;

pub struct Simulation {
    graph: OrgGraph,
    forces: Vec<(String, Box<dyn Force>)>,
    listeners: Vec<(ListenerId, TickListener)>,
    next_listener: u64,
    /// Per-tick velocity contributions, reused between steps
    deltas: Vec<Vec2>,

    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,

    steps: u64,
    settled: bool,
}

impl Simulation {
    /// Simulation with no forces registered
    pub fn new(graph: OrgGraph, settings: &LayoutSettings) -> Self {
        Self {
            deltas: vec![Vec2::ZERO; graph.len()],
            graph,
            forces: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            alpha: 1.0,
            alpha_min: settings.alpha_min,
            alpha_decay: settings.alpha_decay(),
            alpha_target: 0.0,
            velocity_decay: settings.velocity_decay,
            steps: 0,
            settled: false,
        }
    }

    /// Simulation with the standard force composition: link, charge, center,
    /// cluster, optional axis bias, and collide last so it has the final say
    /// on overlaps.
    pub fn with_default_forces(graph: OrgGraph, settings: &LayoutSettings) -> Self {
        let mut sim = Self::new(graph, settings);
        sim.add_force("link", forces::link_force(settings))
            .add_force("charge", forces::charge_force(settings))
            .add_force("center", forces::center_force(settings))
            .add_force("cluster", ClusterForce::from_settings(settings));
        if let Some(bias) = settings.axis_bias {
            sim.add_force("x", AxisForce::new(Axis::X, bias.x, bias.x_strength))
                .add_force("y", AxisForce::new(Axis::Y, bias.y, bias.y_strength));
        }
        sim.add_force("collide", forces::collide_force(settings));
        sim
    }

    /// Register a force under `name`. Re-registering a name replaces the
    /// force in place, keeping its position in the application order.
    pub fn add_force(&mut self, name: &str, force: impl Force + 'static) -> &mut Self {
        let mut force: Box<dyn Force> = Box::new(force);
        force.initialize(&self.graph);
        match self.forces.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = force,
            None => self.forces.push((name.to_string(), force)),
        }
        self
    }

    pub fn remove_force(&mut self, name: &str) -> Option<Box<dyn Force>> {
        let pos = self.forces.iter().position(|(n, _)| n == name)?;
        Some(self.forces.remove(pos).1)
    }

    /// Force names in application order
    pub fn force_names(&self) -> impl Iterator<Item = &str> {
        self.forces.iter().map(|(n, _)| n.as_str())
    }

    /// Subscribe to tick notifications
    pub fn on_tick(&mut self, listener: impl FnMut(&Tick<'_>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Detach all listeners
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Run one iteration of the simulation
    pub fn step(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        self.deltas.clear();
        self.deltas.resize(self.graph.len(), Vec2::ZERO);
        for (_, force) in &mut self.forces {
            force.apply(&self.graph, self.alpha, &mut self.deltas);
        }

        let friction = 1.0 - self.velocity_decay;
        for (node, delta) in self.graph.nodes_mut().iter_mut().zip(&self.deltas) {
            match node.pin() {
                Some(pin) => {
                    node.pos = pin;
                    node.vel = Vec2::ZERO;
                }
                None => {
                    node.vel = (node.vel + *delta) * friction;
                    node.pos += node.vel;
                }
            }
        }

        self.steps += 1;
        let settled = self.is_settled();
        if settled != self.settled {
            tracing::debug!(
                "Simulation {} at step {} (alpha {:.4})",
                if settled { "settled" } else { "reheated" },
                self.steps,
                self.alpha
            );
            self.settled = settled;
        }

        let tick = Tick {
            step: self.steps,
            alpha: self.alpha,
            graph: &self.graph,
        };
        for (_, listener) in &mut self.listeners {
            listener(&tick);
        }
    }

    /// Step until settled or `max_steps` is reached; returns the steps taken
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps && !self.is_settled() {
            self.step();
            taken += 1;
        }
        taken
    }

    /// Reheat to full temperature without touching positions
    pub fn restart(&mut self) {
        tracing::debug!("Simulation restarted at step {}", self.steps);
        self.alpha = 1.0;
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    /// Check if the simulation has settled
    pub fn is_settled(&self) -> bool {
        self.alpha < self.alpha_min
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn graph(&self) -> &OrgGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut OrgGraph {
        &mut self.graph
    }

    /// Change a node's parent and re-initialize forces that depend on the
    /// hierarchy
    pub fn reparent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        self.graph.reparent(id, parent)?;
        for (_, force) in &mut self.forces {
            force.initialize(&self.graph);
        }
        Ok(())
    }
}
