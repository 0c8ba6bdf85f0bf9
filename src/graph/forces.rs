//! Composable forces for the layout simulation.
//!
//! Every force reads the positions settled by the previous step and adds its
//! contribution to a shared per-node velocity delta buffer. Integration
//! happens once, after all forces ran, so forces never see each other's
//! contributions within a tick.

use super::quadtree::{charge_between, coincident_direction, Body, Quadtree};
use super::types::OrgGraph;
use crate::settings::{LayoutSettings, LinkDistances, PerLevel};
use egui::{Pos2, Vec2};

/// A force acting on the node set
pub trait Force {
    /// Precompute per-node or per-link parameters.
    ///
    /// Called when the force is registered and whenever the hierarchy changes.
    fn initialize(&mut self, _graph: &OrgGraph) {}

    /// Add this force's velocity contribution for one tick to `deltas`
    /// (indexed like `graph.nodes()`).
    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]);
}

/// Spring along every link.
///
/// Stiffness is `1 / min(degree(source), degree(target))`; the correction is
/// split between the endpoints by their relative degree.
pub struct LinkForce {
    distances: LinkDistances,
    rest_lengths: Vec<f32>,
    strengths: Vec<f32>,
    /// Share of the correction applied to the target
    biases: Vec<f32>,
}

impl LinkForce {
    pub fn new(distances: LinkDistances) -> Self {
        Self {
            distances,
            rest_lengths: Vec::new(),
            strengths: Vec::new(),
            biases: Vec::new(),
        }
    }

    /// Rest length of each link, in link order
    pub fn rest_lengths(&self) -> &[f32] {
        &self.rest_lengths
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, graph: &OrgGraph) {
        let mut degree = vec![0usize; graph.len()];
        for link in graph.links() {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let nodes = graph.nodes();
        self.rest_lengths.clear();
        self.strengths.clear();
        self.biases.clear();
        for link in graph.links() {
            let (ds, dt) = (degree[link.source] as f32, degree[link.target] as f32);
            let deepest = nodes[link.source].level.max(nodes[link.target].level);
            self.rest_lengths.push(self.distances.for_link(link.kind(), deepest));
            self.strengths.push(1.0 / ds.min(dt));
            self.biases.push(ds / (ds + dt));
        }
    }

    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]) {
        let nodes = graph.nodes();
        for (k, link) in graph.links().iter().enumerate() {
            if link.source == link.target {
                continue;
            }
            let delta = nodes[link.target].pos - nodes[link.source].pos;
            let length = delta.length();
            let direction = if length > f32::EPSILON {
                delta / length
            } else {
                coincident_direction(link.source, link.target)
            };

            let correction =
                direction * (length - self.rest_lengths[k]) * alpha * self.strengths[k];
            let bias = self.biases[k];
            deltas[link.target] -= correction * bias;
            deltas[link.source] += correction * (1.0 - bias);
        }
    }
}

/// Pairwise charge between nodes, strength per hierarchy level.
///
/// Exact O(n²) evaluation below `barnes_hut_min_nodes`, quadtree
/// approximation above it.
pub struct ManyBodyForce {
    strength: PerLevel<f32>,
    distance_min: f32,
    theta: f32,
    barnes_hut_min_nodes: usize,
    strengths: Vec<f32>,
}

impl ManyBodyForce {
    pub fn new(strength: PerLevel<f32>, distance_min: f32) -> Self {
        Self {
            strength,
            distance_min,
            theta: 0.9,
            barnes_hut_min_nodes: usize::MAX,
            strengths: Vec::new(),
        }
    }

    /// Switch to the quadtree approximation once the graph has at least
    /// `min_nodes` nodes
    pub fn with_barnes_hut(mut self, theta: f32, min_nodes: usize) -> Self {
        self.theta = theta;
        self.barnes_hut_min_nodes = min_nodes;
        self
    }
}

impl Force for ManyBodyForce {
    fn initialize(&mut self, graph: &OrgGraph) {
        self.strengths = graph
            .nodes()
            .iter()
            .map(|n| self.strength.get(n.level))
            .collect();
    }

    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]) {
        let nodes = graph.nodes();
        let n = nodes.len();

        if n >= self.barnes_hut_min_nodes {
            let bodies: Vec<Body> = nodes
                .iter()
                .enumerate()
                .map(|(i, node)| Body {
                    index: i,
                    pos: node.pos,
                    strength: self.strengths[i],
                })
                .collect();
            let tree = Quadtree::build(&bodies, self.theta);
            for (i, node) in nodes.iter().enumerate() {
                deltas[i] += tree.calculate_force(i, node.pos, self.distance_min) * alpha;
            }
            return;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let (pi, pj) = (nodes[i].pos, nodes[j].pos);
                deltas[i] +=
                    charge_between(i, pi, j, pj, self.strengths[j], self.distance_min) * alpha;
                deltas[j] +=
                    charge_between(j, pj, i, pi, self.strengths[i], self.distance_min) * alpha;
            }
        }
    }
}

/// Pulls the centroid of all nodes toward a fixed point
pub struct CenterForce {
    center: Pos2,
    strength: f32,
}

impl CenterForce {
    pub fn new(center: Pos2, strength: f32) -> Self {
        Self { center, strength }
    }
}

impl Force for CenterForce {
    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]) {
        let nodes = graph.nodes();
        if nodes.is_empty() {
            return;
        }
        let sum = nodes.iter().fold(Vec2::ZERO, |acc, n| acc + n.pos.to_vec2());
        let centroid = (sum / nodes.len() as f32).to_pos2();
        let shift = (self.center - centroid) * self.strength * alpha;
        for delta in deltas.iter_mut() {
            *delta += shift;
        }
    }
}

/// Overlap resolution between node discs.
///
/// Runs several relaxation passes per tick; each pass sees the corrections of
/// the previous one.
pub struct CollideForce {
    radius: PerLevel<f32>,
    padding: f32,
    strength: f32,
    passes: usize,
    radii: Vec<f32>,
}

impl CollideForce {
    pub fn new(radius: PerLevel<f32>, padding: f32, strength: f32, passes: usize) -> Self {
        Self {
            radius,
            padding,
            strength,
            passes: passes.max(1),
            radii: Vec::new(),
        }
    }
}

impl Force for CollideForce {
    fn initialize(&mut self, graph: &OrgGraph) {
        self.radii = graph
            .nodes()
            .iter()
            .map(|n| self.radius.get(n.level) + self.padding)
            .collect();
    }

    fn apply(&mut self, graph: &OrgGraph, _alpha: f32, deltas: &mut [Vec2]) {
        let nodes = graph.nodes();
        let n = nodes.len();
        let predicted: Vec<Pos2> = nodes.iter().map(|node| node.pos + node.vel).collect();
        let mut corrections = vec![Vec2::ZERO; n];

        for _ in 0..self.passes {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (pinned_i, pinned_j) = (nodes[i].is_pinned(), nodes[j].is_pinned());
                    if pinned_i && pinned_j {
                        continue;
                    }

                    let (ri, rj) = (self.radii[i], self.radii[j]);
                    let reach = ri + rj;
                    let delta = (predicted[i] + corrections[i]) - (predicted[j] + corrections[j]);
                    let length_sq = delta.length_sq();
                    if length_sq >= reach * reach {
                        continue;
                    }

                    let length = length_sq.sqrt();
                    let direction = if length > f32::EPSILON {
                        delta / length
                    } else {
                        -coincident_direction(i, j)
                    };
                    let push = direction * (reach - length) * self.strength;

                    // A pinned node cannot move, so its partner takes the whole push
                    let share_i = if pinned_i {
                        0.0
                    } else if pinned_j {
                        1.0
                    } else {
                        (rj * rj) / (ri * ri + rj * rj)
                    };
                    corrections[i] += push * share_i;
                    corrections[j] -= push * (1.0 - share_i);
                }
            }
        }

        for (delta, correction) in deltas.iter_mut().zip(corrections) {
            *delta += correction;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Weak pull toward a fixed axis line
pub struct AxisForce {
    axis: Axis,
    target: f32,
    strength: f32,
}

impl AxisForce {
    pub fn new(axis: Axis, target: f32, strength: f32) -> Self {
        Self {
            axis,
            target,
            strength,
        }
    }
}

impl Force for AxisForce {
    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]) {
        for (node, delta) in graph.nodes().iter().zip(deltas.iter_mut()) {
            match self.axis {
                Axis::X => delta.x += (self.target - node.pos.x) * self.strength * alpha,
                Axis::Y => delta.y += (self.target - node.pos.y) * self.strength * alpha,
            }
        }
    }
}

/// Generic forces configured from settings, in their default order
pub fn link_force(settings: &LayoutSettings) -> LinkForce {
    LinkForce::new(settings.link_distance)
}

pub fn charge_force(settings: &LayoutSettings) -> ManyBodyForce {
    ManyBodyForce::new(settings.repulsion, settings.distance_min)
        .with_barnes_hut(settings.theta, settings.barnes_hut_min_nodes)
}

pub fn center_force(settings: &LayoutSettings) -> CenterForce {
    CenterForce::new(settings.center(), settings.center_strength)
}

pub fn collide_force(settings: &LayoutSettings) -> CollideForce {
    CollideForce::new(
        settings.node_radius,
        settings.collide_padding,
        settings.collide_strength,
        settings.collide_passes,
    )
}
