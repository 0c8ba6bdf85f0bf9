//! Hierarchy clustering force.
//!
//! Departments are assigned evenly spaced slots on an inner ring, teams are
//! fanned out on an outer ring inside a narrow window around their
//! department's current angle, and individuals are pulled to a point just
//! outside their team. Combined with the generic forces this gives each
//! level its own concentric zone.

use super::forces::Force;
use super::types::{Level, OrgGraph};
use crate::settings::{ClusterSettings, LayoutSettings};
use egui::{Pos2, Vec2};
use std::f32::consts::TAU;

pub struct ClusterForce {
    center: Pos2,
    settings: ClusterSettings,
    departments: Vec<usize>,
    teams: Vec<usize>,
    individuals: Vec<usize>,
    /// Nodes left without a hierarchy bias on the last tick
    unclustered: Vec<usize>,
}

impl ClusterForce {
    pub fn new(center: Pos2, settings: ClusterSettings) -> Self {
        Self {
            center,
            settings,
            departments: Vec::new(),
            teams: Vec::new(),
            individuals: Vec::new(),
            unclustered: Vec::new(),
        }
    }

    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self::new(settings.center(), settings.cluster)
    }

    /// Nodes skipped on the last tick because their parent could not be resolved
    pub fn unclustered(&self) -> &[usize] {
        &self.unclustered
    }

    /// Slot angle of the `slot`-th of `count` departments
    pub fn department_angle(slot: usize, count: usize) -> f32 {
        TAU * slot as f32 / count as f32
    }

    /// Angle of the `slot`-th of `count` siblings around their parent's angle
    pub fn sibling_angle(&self, parent_angle: f32, slot: usize, count: usize) -> f32 {
        let fraction = (slot as f32 + 0.5) / count as f32 - 0.5;
        parent_angle + self.settings.angular_window * fraction
    }

    /// Parent of `index` if it still resolves to a node one level up
    fn resolve_parent(graph: &OrgGraph, index: usize) -> Option<usize> {
        let parent = graph.parent_of(index)?;
        let expected = graph.nodes()[index].level.parent_level()?;
        let node = graph.nodes().get(parent)?;
        (node.level == expected).then_some(parent)
    }

    fn angle_from_center(&self, pos: Pos2) -> f32 {
        (pos - self.center).angle()
    }

    fn pull(&self, deltas: &mut [Vec2], index: usize, from: Pos2, target: Pos2, coefficient: f32) {
        deltas[index] += (target - from) * coefficient;
    }
}

impl Force for ClusterForce {
    fn initialize(&mut self, graph: &OrgGraph) {
        self.departments.clear();
        self.teams.clear();
        self.individuals.clear();
        for (i, node) in graph.nodes().iter().enumerate() {
            match node.level {
                Level::Department => self.departments.push(i),
                Level::Team => self.teams.push(i),
                Level::Individual => self.individuals.push(i),
            }
        }
    }

    fn apply(&mut self, graph: &OrgGraph, alpha: f32, deltas: &mut [Vec2]) {
        let nodes = graph.nodes();
        let k = self.settings.strength * alpha;
        let factor = self.settings.level_factor;
        self.unclustered.clear();

        let count = self.departments.len();
        for (slot, &i) in self.departments.iter().enumerate() {
            let angle = Self::department_angle(slot, count);
            let target = self.center + Vec2::angled(angle) * self.settings.department_radius;
            self.pull(deltas, i, nodes[i].pos, target, k * factor.department);
        }

        // Group teams by their resolved department, keeping node order
        let mut siblings: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut parents: Vec<usize> = Vec::new();
        for &t in &self.teams {
            match Self::resolve_parent(graph, t) {
                Some(p) => {
                    if siblings[p].is_empty() {
                        parents.push(p);
                    }
                    siblings[p].push(t);
                }
                None => self.unclustered.push(t),
            }
        }
        for &p in &parents {
            let parent_angle = self.angle_from_center(nodes[p].pos);
            let group = &siblings[p];
            for (slot, &t) in group.iter().enumerate() {
                let angle = self.sibling_angle(parent_angle, slot, group.len());
                let target = self.center + Vec2::angled(angle) * self.settings.team_radius;
                self.pull(deltas, t, nodes[t].pos, target, k * factor.team);
            }
        }

        for &i in &self.individuals {
            let Some(p) = Self::resolve_parent(graph, i) else {
                self.unclustered.push(i);
                continue;
            };
            let team = nodes[p].pos;
            let outward = Vec2::angled(self.angle_from_center(team));
            let target = team + outward * self.settings.individual_offset;
            self.pull(deltas, i, nodes[i].pos, target, k * factor.individual);
        }

        if !self.unclustered.is_empty() {
            tracing::trace!(
                "Cluster force skipped {} node(s) with unresolved parents",
                self.unclustered.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{LinkRecord, NodeRecord, OrgChartDocument, RawLevel};
    use float_cmp::assert_approx_eq;

    fn record(id: &str, level: &str, parent: Option<&str>) -> NodeRecord {
        NodeRecord {
            id: id.into(),
            level: RawLevel::Text(level.into()),
            parent: parent.map(Into::into),
            group: None,
            tooltip: None,
        }
    }

    fn build(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>) -> OrgGraph {
        OrgGraph::from_document(&OrgChartDocument { nodes, links }, &LayoutSettings::default())
            .unwrap()
    }

    fn apply(force: &mut ClusterForce, graph: &OrgGraph, alpha: f32) -> Vec<Vec2> {
        force.initialize(graph);
        let mut deltas = vec![Vec2::ZERO; graph.len()];
        force.apply(graph, alpha, &mut deltas);
        deltas
    }

    #[test]
    fn test_department_slots_are_evenly_spaced() {
        assert_approx_eq!(f32, ClusterForce::department_angle(0, 4), 0.0);
        assert_approx_eq!(f32, ClusterForce::department_angle(1, 4), TAU / 4.0);
        assert_approx_eq!(f32, ClusterForce::department_angle(3, 4), 3.0 * TAU / 4.0);
    }

    #[test]
    fn test_siblings_fill_window_around_parent() {
        let force = ClusterForce::from_settings(&LayoutSettings::default());
        let window = ClusterSettings::default().angular_window;
        assert_approx_eq!(f32, force.sibling_angle(1.0, 0, 1), 1.0);
        let a = force.sibling_angle(1.0, 0, 2);
        let b = force.sibling_angle(1.0, 1, 2);
        assert_approx_eq!(f32, a, 1.0 - window / 4.0, epsilon = 1e-6);
        assert_approx_eq!(f32, b, 1.0 + window / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_department_pulled_toward_its_slot() {
        let mut graph = build(vec![record("D", "1", None)], vec![]);
        let settings = LayoutSettings::default();
        let center = settings.center();
        graph.nodes_mut()[0].pos = center;

        let mut force = ClusterForce::from_settings(&settings);
        let deltas = apply(&mut force, &graph, 0.5);
        // Slot 0 lies on the +x axis at the department radius
        assert_approx_eq!(f32, deltas[0].x, 0.5 * settings.cluster.department_radius, epsilon = 1e-3);
        assert_approx_eq!(f32, deltas[0].y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_individual_targets_point_outside_team() {
        let mut graph = build(
            vec![
                record("D", "1", None),
                record("T", "2", Some("D")),
                record("I", "3", Some("T")),
            ],
            vec![],
        );
        let settings = LayoutSettings::default();
        let center = settings.center();
        let team_pos = center + Vec2::new(0.0, 300.0);
        graph.nodes_mut()[1].pos = team_pos;
        graph.nodes_mut()[2].pos = team_pos;

        let mut force = ClusterForce::from_settings(&settings);
        let deltas = apply(&mut force, &graph, 1.0);
        let expected = Vec2::new(0.0, settings.cluster.individual_offset)
            * settings.cluster.level_factor.individual;
        assert_approx_eq!(f32, deltas[2].x, expected.x, epsilon = 1e-3);
        assert_approx_eq!(f32, deltas[2].y, expected.y, epsilon = 1e-3);
        assert!(force.unclustered().is_empty());
    }

    #[test]
    fn test_unresolved_parents_are_skipped_not_fatal() {
        let mut graph = build(
            vec![
                record("D", "1", None),
                record("T", "2", None),
                record("U", "2", None),
                record("I", "3", None),
            ],
            vec![
                LinkRecord {
                    source: "D".into(),
                    target: "T".into(),
                    relationship: None,
                },
                LinkRecord {
                    source: "T".into(),
                    target: "I".into(),
                    relationship: None,
                },
            ],
        );
        // Orphan the team after construction; its individual keeps a parent
        graph.reparent("T", None).unwrap();

        let mut force = ClusterForce::from_settings(&LayoutSettings::default());
        let deltas = apply(&mut force, &graph, 1.0);

        let t = graph.index_of("T").unwrap();
        let u = graph.index_of("U").unwrap();
        let i = graph.index_of("I").unwrap();
        assert_eq!(force.unclustered(), &[t, u]);
        assert_eq!(deltas[t], Vec2::ZERO);
        assert_eq!(deltas[u], Vec2::ZERO);
        assert_ne!(deltas[i], Vec2::ZERO);
    }
}
