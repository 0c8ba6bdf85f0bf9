//! Barnes-Hut quadtree for O(n log n) many-body evaluation.
//!
//! Distant groups of nodes are folded into one pseudo-body at their
//! charge-weighted center. Leaves hold every body that landed in them, so
//! coincident nodes are never dropped.

use egui::{Pos2, Vec2};

/// Recursion depth after which bodies share a leaf instead of splitting further
const MAX_DEPTH: u32 = 32;

/// A charged body: node index, position and many-body strength
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub index: usize,
    pub pos: Pos2,
    pub strength: f32,
}

/// A node in the quadtree
#[derive(Debug, Default)]
pub enum QuadNode {
    #[default]
    Empty,
    Leaf { bodies: Vec<Body> },
    Internal {
        /// Charge-weighted center of all bodies in this cell
        center: Pos2,
        /// Sum of |strength|, used as the weighting
        weight: f32,
        /// Sum of signed strength
        strength: f32,
        /// Children: NW, NE, SW, SE
        children: Box<[QuadNode; 4]>,
    },
}

impl QuadNode {
    fn summary(&self) -> Option<(Pos2, f32, f32)> {
        match self {
            QuadNode::Empty => None,
            QuadNode::Leaf { bodies } => {
                let weight: f32 = bodies.iter().map(|b| b.strength.abs()).sum();
                let strength: f32 = bodies.iter().map(|b| b.strength).sum();
                let center = weighted_center(bodies.iter().map(|b| (b.pos, b.strength.abs())));
                Some((center, weight, strength))
            }
            QuadNode::Internal {
                center,
                weight,
                strength,
                ..
            } => Some((*center, *weight, *strength)),
        }
    }
}

fn weighted_center(points: impl Iterator<Item = (Pos2, f32)>) -> Pos2 {
    let mut sum = Vec2::ZERO;
    let mut total = 0.0;
    let mut plain = Vec2::ZERO;
    let mut count = 0.0;
    for (pos, w) in points {
        sum += pos.to_vec2() * w;
        total += w;
        plain += pos.to_vec2();
        count += 1.0;
    }
    if total > 0.0 {
        (sum / total).to_pos2()
    } else if count > 0.0 {
        (plain / count).to_pos2()
    } else {
        Pos2::ZERO
    }
}

/// Axis-aligned square cell
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Pos2,
    pub max: Pos2,
}

impl Bounds {
    pub fn new(min: Pos2, max: Pos2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn size(&self) -> f32 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }

    /// Get the quadrant for a position (0=NW, 1=NE, 2=SW, 3=SE)
    pub fn quadrant(&self, pos: Pos2) -> usize {
        let center = self.center();
        let east = pos.x >= center.x;
        let south = pos.y >= center.y;
        match (south, east) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => 3,
        }
    }

    /// Get bounds for a specific quadrant
    pub fn child_bounds(&self, quadrant: usize) -> Bounds {
        let center = self.center();
        match quadrant {
            0 => Bounds::new(self.min, center),
            1 => Bounds::new(Pos2::new(center.x, self.min.y), Pos2::new(self.max.x, center.y)),
            2 => Bounds::new(Pos2::new(self.min.x, center.y), Pos2::new(center.x, self.max.y)),
            _ => Bounds::new(center, self.max),
        }
    }
}

/// Barnes-Hut quadtree over charged bodies
pub struct Quadtree {
    pub root: QuadNode,
    pub bounds: Bounds,
    /// Cell size / distance threshold below which a cell is approximated
    pub theta: f32,
}

impl Quadtree {
    pub fn build(bodies: &[Body], theta: f32) -> Self {
        if bodies.is_empty() {
            return Self {
                root: QuadNode::Empty,
                bounds: Bounds::new(Pos2::ZERO, Pos2::ZERO),
                theta,
            };
        }

        let mut min = Pos2::new(f32::MAX, f32::MAX);
        let mut max = Pos2::new(f32::MIN, f32::MIN);
        for body in bodies {
            min = min.min(body.pos);
            max = max.max(body.pos);
        }

        // Pad and make square
        let padding = 1.0;
        min -= Vec2::splat(padding);
        max += Vec2::splat(padding);
        let size = (max.x - min.x).max(max.y - min.y);
        let bounds = Bounds::new(min, min + Vec2::splat(size));

        let mut tree = Self {
            root: QuadNode::Empty,
            bounds,
            theta,
        };
        for &body in bodies {
            tree.insert(body);
        }
        tree
    }

    pub fn insert(&mut self, body: Body) {
        self.root = Self::insert_into(std::mem::take(&mut self.root), body, self.bounds, 0);
    }

    fn insert_into(node: QuadNode, body: Body, bounds: Bounds, depth: u32) -> QuadNode {
        match node {
            QuadNode::Empty => QuadNode::Leaf { bodies: vec![body] },

            QuadNode::Leaf { mut bodies } => {
                let coincident = bodies.iter().all(|b| b.pos == body.pos);
                if coincident || depth >= MAX_DEPTH {
                    bodies.push(body);
                    return QuadNode::Leaf { bodies };
                }

                let mut children: Box<[QuadNode; 4]> = Box::default();
                for existing in bodies {
                    let q = bounds.quadrant(existing.pos);
                    children[q] = Self::insert_into(
                        std::mem::take(&mut children[q]),
                        existing,
                        bounds.child_bounds(q),
                        depth + 1,
                    );
                }
                let q = bounds.quadrant(body.pos);
                children[q] = Self::insert_into(
                    std::mem::take(&mut children[q]),
                    body,
                    bounds.child_bounds(q),
                    depth + 1,
                );
                Self::internal(children)
            }

            QuadNode::Internal { mut children, .. } => {
                let q = bounds.quadrant(body.pos);
                children[q] = Self::insert_into(
                    std::mem::take(&mut children[q]),
                    body,
                    bounds.child_bounds(q),
                    depth + 1,
                );
                Self::internal(children)
            }
        }
    }

    fn internal(children: Box<[QuadNode; 4]>) -> QuadNode {
        let summaries: Vec<_> = children.iter().filter_map(QuadNode::summary).collect();
        let weight = summaries.iter().map(|s| s.1).sum();
        let strength = summaries.iter().map(|s| s.2).sum();
        let center = weighted_center(summaries.iter().map(|s| (s.0, s.1)));
        QuadNode::Internal {
            center,
            weight,
            strength,
            children,
        }
    }

    /// Velocity delta (before alpha scaling) on body `index` at `pos`.
    pub fn calculate_force(&self, index: usize, pos: Pos2, distance_min: f32) -> Vec2 {
        self.calculate_force_recursive(&self.root, index, pos, distance_min, self.bounds)
    }

    fn calculate_force_recursive(
        &self,
        node: &QuadNode,
        index: usize,
        pos: Pos2,
        distance_min: f32,
        bounds: Bounds,
    ) -> Vec2 {
        match node {
            QuadNode::Empty => Vec2::ZERO,

            QuadNode::Leaf { bodies } => bodies
                .iter()
                .filter(|b| b.index != index)
                .map(|b| charge_between(index, pos, b.index, b.pos, b.strength, distance_min))
                .fold(Vec2::ZERO, |acc, f| acc + f),

            QuadNode::Internal {
                center,
                strength,
                children,
                ..
            } => {
                let delta = *center - pos;
                let distance = delta.length().max(distance_min);

                if bounds.size() / distance < self.theta && delta != Vec2::ZERO {
                    (delta / delta.length()) * (*strength / (distance * distance))
                } else {
                    let mut force = Vec2::ZERO;
                    for (i, child) in children.iter().enumerate() {
                        force += self.calculate_force_recursive(
                            child,
                            index,
                            pos,
                            distance_min,
                            bounds.child_bounds(i),
                        );
                    }
                    force
                }
            }
        }
    }
}

/// Delta on node `i` from node `j`: `strength_j / d²` along the line between
/// them. Negative strength pushes `i` away. Coincident nodes are separated
/// along a deterministic direction derived from their indices.
pub fn charge_between(
    i: usize,
    pos_i: Pos2,
    j: usize,
    pos_j: Pos2,
    strength_j: f32,
    distance_min: f32,
) -> Vec2 {
    let delta = pos_j - pos_i;
    let length = delta.length();
    let direction = if length > f32::EPSILON {
        delta / length
    } else {
        coincident_direction(i, j)
    };
    let distance = length.max(distance_min).max(f32::EPSILON);
    direction * (strength_j / (distance * distance))
}

/// Unit vector from `i` toward `j` for two nodes sharing a position.
/// Antisymmetric in its arguments so the pair separates.
pub fn coincident_direction(i: usize, j: usize) -> Vec2 {
    const GOLDEN_ANGLE: f32 = 2.399_963;
    let (lo, hi) = (i.min(j), i.max(j));
    let v = Vec2::angled((lo * 31 + hi) as f32 * GOLDEN_ANGLE);
    if i < j {
        v
    } else {
        -v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(index: usize, x: f32, y: f32) -> Body {
        Body {
            index,
            pos: Pos2::new(x, y),
            strength: -1000.0,
        }
    }

    #[test]
    fn test_quadtree_build() {
        let bodies = vec![
            body(0, 0.0, 0.0),
            body(1, 100.0, 0.0),
            body(2, 0.0, 100.0),
            body(3, 100.0, 100.0),
        ];
        let tree = Quadtree::build(&bodies, 1.0);

        match &tree.root {
            QuadNode::Internal { strength, .. } => assert_eq!(*strength, -4000.0),
            _ => panic!("Expected internal node"),
        }
    }

    #[test]
    fn test_force_calculation() {
        let bodies = vec![body(0, 0.0, 0.0), body(1, 100.0, 0.0)];
        let tree = Quadtree::build(&bodies, 1.0);

        // Repulsion should push the first body left, away from the second
        let force = tree.calculate_force(0, Pos2::new(0.0, 0.0), 1.0);
        assert!(force.x < 0.0, "Force should push left: {:?}", force);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn test_coincident_bodies_are_kept_and_separated() {
        let bodies = vec![body(0, 50.0, 50.0), body(1, 50.0, 50.0), body(2, 80.0, 50.0)];
        let tree = Quadtree::build(&bodies, 0.5);

        let f0 = tree.calculate_force(0, Pos2::new(50.0, 50.0), 10.0);
        let f1 = tree.calculate_force(1, Pos2::new(50.0, 50.0), 10.0);
        assert!(f0.x.is_finite() && f0.y.is_finite());
        // The coincident pair pushes in opposite directions
        let pair = charge_between(0, Pos2::new(50.0, 50.0), 1, Pos2::new(50.0, 50.0), -1000.0, 10.0);
        assert!((pair + charge_between(1, Pos2::new(50.0, 50.0), 0, Pos2::new(50.0, 50.0), -1000.0, 10.0)).length() < 1e-4);
        assert!((f0 - f1).length() > 1.0);
    }

    #[test]
    fn test_matches_exact_sum_for_small_sets() {
        let bodies: Vec<Body> = (0..12)
            .map(|i| body(i, (i % 4) as f32 * 70.0, (i / 4) as f32 * 55.0 + i as f32))
            .collect();
        let exact_tree = Quadtree::build(&bodies, 0.0);
        let approx_tree = Quadtree::build(&bodies, 0.5);

        for b in &bodies {
            let pairs: Vec<Vec2> = bodies
                .iter()
                .filter(|o| o.index != b.index)
                .map(|o| charge_between(b.index, b.pos, o.index, o.pos, o.strength, 1.0))
                .collect();
            let exact = pairs.iter().fold(Vec2::ZERO, |acc, f| acc + *f);
            let scale: f32 = pairs.iter().map(|f| f.length()).sum();

            // theta = 0 never approximates
            let no_approx = exact_tree.calculate_force(b.index, b.pos, 1.0);
            assert!((exact - no_approx).length() <= scale * 1e-4);

            let approx = approx_tree.calculate_force(b.index, b.pos, 1.0);
            assert!(
                (exact - approx).length() <= scale * 0.1,
                "body {}: exact {:?} approx {:?}",
                b.index,
                exact,
                approx
            );
        }
    }
}
