//! Org chart entity model and force-directed layout engine.

pub mod cluster;
pub mod drag;
pub mod forces;
pub mod quadtree;
pub mod simulation;
pub mod types;


pub use cluster::ClusterForce;
pub use drag::{pick, DragController, DragState};
pub use forces::{Axis, AxisForce, CenterForce, CollideForce, Force, LinkForce, ManyBodyForce};
pub use simulation::{ListenerId, Simulation, Tick};
pub use types::{
    Level, Link, LinkKind, LinkRecord, LinkSegment, Node, NodeRecord, OrgChartDocument, OrgGraph,
    RawLevel,
};
