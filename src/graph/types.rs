//! Org chart data types: the input document and the runtime entity model.

use crate::error::{OrgChartError, Result};
use crate::settings::LayoutSettings;
use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Hierarchy level of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Department = 1,
    Team = 2,
    Individual = 3,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Department, Level::Team, Level::Individual];

    /// Numeric value as used in the data format
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Level a parent of this level must have
    pub fn parent_level(self) -> Option<Level> {
        match self {
            Level::Department => None,
            Level::Team => Some(Level::Department),
            Level::Individual => Some(Level::Team),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Department => "Department",
            Level::Team => "Team",
            Level::Individual => "Individual",
        }
    }

    fn from_raw(id: &str, raw: &RawLevel) -> Result<Self> {
        let text = raw.to_string();
        match text.as_str() {
            "1" => Ok(Level::Department),
            "2" => Ok(Level::Team),
            "3" => Ok(Level::Individual),
            _ => Err(OrgChartError::UnknownLevel {
                id: id.to_string(),
                level: text,
            }),
        }
    }
}

/// Level as it appears in the document: usually a string, sometimes a bare number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLevel::Text(s) => f.write_str(s),
            RawLevel::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<Level> for RawLevel {
    fn from(level: Level) -> Self {
        RawLevel::Text(level.number().to_string())
    }
}

/// A node entry in the input document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRecord {
    pub id: String,
    pub level: RawLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// A link entry in the input document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// The complete input document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrgChartDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// A node in the simulation
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub level: Level,
    /// Category label, only used for coloring
    pub group: Option<String>,
    /// Parent id as declared in the document
    pub parent: Option<String>,
    pub tooltip: Option<String>,
    pub pos: Pos2,
    pub vel: Vec2,
    pin: Option<Pos2>,
}

impl Node {
    /// Fixed position set by the drag controller, if any
    pub fn pin(&self) -> Option<Pos2> {
        self.pin
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub(crate) fn set_pin(&mut self, pin: Option<Pos2>) {
        self.pin = pin;
    }
}

/// Kind of a link, derived from the presence of a relationship label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Parent -> child edge implied by the hierarchy
    Structural,
    /// Additional labelled edge, e.g. department to department
    Relationship,
}

/// A link between two nodes, endpoints resolved to node indices
#[derive(Debug, Clone)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub relationship: Option<String>,
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        if self.relationship.is_some() {
            LinkKind::Relationship
        } else {
            LinkKind::Structural
        }
    }
}

/// Link with endpoint positions resolved, handed to the renderer
#[derive(Debug, Clone, Copy)]
pub struct LinkSegment<'a> {
    pub source: Pos2,
    pub target: Pos2,
    pub link: &'a Link,
}

/// Runtime org chart: nodes, links and the lookups built from them
#[derive(Debug, Clone)]
pub struct OrgGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    /// Node index lookup (id -> index in nodes)
    node_index: HashMap<String, usize>,
    /// Parent index (child index -> parent index)
    parent_index: Vec<Option<usize>>,
    /// Nodes explicitly detached from the hierarchy after construction
    detached: Vec<bool>,
}

impl OrgGraph {
    /// Validate a document and build the entity model, placing nodes with a
    /// seeded RNG inside the canvas bounds.
    pub fn from_document(doc: &OrgChartDocument, settings: &LayoutSettings) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut nodes = Vec::with_capacity(doc.nodes.len());
        let mut node_index = HashMap::with_capacity(doc.nodes.len());

        for record in &doc.nodes {
            let level = Level::from_raw(&record.id, &record.level)?;
            if node_index.insert(record.id.clone(), nodes.len()).is_some() {
                return Err(OrgChartError::DuplicateNode(record.id.clone()));
            }

            let x = rng.gen_range(0.0..settings.width.max(1.0));
            let y = rng.gen_range(0.0..settings.height.max(1.0));
            nodes.push(Node {
                id: record.id.clone(),
                level,
                group: record.group.clone(),
                parent: record.parent.clone(),
                tooltip: record.tooltip.clone(),
                pos: Pos2::new(x, y),
                vel: Vec2::ZERO,
                pin: None,
            });
        }

        let mut links = Vec::with_capacity(doc.links.len());
        for record in &doc.links {
            let resolve = |id: &String| {
                node_index
                    .get(id)
                    .copied()
                    .ok_or_else(|| OrgChartError::UnknownLinkEndpoint {
                        source_id: record.source.clone(),
                        target_id: record.target.clone(),
                        missing: id.clone(),
                    })
            };
            links.push(Link {
                source: resolve(&record.source)?,
                target: resolve(&record.target)?,
                relationship: record.relationship.clone(),
            });
        }

        let mut graph = Self {
            detached: vec![false; nodes.len()],
            nodes,
            links,
            node_index,
            parent_index: Vec::new(),
        };
        graph.rebuild_parent_index()?;

        tracing::info!(
            "Built org graph: {} nodes, {} links, {} with a parent",
            graph.nodes.len(),
            graph.links.len(),
            graph.parent_index.iter().filter(|p| p.is_some()).count()
        );

        Ok(graph)
    }

    /// Rebuild the child -> parent index.
    ///
    /// An explicit `parent` wins; otherwise the first structural link joining
    /// the node to a node one level up is used.
    fn rebuild_parent_index(&mut self) -> Result<()> {
        let mut index = vec![None; self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            let Some(parent_id) = &node.parent else {
                continue;
            };
            let Some(expected) = node.level.parent_level() else {
                return Err(OrgChartError::UnexpectedParent {
                    id: node.id.clone(),
                    parent: parent_id.clone(),
                });
            };
            let &p = self
                .node_index
                .get(parent_id)
                .ok_or_else(|| OrgChartError::UnknownParent {
                    id: node.id.clone(),
                    parent: parent_id.clone(),
                })?;
            let parent_level = self.nodes[p].level;
            if parent_level != expected {
                return Err(OrgChartError::ParentLevelMismatch {
                    id: node.id.clone(),
                    level: node.level.number(),
                    parent: parent_id.clone(),
                    parent_level: parent_level.number(),
                });
            }
            index[i] = Some(p);
        }

        for link in self.links.iter().filter(|l| l.kind() == LinkKind::Structural) {
            for (child, parent) in [(link.target, link.source), (link.source, link.target)] {
                let child_node = &self.nodes[child];
                if index[child].is_some() || child_node.parent.is_some() || self.detached[child] {
                    continue;
                }
                if child_node.level.parent_level() == Some(self.nodes[parent].level) {
                    index[child] = Some(parent);
                }
            }
        }

        self.parent_index = index;
        Ok(())
    }

    /// Move a node under a different parent (or detach it with `None`),
    /// revalidating and rebuilding the parent index.
    pub fn reparent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        let i = self
            .index_of(id)
            .ok_or_else(|| OrgChartError::UnknownNode(id.to_string()))?;
        let previous = (self.nodes[i].parent.clone(), self.detached[i]);
        self.nodes[i].parent = parent.map(str::to_string);
        // Explicit detach also drops the structural-link fallback
        self.detached[i] = parent.is_none();

        if let Err(e) = self.rebuild_parent_index() {
            (self.nodes[i].parent, self.detached[i]) = previous;
            self.rebuild_parent_index()?;
            return Err(e);
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of a node by id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Get the position of a node
    pub fn get_pos(&self, id: &str) -> Option<Pos2> {
        self.get_node(id).map(|n| n.pos)
    }

    /// Resolved parent of the node at `index`
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.parent_index.get(index).copied().flatten()
    }

    /// Links with their current endpoint positions
    pub fn link_segments(&self) -> impl Iterator<Item = LinkSegment<'_>> + '_ {
        self.links.iter().map(move |link| LinkSegment {
            source: self.nodes[link.source].pos,
            target: self.nodes[link.target].pos,
            link,
        })
    }

    /// Convert back to the document shape (levels normalized to strings)
    pub fn to_document(&self) -> OrgChartDocument {
        OrgChartDocument {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    id: n.id.clone(),
                    level: n.level.into(),
                    parent: n.parent.clone(),
                    group: n.group.clone(),
                    tooltip: n.tooltip.clone(),
                })
                .collect(),
            links: self
                .links
                .iter()
                .map(|l| LinkRecord {
                    source: self.nodes[l.source].id.clone(),
                    target: self.nodes[l.target].id.clone(),
                    relationship: l.relationship.clone(),
                })
                .collect(),
        }
    }
}
