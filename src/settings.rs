//! Layout tunables with documented defaults and JSON persistence.

use crate::error::{OrgChartError, Result};
use crate::graph::types::{Level, LinkKind};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

/// One value per hierarchy level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerLevel<T> {
    pub department: T,
    pub team: T,
    pub individual: T,
}

impl<T: Copy> PerLevel<T> {
    pub fn get(&self, level: Level) -> T {
        match level {
            Level::Department => self.department,
            Level::Team => self.team,
            Level::Individual => self.individual,
        }
    }
}

/// Target link length per link kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDistances {
    /// Structural department -> team edge
    pub team: f32,
    /// Structural team -> individual edge
    pub individual: f32,
    /// Labelled relationship edge, e.g. department -> department
    pub relationship: f32,
}

impl Default for LinkDistances {
    fn default() -> Self {
        Self {
            team: 150.0,
            individual: 60.0,
            relationship: 260.0,
        }
    }
}

impl LinkDistances {
    /// Distance for a link given its kind and the deeper of its endpoint levels
    pub fn for_link(&self, kind: LinkKind, deepest: Level) -> f32 {
        match (kind, deepest) {
            (LinkKind::Relationship, _) => self.relationship,
            (LinkKind::Structural, Level::Individual) => self.individual,
            (LinkKind::Structural, _) => self.team,
        }
    }
}

/// Parameters of the hierarchy clustering force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Angular window (radians) that a department's teams are spread across
    pub angular_window: f32,
    /// Ring radius for departments
    pub department_radius: f32,
    /// Ring radius for teams
    pub team_radius: f32,
    /// Offset of individuals from their team, along the team's angle
    pub individual_offset: f32,
    /// Base pull coefficient `k`
    pub strength: f32,
    /// Multipliers of `k` per level
    pub level_factor: PerLevel<f32>,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            angular_window: PI / 10.0,
            department_radius: 150.0,
            team_radius: 300.0,
            individual_offset: 60.0,
            strength: 1.0,
            level_factor: PerLevel {
                department: 1.0,
                team: 2.0,
                individual: 1.0,
            },
        }
    }
}

/// Weak pull toward fixed axis lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBias {
    pub x: f32,
    pub x_strength: f32,
    pub y: f32,
    pub y_strength: f32,
}

impl AxisBias {
    /// Bias toward the canvas midlines
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            x: width / 2.0,
            x_strength: 0.1,
            y: height / 2.0,
            y_strength: 0.1,
        }
    }
}

/// All layout tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    // Canvas
    pub width: f32,
    pub height: f32,
    /// Seed for initial node placement
    pub seed: u64,

    // Nodes
    pub node_radius: PerLevel<f32>,
    /// Many-body strength per level, negative repels
    pub repulsion: PerLevel<f32>,

    // Forces
    pub link_distance: LinkDistances,
    pub collide_passes: usize,
    pub collide_strength: f32,
    /// Extra gap kept between node discs
    pub collide_padding: f32,
    pub center_strength: f32,
    /// Minimum distance for many-body evaluation
    pub distance_min: f32,
    /// Barnes-Hut accuracy (cell size / distance threshold)
    pub theta: f32,
    /// Node count above which the quadtree approximation kicks in
    pub barnes_hut_min_nodes: usize,
    pub cluster: ClusterSettings,
    pub axis_bias: Option<AxisBias>,

    // Annealing
    pub alpha_min: f32,
    /// Per-step alpha decay; derived from `alpha_min` when unset
    pub alpha_decay: Option<f32>,
    /// Friction: velocity is scaled by `1 - velocity_decay` each step
    pub velocity_decay: f32,
    /// Alpha target held while a node is dragged
    pub drag_alpha_target: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            seed: 42,

            node_radius: PerLevel {
                department: 30.0,
                team: 20.0,
                individual: 10.0,
            },
            repulsion: PerLevel {
                department: -3000.0,
                team: -2000.0,
                individual: -1000.0,
            },

            link_distance: LinkDistances::default(),
            collide_passes: 3,
            collide_strength: 1.0,
            collide_padding: 2.0,
            center_strength: 0.1,
            distance_min: 10.0,
            theta: 0.9,
            barnes_hut_min_nodes: 200,
            cluster: ClusterSettings::default(),
            axis_bias: None,

            alpha_min: 0.001,
            alpha_decay: None,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

impl LayoutSettings {
    /// Diagram center
    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Alpha decay, defaulting to reaching `alpha_min` in 300 steps
    pub fn alpha_decay(&self) -> f32 {
        self.alpha_decay
            .unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / 300.0))
    }

    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("orgchart-native");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the platform config dir, returning defaults if the
    /// file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents).map_err(|e| {
            OrgChartError::Settings(format!("failed to parse {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to the platform config dir
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            OrgChartError::Settings("could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| OrgChartError::Settings(format!("failed to serialize: {}", e)))?;
        std::fs::write(path, json)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}
