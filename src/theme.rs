//! Color constants for the org chart viewer.
//!
//! Group colors follow the fixed palette used for the four known business
//! groups; anything else falls back to neutral grey.

use egui::Color32;
use orgchart_native::graph::{Level, LinkKind};

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Diagram area background
    pub const DIAGRAM: Color32 = Color32::from_rgb(14, 17, 23);

    /// Tooltip backdrop
    pub const TOOLTIP: Color32 = Color32::from_rgba_premultiplied(18, 18, 27, 230);
}

/// Node fill colors keyed by group label
pub mod group {
    use super::*;

    pub const ENGINEERING: Color32 = Color32::from_rgb(0x42, 0x85, 0xF4);
    pub const PRODUCT_MANAGEMENT: Color32 = Color32::from_rgb(0x0F, 0x9D, 0x58);
    pub const GOVERNANCE: Color32 = Color32::from_rgb(0xDB, 0x44, 0x37);
    pub const SALES: Color32 = Color32::from_rgb(0xF4, 0xB4, 0x00);
    pub const FALLBACK: Color32 = Color32::from_rgb(0x9E, 0x9E, 0x9E);
}

pub mod text {
    use super::*;

    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// Link colors
pub mod link {
    use super::*;

    pub const STRUCTURAL: Color32 = Color32::from_rgb(90, 95, 110);
    pub const RELATIONSHIP: Color32 = Color32::from_rgb(6, 182, 212);
    pub const HOVER: Color32 = Color32::WHITE;
}

/// Node outline colors
pub mod outline {
    use super::*;

    pub const HOVER: Color32 = Color32::WHITE;
    /// Pinned (dragged) node
    pub const PINNED: Color32 = Color32::from_rgb(255, 220, 80);
}

/// Fill color for a node group
pub fn group_color(group: Option<&str>) -> Color32 {
    match group {
        Some("Engineering") => group::ENGINEERING,
        Some("Product Management") => group::PRODUCT_MANAGEMENT,
        Some("Governance") => group::GOVERNANCE,
        Some("Sales") => group::SALES,
        _ => group::FALLBACK,
    }
}

/// Stroke width and color for a link
pub fn link_stroke(kind: LinkKind, hovered: bool) -> egui::Stroke {
    let (width, color) = match kind {
        LinkKind::Structural => (1.0, link::STRUCTURAL),
        LinkKind::Relationship => (2.0, link::RELATIONSHIP),
    };
    if hovered {
        egui::Stroke::new(width + 1.0, link::HOVER)
    } else {
        egui::Stroke::new(width, color)
    }
}

/// Label font size; departments get the largest labels
pub fn label_size(level: Level) -> f32 {
    match level {
        Level::Department => 14.0,
        Level::Team => 12.0,
        Level::Individual => 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_groups_use_palette() {
        assert_eq!(group_color(Some("Engineering")), Color32::from_rgb(66, 133, 244));
        assert_eq!(group_color(Some("Sales")), group::SALES);
        assert_eq!(group_color(Some("Governance")), group::GOVERNANCE);
        assert_eq!(group_color(Some("Product Management")), group::PRODUCT_MANAGEMENT);
    }

    #[test]
    fn test_unknown_group_falls_back_to_grey() {
        assert_eq!(group_color(None), group::FALLBACK);
        assert_eq!(group_color(Some("engineering")), group::FALLBACK);
    }

    #[test]
    fn test_relationship_links_are_thicker() {
        let structural = link_stroke(LinkKind::Structural, false);
        let relationship = link_stroke(LinkKind::Relationship, false);
        assert!(relationship.width > structural.width);
        assert_eq!(link_stroke(LinkKind::Structural, true).color, link::HOVER);
    }
}
