//! Main application state and UI.

use crate::theme;
use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Vec2};
use orgchart_native::graph::{pick, DragController, LinkKind, OrgGraph, Simulation};
use orgchart_native::LayoutSettings;

/// Screen margin kept around the fitted diagram
const MARGIN: f32 = 16.0;

/// Pointer slack when hovering links, in screen pixels
const LINK_HOVER_SLACK: f32 = 4.0;

/// Uniform scale + offset mapping diagram space into a screen rect
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenTransform {
    scale: f32,
    offset: Vec2,
}

impl ScreenTransform {
    /// Fit `diagram` into `screen`, preserving aspect ratio and centering
    fn fit(diagram: Rect, screen: Rect) -> Self {
        let available = screen.shrink(MARGIN);
        let scale = (available.width() / diagram.width())
            .min(available.height() / diagram.height())
            .max(f32::EPSILON);
        let offset = available.center() - diagram.center().to_vec2() * scale;
        Self {
            scale,
            offset: offset.to_vec2(),
        }
    }

    fn to_screen(self, pos: Pos2) -> Pos2 {
        (pos.to_vec2() * self.scale + self.offset).to_pos2()
    }

    fn to_diagram(self, pos: Pos2) -> Pos2 {
        ((pos.to_vec2() - self.offset) / self.scale).to_pos2()
    }
}

/// Shortest distance from `p` to the segment `a`-`b`
fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Index of the link under `pos` (screen space), topmost first
fn hovered_link(graph: &OrgGraph, transform: ScreenTransform, pos: Pos2) -> Option<usize> {
    graph
        .link_segments()
        .enumerate()
        .filter(|(_, s)| {
            let a = transform.to_screen(s.source);
            let b = transform.to_screen(s.target);
            distance_to_segment(pos, a, b) <= LINK_HOVER_SLACK
        })
        .last()
        .map(|(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Hover {
    Node(usize),
    Link(usize),
}

pub struct OrgChartApp {
    sim: Simulation,
    drag: DragController,
    settings: LayoutSettings,
    hovered: Option<Hover>,
}

impl OrgChartApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, graph: OrgGraph, settings: LayoutSettings) -> Self {
        Self::with_graph(graph, settings)
    }

    fn with_graph(graph: OrgGraph, settings: LayoutSettings) -> Self {
        let sim = Simulation::with_default_forces(graph, &settings);
        Self {
            sim,
            drag: DragController::from_settings(&settings),
            settings,
            hovered: None,
        }
    }

    fn diagram_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(self.settings.width, self.settings.height))
    }

    /// Nodes are picked at `press_origin`, where the button went down; by the
    /// time egui reports a drag the pointer is already past its click threshold.
    fn handle_pointer(
        &mut self,
        response: &egui::Response,
        press_origin: Option<Pos2>,
        transform: ScreenTransform,
    ) {
        if response.drag_started() {
            if let Some(pointer) = press_origin.or_else(|| response.interact_pointer_pos()) {
                let pos = transform.to_diagram(pointer);
                if let Some(node) = pick(self.sim.graph(), pos, &self.settings.node_radius) {
                    if let Err(e) = self.drag.press(&mut self.sim, node) {
                        tracing::warn!("Ignoring press: {}", e);
                    }
                }
            }
        }

        if response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.drag.drag_to(&mut self.sim, transform.to_diagram(pointer));
            }
        }

        if response.drag_stopped() {
            self.drag.release(&mut self.sim);
        }
    }

    fn update_hover(&mut self, hover_pos: Option<Pos2>, transform: ScreenTransform) {
        self.hovered = hover_pos.and_then(|pointer| {
            let graph = self.sim.graph();
            pick(graph, transform.to_diagram(pointer), &self.settings.node_radius)
                .map(Hover::Node)
                .or_else(|| hovered_link(graph, transform, pointer).map(Hover::Link))
        });
    }

    fn render_diagram(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let transform = ScreenTransform::fit(self.diagram_rect(), response.rect);

        let press_origin = ui.input(|i| i.pointer.press_origin());
        self.handle_pointer(&response, press_origin, transform);
        self.update_hover(response.hover_pos(), transform);

        if !self.sim.is_settled() {
            self.sim.step();
            ui.ctx().request_repaint();
        }

        let graph = self.sim.graph();

        // Links first so nodes draw over them
        for (i, segment) in graph.link_segments().enumerate() {
            let hovered = self.hovered == Some(Hover::Link(i));
            painter.line_segment(
                [transform.to_screen(segment.source), transform.to_screen(segment.target)],
                theme::link_stroke(segment.link.kind(), hovered),
            );
        }

        for (i, node) in graph.nodes().iter().enumerate() {
            let pos = transform.to_screen(node.pos);
            let radius = self.settings.node_radius.get(node.level) * transform.scale;
            let color = theme::group_color(node.group.as_deref());
            painter.circle_filled(pos, radius, color);

            let border = if node.is_pinned() {
                Stroke::new(2.0, theme::outline::PINNED)
            } else if self.hovered == Some(Hover::Node(i)) {
                Stroke::new(2.0, theme::outline::HOVER)
            } else {
                Stroke::new(1.0, color.gamma_multiply(0.7))
            };
            painter.circle_stroke(pos, radius, border);

            painter.text(
                pos + Vec2::new(0.0, radius + 2.0),
                egui::Align2::CENTER_TOP,
                &node.id,
                egui::FontId::proportional(theme::label_size(node.level) * transform.scale.max(0.5)),
                theme::text::PRIMARY,
            );
        }

        if let (Some(hover), Some(pointer)) = (self.hovered, response.hover_pos()) {
            let text = match hover {
                Hover::Node(i) => {
                    let node = &graph.nodes()[i];
                    match &node.tooltip {
                        Some(tooltip) => format!("{} ({})\n{}", node.id, node.level.label(), tooltip),
                        None => format!("{} ({})", node.id, node.level.label()),
                    }
                }
                Hover::Link(i) => {
                    let link = &graph.links()[i];
                    let nodes = graph.nodes();
                    let label = match link.kind() {
                        LinkKind::Relationship => link.relationship.as_deref().unwrap_or_default(),
                        LinkKind::Structural => "reports to",
                    };
                    format!("{} \u{2192} {}\n{}", nodes[link.source].id, nodes[link.target].id, label)
                }
            };

            let galley = painter.layout_no_wrap(text, egui::FontId::default(), Color32::WHITE);
            let tooltip_pos = pointer + Vec2::new(14.0, 14.0);
            let tooltip_rect = Rect::from_min_size(tooltip_pos, galley.size() + Vec2::splat(16.0));
            painter.rect_filled(tooltip_rect, 4.0, theme::bg::TOOLTIP);
            painter.galley(tooltip_pos + Vec2::splat(8.0), galley, Color32::WHITE);
        }

        painter.text(
            response.rect.left_top() + Vec2::splat(8.0),
            egui::Align2::LEFT_TOP,
            format!("alpha {:.3}  step {}", self.sim.alpha(), self.sim.steps()),
            egui::FontId::monospace(12.0),
            theme::text::MUTED,
        );
    }
}

impl OrgChartApp {
    fn show(&mut self, ctx: &egui::Context) {
        ctx.set_visuals(egui::Visuals::dark());

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::DIAGRAM))
            .show(ctx, |ui| {
                self.render_diagram(ui);
            });
    }
}

impl eframe::App for OrgChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
