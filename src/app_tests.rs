use super::*;
use float_cmp::assert_approx_eq;
use orgchart_native::graph::{LinkRecord, NodeRecord, OrgChartDocument, RawLevel};

fn diagram() -> Rect {
    Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0))
}

#[test]
fn fit_preserves_aspect_and_centers() {
    let screen = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(632.0, 832.0));
    let t = ScreenTransform::fit(diagram(), screen);
    // Width is the limiting dimension: 600 / 1200
    assert_approx_eq!(f32, t.scale, 0.5);
    let center = t.to_screen(diagram().center());
    assert_approx_eq!(f32, center.x, screen.center().x, epsilon = 1e-3);
    assert_approx_eq!(f32, center.y, screen.center().y, epsilon = 1e-3);
}

#[test]
fn screen_and_diagram_space_invert() {
    let t = ScreenTransform::fit(diagram(), Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 700.0)));
    let p = Pos2::new(321.0, 654.0);
    let back = t.to_diagram(t.to_screen(p));
    assert_approx_eq!(f32, back.x, p.x, epsilon = 1e-3);
    assert_approx_eq!(f32, back.y, p.y, epsilon = 1e-3);
}

#[test]
fn segment_distance_clamps_to_endpoints() {
    let a = Pos2::new(0.0, 0.0);
    let b = Pos2::new(10.0, 0.0);
    assert_approx_eq!(f32, distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
    assert_approx_eq!(f32, distance_to_segment(Pos2::new(-4.0, 3.0), a, b), 5.0);
    assert_approx_eq!(f32, distance_to_segment(Pos2::new(1.0, 1.0), a, a), 2f32.sqrt());
}

#[test]
fn hovered_link_finds_relationship() {
    let node = |id: &str| NodeRecord {
        id: id.into(),
        level: RawLevel::Text("1".into()),
        parent: None,
        group: None,
        tooltip: None,
    };
    let doc = OrgChartDocument {
        nodes: vec![node("A"), node("B")],
        links: vec![LinkRecord {
            source: "A".into(),
            target: "B".into(),
            relationship: Some("Partners".into()),
        }],
    };
    let graph = OrgGraph::from_document(&doc, &LayoutSettings::default()).unwrap();
    let a = graph.nodes()[0].pos;
    let b = graph.nodes()[1].pos;
    let normal = (b - a).normalized().rot90();

    let t = ScreenTransform {
        scale: 1.0,
        offset: Vec2::ZERO,
    };
    let midpoint = a + (b - a) * 0.5;
    assert_eq!(hovered_link(&graph, t, midpoint + normal * 2.0), Some(0));
    assert_eq!(hovered_link(&graph, t, midpoint + normal * 50.0), None);
}

fn org_app() -> OrgChartApp {
    let node = |id: &str, level: &str, parent: Option<&str>| NodeRecord {
        id: id.into(),
        level: RawLevel::Text(level.into()),
        parent: parent.map(Into::into),
        group: None,
        tooltip: None,
    };
    let link = |source: &str, target: &str| LinkRecord {
        source: source.into(),
        target: target.into(),
        relationship: None,
    };
    let doc = OrgChartDocument {
        nodes: vec![node("D", "1", None), node("T", "2", Some("D")), node("I", "3", Some("T"))],
        links: vec![link("D", "T"), link("T", "I")],
    };
    let settings = LayoutSettings::default();
    let graph = OrgGraph::from_document(&doc, &settings).unwrap();
    let mut app = OrgChartApp::with_graph(graph, settings);
    app.sim.run(1000);
    assert!(app.sim.is_settled());
    app
}

fn frame(ctx: &egui::Context, app: &mut OrgChartApp, time: f64, events: Vec<egui::Event>) {
    let input = egui::RawInput {
        screen_rect: Some(diagram()),
        time: Some(time),
        events,
        ..Default::default()
    };
    let _ = ctx.run(input, |ctx| app.show(ctx));
}

fn button(pos: Pos2, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed,
        modifiers: egui::Modifiers::NONE,
    }
}

#[test]
fn quick_flick_still_pins_the_pressed_node() {
    let mut app = org_app();
    let ctx = egui::Context::default();
    let individual = app.sim.graph().index_of("I").unwrap();

    // Warm-up frame so the diagram widget exists for hit testing
    frame(&ctx, &mut app, 0.0, vec![]);
    let transform = ScreenTransform::fit(app.diagram_rect(), diagram());
    let on_node = transform.to_screen(app.sim.graph().nodes()[individual].pos);

    frame(&ctx, &mut app, 0.02, vec![egui::Event::PointerMoved(on_node), button(on_node, true)]);
    // One frame jump well beyond the node's on-screen radius
    let flicked = on_node + Vec2::new(20.0, 0.0);
    frame(&ctx, &mut app, 0.04, vec![egui::Event::PointerMoved(flicked)]);

    assert_eq!(app.drag.dragged_node(), Some(individual));
    assert!(app.sim.graph().nodes()[individual].is_pinned());

    frame(&ctx, &mut app, 0.06, vec![button(flicked, false)]);
    assert_eq!(app.drag.dragged_node(), None);
    assert!(!app.sim.graph().nodes()[individual].is_pinned());
}

#[test]
fn drag_from_empty_space_pins_nothing() {
    let mut app = org_app();
    let ctx = egui::Context::default();
    frame(&ctx, &mut app, 0.0, vec![]);

    let corner = Pos2::new(20.0, 20.0);
    frame(&ctx, &mut app, 0.02, vec![egui::Event::PointerMoved(corner), button(corner, true)]);
    frame(&ctx, &mut app, 0.04, vec![egui::Event::PointerMoved(corner + Vec2::new(30.0, 30.0))]);
    assert_eq!(app.drag.dragged_node(), None);
}
