//! Integration tests for the editing API
//!
//! These run whole documents through parse, edit and regenerate using only
//! the public surface.

use proptest::prelude::*;

use tikzedit::{
    DiagnosticCode, Editor, Placement, config::AppConfig, geometry::Point, move_node, parse,
    regenerate, resize_group,
};

const CLOUD_STACK: &str = include_str!("../../../demos/cloud_stack.tex");
const DEGRADED: &str = include_str!("../../../demos/degraded.tex");

fn position(model: &tikzedit::Model, name: &str) -> Point {
    model
        .node(name)
        .unwrap_or_else(|| panic!("node `{name}` is placed"))
        .position()
}

#[test]
fn test_relative_node_follows_reference() {
    let model = parse(
        r"\node[service] (a) at (0,0) {A}; \node[service, right=of a] (b) {B}; \draw[arrow] (a) -- (b);",
    );

    assert_eq!(position(&model, "a"), Point::new(400.0, 300.0));
    assert_eq!(position(&model, "b"), Point::new(500.0, 300.0));
    assert_eq!(model.connectors().len(), 1);
    assert_eq!(model.connectors()[0].source, "a");
    assert_eq!(model.connectors()[0].target, "b");
    assert!(model.diagnostics().is_empty());
}

#[test]
fn test_undeclared_reference_lands_on_grid() {
    let model = parse(r"\node[above=of y] (x) {X}; \node (z) {Z};");

    let x = model.node("x").expect("x is placed");
    let z = model.node("z").expect("z is placed");
    assert_eq!(x.placement(), Placement::Grid);
    assert_eq!(z.placement(), Placement::Grid);
    assert_ne!(x.position(), z.position());

    let codes: Vec<_> = model
        .diagnostics()
        .iter()
        .filter_map(|diag| diag.code())
        .collect();
    assert_eq!(codes, [DiagnosticCode::W203, DiagnosticCode::W203]);
}

#[test]
fn test_jitter_is_clustered_on_export() {
    let model = parse("\\node (a) at (0,0) {A};\n\\node (b) at (0.02,0) {B};\n");
    assert_eq!(
        regenerate(&model),
        "\\node (a) at (0.00cm,0.00cm) {A};\n\\node (b) at (0.00cm,0.00cm) {B};\n"
    );
}

#[test]
fn test_cloud_stack_resolves_without_fallbacks() {
    let model = parse(CLOUD_STACK);
    assert_eq!(model.nodes().len(), 17);
    assert!(
        model
            .nodes()
            .values()
            .all(|node| !node.placement().is_fallback())
    );
    // openai: above gcp with the vertical offset replaced by the shift.
    let gcp = position(&model, "gcp");
    assert_eq!(position(&model, "openai"), Point::new(gcp.x(), gcp.y() - 25.0));
}

#[test]
fn test_degraded_document_still_yields_a_model() {
    let model = parse(DEGRADED);
    assert_eq!(model.nodes().len(), 8);
    assert_eq!(model.node("worker").map(|n| n.placement()), Some(Placement::LooseMatch));
    assert_eq!(model.node("queue").map(|n| n.placement()), Some(Placement::Connector));
    assert_eq!(model.node("orphan").map(|n| n.placement()), Some(Placement::Grid));
    // `(queue) -- (ghost)` is dropped.
    assert_eq!(model.connectors().len(), 1);

    let out = regenerate(&model);
    assert_eq!(out.matches("\\node").count(), DEGRADED.matches("\\node").count());
}

#[test]
fn test_free_functions_ignore_unknown_names() {
    let model = parse(r"\node (a) at (0,0) {A};");
    let model = move_node(model, "missing", 0.0, 0.0);
    let model = resize_group(model, "missing", Default::default());
    assert_eq!(position(&model, "a"), Point::new(400.0, 300.0));
}

#[test]
fn test_editor_with_custom_config() {
    let config: AppConfig = toml::from_str("[layout]\nright = 3.0\n").expect("valid config");
    let editor = Editor::new(config);
    let model = editor.parse(r"\node (a) at (0,0) {A}; \node[right=of a] (b) {B};");
    assert_eq!(position(&model, "b"), Point::new(550.0, 300.0));
}

#[test]
fn test_reparse_keeps_snap_mode() {
    let editor = Editor::default();
    let mut model = editor.parse(r"\node (a) at (0,0) {A};");
    model.set_snap_to_grid(true);

    let model = editor.reparse(model, r"\node (a) at (1,1) {A};");
    assert!(model.snap_to_grid());
    assert_eq!(position(&model, "a"), Point::new(450.0, 250.0));
}

#[test]
fn test_move_group_through_editor() {
    let editor = Editor::default();
    let mut model = editor.parse(
        r"
        \node (a) at (0,0) {A};
        \node (b) at (0,-4) {B};
        \begin{scope}[on background layer]
            \node[fit=(a)] (g) {G};
        \end{scope}
        ",
    );
    editor
        .try_move_group(&mut model, "g", Point::new(0.0, 200.0))
        .expect("g exists");
    let members: Vec<String> = model
        .group("g")
        .expect("g exists")
        .members()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(members, ["b"]);
    assert!(editor.regenerate(&model).contains("fit=(b)"));
}

fn chain_source(directions: &[usize], order: &[usize]) -> String {
    const KEYWORDS: [&str; 4] = ["above", "below", "left", "right"];
    let declaration = |i: usize| {
        if i == 0 {
            "\\node (n0) at (1,2) {N};\n".to_string()
        } else {
            format!(
                "\\node[{}=of n{}] (n{i}) {{N}};\n",
                KEYWORDS[directions[i - 1]],
                i - 1
            )
        }
    };
    order.iter().map(|&i| declaration(i)).collect()
}

proptest! {
    #[test]
    fn prop_relative_chain_ignores_declaration_order(
        (directions, order) in prop::collection::vec(0usize..4, 1..6).prop_flat_map(|directions| {
            let count = directions.len() + 1;
            (Just(directions), Just((0..count).collect::<Vec<_>>()).prop_shuffle())
        }),
    ) {
        let in_order: Vec<usize> = (0..order.len()).collect();
        let sorted = parse(&chain_source(&directions, &in_order));
        let shuffled = parse(&chain_source(&directions, &order));
        for i in 0..order.len() {
            let name = format!("n{i}");
            prop_assert_eq!(position(&sorted, &name), position(&shuffled, &name));
        }
    }

    #[test]
    fn prop_round_trip_is_stable(
        points in prop::collection::btree_set((-8i32..8, -8i32..8), 1..8),
        followers in prop::collection::vec((0usize..8, prop::bool::ANY), 0..4),
    ) {
        let points: Vec<(i32, i32)> = points.into_iter().collect();
        let mut source = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            source.push_str(&format!("\\node[service] (p{i}) at ({x},{y}) {{P}};\n"));
        }
        for (i, (target, rightwards)) in followers.iter().enumerate() {
            let reference = target % points.len();
            let direction = if *rightwards { "right" } else { "below" };
            source.push_str(&format!("\\node[service, {direction}=of p{reference}] (f{i}) {{F}};\n"));
        }

        let first = parse(&source);
        prop_assert!(first.nodes().values().all(|node| !node.placement().is_fallback()));

        let second = parse(&regenerate(&first));
        prop_assert_eq!(second.nodes().len(), first.nodes().len());
        for node in first.nodes().values() {
            let again = second.nodes()[&node.name()].position();
            prop_assert!(again.distance(node.position()) <= 20.0);
        }
    }
}
