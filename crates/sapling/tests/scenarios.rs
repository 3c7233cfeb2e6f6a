//! End-to-end layout scenarios through the facade crate.

use proptest::prelude::*;
use sapling::prelude::*;
use sapling::{LayoutStats, MAX_CACHED_MEASUREMENTS};
use std::cell::Cell;
use std::rc::Rc;

fn node_with_parent(engine: &mut LayoutEngine, parent: NodeId) -> NodeId {
    let id = engine.new_node();
    engine.append_child(parent, id).unwrap();
    id
}

// =============================================================================
// Concrete Scenarios
// =============================================================================

#[test]
fn test_scenario_row_of_three_growing_children() {
    let mut engine = LayoutEngine::new();
    let root = engine.new_node();
    engine.set_width(root, Value::Point(300.0)).unwrap();
    engine.set_flex_direction(root, FlexDirection::Row).unwrap();
    let children: Vec<NodeId> = (0..3)
        .map(|_| {
            let id = node_with_parent(&mut engine, root);
            engine.set_flex_grow(id, 1.0).unwrap();
            id
        })
        .collect();

    engine
        .calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)
        .unwrap();

    let root_layout = engine.layout(root).unwrap();
    assert_eq!(root_layout.width, 300.0);
    assert_eq!(root_layout.height, 0.0);
    for (i, &child) in children.iter().enumerate() {
        let layout = engine.layout(child).unwrap();
        assert_eq!(layout.width, 100.0);
        assert_eq!(layout.height, root_layout.height);
        assert_eq!(layout.left, 100.0 * i as f32);
    }
}

#[test]
fn test_scenario_column_shrinks_overflowing_bases() {
    let mut engine = LayoutEngine::new();
    let root = engine.new_node();
    engine.set_height(root, Value::Point(100.0)).unwrap();
    let children: Vec<NodeId> = (0..2)
        .map(|_| {
            let id = node_with_parent(&mut engine, root);
            engine.set_flex_shrink(id, 1.0).unwrap();
            engine.set_flex_basis(id, Value::Point(80.0)).unwrap();
            id
        })
        .collect();

    engine
        .calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)
        .unwrap();

    for &child in &children {
        assert_eq!(engine.layout(child).unwrap().height, 50.0);
    }
    assert!(engine.layout(root).unwrap().had_overflow);
}

#[test]
fn test_scenario_half_point_rounding() {
    let mut engine = LayoutEngine::with_config(Config::new().with_point_scale_factor(2.0).unwrap());
    let root = engine.new_node();
    engine.set_flex_direction(root, FlexDirection::Row).unwrap();
    engine.set_width(root, Value::Point(100.0)).unwrap();
    engine.set_height(root, Value::Point(100.0)).unwrap();
    let child = node_with_parent(&mut engine, root);
    engine.set_margin(child, Edge::Left, Value::Point(10.3)).unwrap();
    engine.set_width(child, Value::Point(20.26)).unwrap();

    engine
        .calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)
        .unwrap();

    let layout = engine.layout(child).unwrap();
    assert_eq!(layout.left, 10.5);
    assert_eq!(layout.width, 20.0);
    assert_eq!((layout.left + layout.width) * 2.0 % 1.0, 0.0);
}

#[test]
fn test_scenario_second_pass_does_no_work() {
    let mut engine = LayoutEngine::new();
    let root = engine.new_node();
    engine.set_flex_direction(root, FlexDirection::Row).unwrap();
    for _ in 0..4 {
        let id = node_with_parent(&mut engine, root);
        engine.set_flex_grow(id, 1.0).unwrap();
    }
    engine.calculate_layout(root, 200.0, 50.0, Direction::Ltr).unwrap();
    engine.reset_stats();

    engine.calculate_layout(root, 200.0, 50.0, Direction::Ltr).unwrap();

    let stats: LayoutStats = *engine.stats();
    assert_eq!(stats.layouts, 0);
    assert_eq!(stats.cache_misses, 0);
    assert_eq!(stats.cache_hits, 1);
}

#[test]
fn test_scenario_printed_tree() {
    let mut engine = LayoutEngine::new();
    let root = engine.new_node();
    engine.set_width(root, Value::Point(50.0)).unwrap();
    engine.set_height(root, Value::Point(20.0)).unwrap();
    let child = node_with_parent(&mut engine, root);
    engine.set_flex_grow(child, 1.0).unwrap();
    engine
        .calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)
        .unwrap();

    let text = engine
        .node_to_string(root, PrintOptions::LAYOUT | PrintOptions::CHILDREN)
        .unwrap();

    assert_eq!(
        text,
        "<div layout=\"width: 50; height: 20; top: 0; left: 0;\" >\n  \
         <div layout=\"width: 50; height: 20; top: 0; left: 0;\" ></div>\n</div>"
    );
}

#[test]
fn test_scenario_style_round_trips_through_json() {
    let mut engine = LayoutEngine::new();
    let node = engine.new_node();
    engine.set_flex_direction(node, FlexDirection::Row).unwrap();
    engine.set_margin(node, Edge::Horizontal, Value::Percent(5.0)).unwrap();
    let style = *engine.style(node).unwrap();

    let json = serde_json::to_string(&style).unwrap();
    let back: Style = serde_json::from_str(&json).unwrap();

    assert_eq!(back, style);
    assert_eq!(MAX_CACHED_MEASUREMENTS, 16);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_dirty_marks_every_ancestor(depth in 1usize..12, property in 0u8..4) {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let mut chain = vec![root];
        for _ in 0..depth {
            let parent = *chain.last().unwrap();
            chain.push(node_with_parent(&mut engine, parent));
        }
        engine.calculate_layout(root, 100.0, 100.0, Direction::Ltr).unwrap();
        prop_assert!(chain.iter().all(|&id| !engine.is_dirty(id).unwrap()));

        let leaf = *chain.last().unwrap();
        match property {
            0 => engine.set_width(leaf, Value::Point(10.0)).unwrap(),
            1 => engine.set_flex_grow(leaf, 2.0).unwrap(),
            2 => engine.set_padding(leaf, Edge::Top, Value::Point(3.0)).unwrap(),
            _ => engine.set_align_self(leaf, Align::Center).unwrap(),
        }
        prop_assert!(chain.iter().all(|&id| engine.is_dirty(id).unwrap()));

        engine.calculate_layout(root, 100.0, 100.0, Direction::Ltr).unwrap();
        prop_assert!(chain.iter().all(|&id| !engine.is_dirty(id).unwrap()));
    }

    #[test]
    fn prop_grow_split_conserves_main_size(
        split in prop::collection::vec(1u32..10, 1..6),
        margin in 0.0f32..10.0,
    ) {
        let mut engine = LayoutEngine::with_config(
            Config::new().with_point_scale_factor(0.0).unwrap(),
        );
        let root = engine.new_node();
        engine.set_flex_direction(root, FlexDirection::Row).unwrap();
        engine.set_width(root, Value::Point(400.0)).unwrap();
        engine.set_padding(root, Edge::Horizontal, Value::Point(8.0)).unwrap();
        let total: u32 = split.iter().sum();
        let children: Vec<NodeId> = split
            .iter()
            .map(|&share| {
                let id = node_with_parent(&mut engine, root);
                engine.set_flex_grow(id, 6.0 * share as f32 / total as f32).unwrap();
                engine.set_margin(id, Edge::Right, Value::Point(margin)).unwrap();
                id
            })
            .collect();

        engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();

        let used: f32 = children
            .iter()
            .map(|&id| engine.layout(id).unwrap().width + margin)
            .sum();
        prop_assert!((used - 384.0).abs() < 1e-2);
    }

    #[test]
    fn prop_max_width_is_never_exceeded(max in 1.0f32..150.0, siblings in 1usize..4) {
        let mut engine = LayoutEngine::with_config(
            Config::new().with_point_scale_factor(0.0).unwrap(),
        );
        let root = engine.new_node();
        engine.set_flex_direction(root, FlexDirection::Row).unwrap();
        engine.set_width(root, Value::Point(600.0)).unwrap();
        let clamped = node_with_parent(&mut engine, root);
        engine.set_flex_grow(clamped, 1.0).unwrap();
        engine.set_max_width(clamped, Value::Point(max)).unwrap();
        let others: Vec<NodeId> = (0..siblings)
            .map(|_| {
                let id = node_with_parent(&mut engine, root);
                engine.set_flex_grow(id, 1.0).unwrap();
                id
            })
            .collect();

        engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();

        let clamped_width = engine.layout(clamped).unwrap().width;
        prop_assert!(clamped_width <= max + 1e-3);
        let expected = (600.0 - clamped_width) / siblings as f32;
        for id in others {
            prop_assert!((engine.layout(id).unwrap().width - expected).abs() < 1e-2);
        }
    }

    #[test]
    fn prop_percent_round_trip(percent in -500.0f32..500.0, parent in 0.1f32..10_000.0) {
        let resolved = Value::Percent(percent).resolve(parent);
        let recovered = resolved / parent * 100.0;
        prop_assert!((recovered - percent).abs() <= 1e-3 * percent.abs().max(1.0));
    }

    #[test]
    fn prop_more_room_never_shrinks_content(room in 0.0f32..400.0) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        engine
            .set_measure_func(
                root,
                Some(Rc::new(move |_, width: f32, mode: MeasureMode, _, _| {
                    counter.set(counter.get() + 1);
                    let natural = 120.0;
                    let width = match mode {
                        MeasureMode::Undefined => natural,
                        _ => width.min(natural),
                    };
                    Size::new(width, (natural / width.max(1.0)).ceil() * 10.0)
                })),
            )
            .unwrap();

        engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
        let unconstrained = engine.layout(root).unwrap();
        let first_calls = calls.get();

        engine.set_max_width(root, Value::Point(120.0 + room)).unwrap();
        engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
        let bounded = engine.layout(root).unwrap();

        prop_assert!(bounded.width >= unconstrained.width);
        prop_assert!(calls.get() >= first_calls);
    }
}
