use narwhal::graphlib::{Graph, GraphOptions};
use narwhal::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir, layout};
use std::collections::BTreeMap;

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    g.set_graph(GraphLabel::default());
    g
}

fn coords(g: &LayoutGraph) -> BTreeMap<String, (f64, f64)> {
    let mut out = BTreeMap::new();
    for id in g.nodes() {
        let n = g.node(id).unwrap();
        out.insert(id.to_string(), (n.x.unwrap(), n.y.unwrap()));
    }
    out
}

fn overlaps(a: &NodeLabel, b: &NodeLabel) -> bool {
    let (ax, ay) = (a.x.unwrap(), a.y.unwrap());
    let (bx, by) = (b.x.unwrap(), b.y.unwrap());
    (ax - bx).abs() < (a.width + b.width) / 2.0 && (ay - by).abs() < (a.height + b.height) / 2.0
}

#[test]
fn layout_can_layout_a_single_node() {
    let mut g = new_graph();
    g.set_node("a", NodeLabel::sized(50.0, 100.0));

    layout(&mut g);

    assert_eq!(coords(&g), [("a".to_string(), (25.0, 50.0))].into());
    assert_eq!(g.graph().width, 50.0);
    assert_eq!(g.graph().height, 100.0);
}

#[test]
fn layout_can_layout_two_nodes_on_the_same_rank() {
    let mut g = new_graph();
    g.graph_mut().nodesep = 200.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    g.set_node("b", NodeLabel::sized(75.0, 200.0));

    layout(&mut g);

    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 100.0)),
            ("b".to_string(), (50.0 + 200.0 + 75.0 / 2.0, 100.0)),
        ]
        .into()
    );
}

#[test]
fn layout_can_layout_two_nodes_connected_by_an_edge() {
    let mut g = new_graph();
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    g.set_node("b", NodeLabel::sized(75.0, 200.0));
    g.set_edge("a", "b");

    layout(&mut g);

    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (75.0 / 2.0, 100.0 / 2.0)),
            ("b".to_string(), (75.0 / 2.0, 100.0 + 300.0 + 200.0 / 2.0)),
        ]
        .into()
    );
    assert_eq!(
        g.edge("a", "b", None).unwrap().points,
        vec![Point { x: 37.5, y: 100.0 }, Point { x: 37.5, y: 400.0 }]
    );
    assert_eq!(g.graph().width, 75.0);
    assert_eq!(g.graph().height, 600.0);
}

#[test]
fn layout_can_layout_left_to_right() {
    let mut g = new_graph();
    g.graph_mut().ranksep = 300.0;
    g.graph_mut().rankdir = RankDir::LR;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    g.set_node("b", NodeLabel::sized(75.0, 200.0));
    g.set_edge("a", "b");

    layout(&mut g);

    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 100.0)),
            ("b".to_string(), (50.0 + 300.0 + 37.5, 100.0)),
        ]
        .into()
    );
    // Node extents are restored after the axis swap.
    assert_eq!(g.node("b").unwrap().width, 75.0);
    assert_eq!(g.node("b").unwrap().height, 200.0);
}

#[test]
fn layout_bottom_to_top_places_targets_above_sources() {
    let mut g = new_graph();
    g.graph_mut().rankdir = RankDir::BT;
    g.set_node("a", NodeLabel::sized(50.0, 50.0));
    g.set_node("b", NodeLabel::sized(50.0, 50.0));
    g.set_edge("a", "b");

    layout(&mut g);

    let a = g.node("a").unwrap();
    let b = g.node("b").unwrap();
    assert!(b.y.unwrap() < a.y.unwrap());
    assert_eq!(b.y, Some(25.0));
}

#[test]
fn layout_centers_a_parent_over_its_children() {
    let mut g = new_graph();
    for id in ["root", "left", "right"] {
        g.set_node(id, NodeLabel::sized(100.0, 40.0));
    }
    g.set_edge("root", "left");
    g.set_edge("root", "right");

    layout(&mut g);

    let root = g.node("root").unwrap().x.unwrap();
    let left = g.node("left").unwrap().x.unwrap();
    let right = g.node("right").unwrap().x.unwrap();
    assert!(left < right);
    assert!((root - (left + right) / 2.0).abs() < 1e-6);
    assert!(right - left >= 100.0 + 50.0 - 1e-6);
}

#[test]
fn layout_breaks_cycles_and_keeps_edge_directions() {
    let mut g = new_graph();
    for id in ["a", "b", "c"] {
        g.set_node(id, NodeLabel::sized(20.0, 20.0));
    }
    g.set_path(&["a", "b", "c", "a"]);

    layout(&mut g);

    assert_eq!(g.edge_count(), 3);
    for key in g.edge_keys() {
        let e = g.edge_by_key(&key).unwrap();
        assert!(!e.reversed);
        assert!(e.points.len() >= 2, "edge {key:?} has no points");
    }
    // c -> a was reversed for layout; its points must still run from c to a.
    let points = &g.edge("c", "a", None).unwrap().points;
    let c = g.node("c").unwrap();
    let a = g.node("a").unwrap();
    let first = points.first().unwrap();
    let last = points.last().unwrap();
    assert!((first.y - c.y.unwrap()).abs() < (last.y - c.y.unwrap()).abs());
    assert!((last.y - a.y.unwrap()).abs() < (first.y - a.y.unwrap()).abs());
}

#[test]
fn layout_routes_long_edges_through_bend_points() {
    let mut g = new_graph();
    for id in ["a", "b", "c"] {
        g.set_node(id, NodeLabel::sized(40.0, 40.0));
    }
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "c");

    layout(&mut g);

    assert_eq!(g.node_count(), 3, "dummy nodes must not leak");
    assert_eq!(g.edge("a", "c", None).unwrap().points.len(), 3);
    assert_eq!(g.edge("a", "b", None).unwrap().points.len(), 2);
    assert_eq!(g.node("c").unwrap().rank, Some(2));
}

#[test]
fn layout_draws_self_loops_beside_their_node() {
    let mut g = new_graph();
    g.set_node("a", NodeLabel::sized(40.0, 40.0));
    g.set_edge("a", "a");

    layout(&mut g);

    let a = g.node("a").unwrap();
    let points = &g.edge("a", "a", None).unwrap().points;
    assert_eq!(points.len(), 5);
    let right = a.x.unwrap() + a.width / 2.0;
    assert!(points.iter().all(|p| p.x >= right - 1e-9));
}

#[test]
fn layout_applies_graph_margins() {
    let mut g = new_graph();
    g.graph_mut().marginx = 10.0;
    g.graph_mut().marginy = 20.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));

    layout(&mut g);

    assert_eq!(coords(&g)["a"], (35.0, 70.0));
    assert_eq!(g.graph().width, 70.0);
    assert_eq!(g.graph().height, 140.0);
}

#[test]
fn layout_of_an_empty_graph_is_empty() {
    let mut g = new_graph();
    layout(&mut g);
    assert_eq!(g.graph().width, 0.0);
    assert_eq!(g.graph().height, 0.0);
}

#[test]
fn layout_never_overlaps_nodes_of_a_wide_tree() {
    let mut g = new_graph();
    g.graph_mut().nodesep = 120.0;
    g.graph_mut().ranksep = 100.0;
    g.set_node("0", NodeLabel::sized(360.0, 64.0));
    let mut next = 1;
    for parent in 0..4 {
        for _ in 0..3 {
            let id = next.to_string();
            g.set_node(&id, NodeLabel::sized(360.0, 40.0 + 24.0 * (next % 3) as f64));
            g.set_edge(parent.to_string(), id);
            next += 1;
        }
    }

    layout(&mut g);

    let ids = g.node_ids();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert!(
                !overlaps(g.node(a).unwrap(), g.node(b).unwrap()),
                "{a} overlaps {b}"
            );
        }
    }
    for key in g.edge_keys() {
        let v = g.node(&key.v).unwrap().rank.unwrap();
        let w = g.node(&key.w).unwrap().rank.unwrap();
        assert!(w > v);
    }
}

#[test]
fn layout_is_deterministic() {
    let build = || {
        let mut g = new_graph();
        for i in 0..8 {
            g.set_node(i.to_string(), NodeLabel::sized(30.0 + i as f64, 20.0));
        }
        for (v, w) in [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (0, 5), (5, 6), (6, 7), (7, 4)] {
            g.set_edge_with_label(v.to_string(), w.to_string(), EdgeLabel::default());
        }
        layout(&mut g);
        coords(&g)
    };
    assert_eq!(build(), build());
}

#[test]
fn layout_handles_a_deep_chain() {
    const DEPTH: usize = 20_000;
    let mut g = new_graph();
    for i in 0..DEPTH {
        g.set_node(i.to_string(), NodeLabel::sized(10.0, 10.0));
    }
    for i in 1..DEPTH {
        g.set_edge_with_label((i - 1).to_string(), i.to_string(), EdgeLabel::default());
    }
    // The closing edge is reversed and then spans the whole chain as one long edge.
    g.set_edge_with_label((DEPTH - 1).to_string(), "0", EdgeLabel::default());

    layout(&mut g);

    assert_eq!(g.node_count(), DEPTH);
    assert_eq!(g.edge_count(), DEPTH);
    let ys: Vec<f64> = (0..DEPTH)
        .map(|i| g.node(&i.to_string()).unwrap().y.unwrap())
        .collect();
    assert!(ys.windows(2).all(|w| w[0] < w[1]));
    let closing = g.edge(&(DEPTH - 1).to_string(), "0", None).unwrap();
    assert!(!closing.reversed);
    assert!(closing.points.len() >= DEPTH - 2);
}
