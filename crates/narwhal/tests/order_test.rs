use narwhal::graphlib::{Graph, GraphOptions};
use narwhal::order::{BarycenterEntry, cross_count, init_order, order, sort_entries};
use narwhal::{LayoutGraph, NodeLabel, util};

fn ranked(g: &mut LayoutGraph, ranks: &[(&str, i32)]) {
    for (v, r) in ranks {
        g.set_node(
            *v,
            NodeLabel {
                rank: Some(*r),
                ..Default::default()
            },
        );
    }
}

fn entry(v: &str, index: usize, barycenter: Option<f64>) -> BarycenterEntry {
    BarycenterEntry {
        v: v.to_string(),
        index,
        barycenter,
    }
}

fn layers(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|l| l.iter().map(|v| v.to_string()).collect())
        .collect()
}

#[test]
fn cross_count_is_zero_for_parallel_edges() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_edge("a", "c");
    g.set_edge("b", "d");
    assert_eq!(cross_count(&g, &layers(&[&["a", "b"], &["c", "d"]])), 0.0);
}

#[test]
fn cross_count_counts_crossed_edges_by_weight() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_edge("a", "d");
    g.set_edge("b", "c");
    assert_eq!(cross_count(&g, &layers(&[&["a", "b"], &["c", "d"]])), 1.0);

    g.edge_mut("a", "d", None).unwrap().weight = 3.0;
    g.edge_mut("b", "c", None).unwrap().weight = 2.0;
    assert_eq!(cross_count(&g, &layers(&[&["a", "b"], &["c", "d"]])), 6.0);
}

#[test]
fn init_order_places_connected_nodes_depth_first() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    ranked(&mut g, &[("a", 0), ("b", 0), ("c", 1), ("d", 1), ("e", 1)]);
    g.set_edge("b", "e");
    g.set_edge("a", "d");
    g.set_edge("a", "c");

    assert_eq!(init_order(&g), layers(&[&["a", "b"], &["d", "c", "e"]]));
}

#[test]
fn sort_entries_orders_by_barycenter_and_keeps_unsortable_slots() {
    let sorted = sort_entries(
        vec![
            entry("a", 0, Some(3.0)),
            entry("b", 1, None),
            entry("c", 2, Some(1.0)),
            entry("d", 3, Some(2.0)),
        ],
        false,
    );
    assert_eq!(sorted, vec!["c", "b", "d", "a"]);
}

#[test]
fn sort_entries_breaks_ties_by_bias() {
    let entries = vec![entry("a", 0, Some(1.0)), entry("b", 1, Some(1.0))];
    assert_eq!(sort_entries(entries.clone(), false), vec!["a", "b"]);
    assert_eq!(sort_entries(entries, true), vec!["b", "a"]);
}

#[test]
fn order_removes_avoidable_crossings() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    ranked(
        &mut g,
        &[("a", 0), ("b", 0), ("c", 1), ("d", 1), ("e", 2), ("f", 2)],
    );
    g.set_edge("a", "c");
    g.set_edge("b", "d");
    g.set_edge("c", "f");
    g.set_edge("d", "e");

    order(&mut g);

    let layering = util::build_layer_matrix(&g);
    assert_eq!(cross_count(&g, &layering), 0.0);
    for layer in &layering {
        let mut orders: Vec<usize> = layer
            .iter()
            .map(|v| g.node(v).unwrap().order.unwrap())
            .collect();
        orders.sort();
        assert_eq!(orders, (0..layer.len()).collect::<Vec<_>>());
    }
}
