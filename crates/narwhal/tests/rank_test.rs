use narwhal::graphlib::{Graph, GraphOptions};
use narwhal::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Ranker, rank, util};

fn gansner_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_graph(GraphLabel::default());
    g.set_default_node_label(NodeLabel::default);
    g.set_default_edge_label(EdgeLabel::default);

    g.set_path(&["a", "b", "c", "d", "h"]);
    g.set_path(&["a", "e", "g", "h"]);
    g.set_path(&["a", "f", "g"]);
    g
}

fn assert_respects_minlen(g: &LayoutGraph) {
    for e in g.edges() {
        let v_rank = g.node(&e.v).unwrap().rank.unwrap();
        let w_rank = g.node(&e.w).unwrap().rank.unwrap();
        let minlen = g.edge_by_key(e).unwrap().minlen as i32;
        assert!(
            w_rank - v_rank >= minlen,
            "edge {} -> {} violates minlen {}: {} - {}",
            e.v,
            e.w,
            minlen,
            w_rank,
            v_rank
        );
    }
}

fn rank_of(g: &LayoutGraph, v: &str) -> i32 {
    g.node(v).unwrap().rank.unwrap()
}

#[test]
fn rank_longest_path_respects_the_minlen_attribute() {
    let mut g = gansner_graph();
    g.graph_mut().ranker = Ranker::LongestPath;
    if let Some(e) = g.edge_mut("a", "e", None) {
        e.minlen = 2;
    }
    rank::rank(&mut g);
    assert_respects_minlen(&g);
}

#[test]
fn rank_tight_tree_respects_the_minlen_attribute() {
    let mut g = gansner_graph();
    g.graph_mut().ranker = Ranker::TightTree;
    if let Some(e) = g.edge_mut("b", "c", None) {
        e.minlen = 3;
    }
    rank::rank(&mut g);
    assert_respects_minlen(&g);
}

#[test]
fn rank_tight_tree_pulls_short_branches_up_to_their_parent() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_path(&["a", "c", "d"]);
    g.set_edge("a", "b");

    g.graph_mut().ranker = Ranker::LongestPath;
    rank::rank(&mut g);
    util::normalize_ranks(&mut g);
    assert_eq!(rank_of(&g, "b"), 2);

    g.graph_mut().ranker = Ranker::TightTree;
    rank::rank(&mut g);
    util::normalize_ranks(&mut g);
    assert_eq!(rank_of(&g, "a"), 0);
    assert_eq!(rank_of(&g, "b"), 1);
    assert_eq!(rank_of(&g, "c"), 1);
    assert_eq!(rank_of(&g, "d"), 2);
}

#[test]
fn rank_handles_disconnected_components() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_path(&["a", "b", "c"]);
    g.set_edge("x", "y");
    g.set_node("lonely", NodeLabel::default());

    rank::rank(&mut g);
    util::normalize_ranks(&mut g);
    assert_respects_minlen(&g);
    assert_eq!(
        g.nodes().filter_map(|v| g.node(v).unwrap().rank).min(),
        Some(0)
    );
    assert!(g.nodes().all(|v| g.node(v).unwrap().rank.is_some()));
}

#[test]
fn slack_is_the_rank_distance_beyond_minlen() {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_node(
        "a",
        NodeLabel {
            rank: Some(0),
            ..Default::default()
        },
    );
    g.set_node(
        "b",
        NodeLabel {
            rank: Some(3),
            ..Default::default()
        },
    );
    g.set_edge("a", "b");
    let key = g.edge_keys().remove(0);
    assert_eq!(rank::slack(&g, &key), 2);
}
