//! Layered graph layout.
//!
//! `layout` assigns every node a center point and every edge a polyline, placing nodes on ranks
//! so that edges point in the configured direction. The pipeline follows dagre: break cycles,
//! rank, split long edges into dummy chains, order ranks to reduce crossings, then assign
//! coordinates.

#![forbid(unsafe_code)]

pub use narwhal_graphlib as graphlib;

use graphlib::{EdgeKey, Graph, GraphOptions};
use std::str::FromStr;

pub mod acyclic;
pub mod coordinate_system;
pub mod normalize;
pub mod order;
pub mod position;
pub mod rank;
pub mod self_loops;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Graph type used by every layout stage.
pub type LayoutGraph = Graph<NodeLabel, EdgeLabel, GraphLabel>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TB => "TB",
            Self::BT => "BT",
            Self::LR => "LR",
            Self::RL => "RL",
        }
    }
}

impl FromStr for RankDir {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" | "TD" => Ok(Self::TB),
            "BT" => Ok(Self::BT),
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranker {
    /// Sinks on the last rank, every other node as far down as its successors allow.
    LongestPath,
    /// Longest path followed by tightening a spanning tree of zero-slack edges.
    #[default]
    TightTree,
}

impl FromStr for Ranker {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "longest-path" => Ok(Self::LongestPath),
            "tight-tree" => Ok(Self::TightTree),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub nodesep: f64,
    pub ranksep: f64,
    pub edgesep: f64,
    pub ranker: Ranker,
    pub marginx: f64,
    pub marginy: f64,
    /// Drawing extent, written by `layout`.
    pub width: f64,
    pub height: f64,
    pub dummy_chains: Vec<normalize::DummyChain>,
    pub self_loops: Vec<self_loops::SelfLoop>,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 20.0,
            ranker: Ranker::default(),
            marginx: 0.0,
            marginy: 0.0,
            width: 0.0,
            height: 0.0,
            dummy_chains: Vec::new(),
            self_loops: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<i32>,
    pub order: Option<usize>,
    /// Set on dummy nodes: the edge whose chain this node belongs to.
    pub dummy_of: Option<EdgeKey>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy_of.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub minlen: usize,
    pub weight: f64,
    pub points: Vec<Point>,
    pub reversed: bool,
    pub forward_name: Option<String>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            points: Vec::new(),
            reversed: false,
            forward_name: None,
        }
    }
}

/// Runs the full layout on `g`.
///
/// The input graph is never restructured: the pipeline runs on a private multigraph copy and
/// only node coordinates, ranks, orders, edge points and the graph extent are written back.
pub fn layout(g: &mut LayoutGraph) {
    let mut lg = build_layout_graph(g);
    tracing::debug!(
        nodes = lg.node_count(),
        edges = lg.edge_count(),
        rankdir = ?lg.graph().rankdir,
        "narwhal layout start"
    );
    run_layout(&mut lg);
    update_input_graph(g, &lg);
    tracing::debug!(
        width = g.graph().width,
        height = g.graph().height,
        "narwhal layout done"
    );
}

fn build_layout_graph(g: &LayoutGraph) -> LayoutGraph {
    let mut lg: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    let src = g.graph();
    lg.set_graph(GraphLabel {
        rankdir: src.rankdir,
        nodesep: src.nodesep,
        ranksep: src.ranksep,
        edgesep: src.edgesep,
        ranker: src.ranker,
        marginx: src.marginx,
        marginy: src.marginy,
        ..Default::default()
    });

    for id in g.nodes() {
        let (width, height) = g
            .node(id)
            .map(|n| (sanitize(n.width), sanitize(n.height)))
            .unwrap_or((0.0, 0.0));
        lg.set_node(id, NodeLabel::sized(width, height));
    }
    for key in g.edges() {
        let Some(label) = g.edge_by_key(key) else {
            continue;
        };
        lg.set_edge_named(
            key.v.clone(),
            key.w.clone(),
            key.name.clone(),
            Some(EdgeLabel {
                minlen: label.minlen,
                weight: if label.weight.is_finite() {
                    label.weight
                } else {
                    0.0
                },
                ..Default::default()
            }),
        );
    }
    lg
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn run_layout(g: &mut LayoutGraph) {
    self_loops::remove(g);
    coordinate_system::adjust(g);
    acyclic::run(g);
    rank::rank(g);
    util::normalize_ranks(g);
    normalize::run(g);
    order::order(g);
    position::position(g);
    normalize::undo(g);
    self_loops::restore(g);
    coordinate_system::undo(g);
    util::translate_graph(g);
    util::assign_node_intersects(g);
    acyclic::undo(g);
}

fn update_input_graph(g: &mut LayoutGraph, lg: &LayoutGraph) {
    g.for_each_node_mut(|id, n| {
        let Some(ln) = lg.node(id) else {
            return;
        };
        n.x = ln.x;
        n.y = ln.y;
        n.rank = ln.rank;
        n.order = ln.order;
    });
    g.for_each_edge_mut(|key, e| {
        if let Some(le) = lg.edge_by_key(key) {
            e.points = le.points.clone();
        }
    });
    let graph = g.graph_mut();
    graph.width = lg.graph().width;
    graph.height = lg.graph().height;
}
