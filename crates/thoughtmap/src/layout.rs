use crate::config::{DanglingEdgePolicy, LayoutConfig, LayoutSettings};
use crate::model::{FlowEdge, FlowNode, LayoutedElements, LayoutedNode, Position};
use crate::sizing::{FixedWidthSizer, LabelSizer};
use crate::{Error, Result};
use narwhal::graphlib::{Graph, GraphOptions, alg};
use narwhal::{GraphLabel, LayoutGraph, NodeLabel};
use std::sync::Arc;

#[derive(Clone)]
pub struct LayoutOptions {
    pub settings: LayoutSettings,
    pub label_sizer: Arc<dyn LabelSizer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from_settings(LayoutSettings::default())
    }
}

impl LayoutOptions {
    /// Options whose sizer is the fixed-width card described by `settings.node`.
    pub fn from_settings(settings: LayoutSettings) -> Self {
        let sizer: FixedWidthSizer = settings.node;
        Self {
            settings,
            label_sizer: Arc::new(sizer),
        }
    }

    pub fn from_config(cfg: &LayoutConfig) -> Result<Self> {
        Ok(Self::from_settings(LayoutSettings::from_config(cfg)?))
    }

    pub fn with_label_sizer(mut self, sizer: Arc<dyn LabelSizer + Send + Sync>) -> Self {
        self.label_sizer = sizer;
        self
    }
}

/// Lays out `nodes` and `edges` and returns the nodes with a top-left `position`.
///
/// Nodes come back in input order with every other field untouched; edges come back unchanged,
/// including edges that were left out of the layout.
pub fn layouted_elements(
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    options: &LayoutOptions,
) -> Result<LayoutedElements> {
    if nodes.is_empty() && edges.is_empty() {
        return Ok(LayoutedElements::default());
    }

    let g = layout_graph(&nodes, &edges, options)?;

    let nodes = nodes
        .into_iter()
        .map(|mut node| {
            let position = top_left(&g, &node.id)?;
            // The computed position replaces whatever the caller sent.
            node.extra.remove("position");
            Ok(LayoutedNode { node, position })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LayoutedElements { nodes, edges })
}

fn layout_graph(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    options: &LayoutOptions,
) -> Result<LayoutGraph> {
    let settings = &options.settings;
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_graph(GraphLabel {
        rankdir: settings.rankdir,
        nodesep: settings.nodesep,
        ranksep: settings.ranksep,
        edgesep: settings.edgesep,
        ranker: settings.ranker,
        ..Default::default()
    });

    for (index, node) in nodes.iter().enumerate() {
        if node.id.is_empty() {
            return Err(Error::EmptyNodeId { index });
        }
        if g.has_node(&node.id) {
            tracing::warn!(id = %node.id, "duplicate node id; the last definition wins");
        }
        let size = options.label_sizer.size(&node.label);
        if !(is_positive(size.width) && is_positive(size.height)) {
            return Err(Error::InvalidNodeSize {
                id: node.id.clone(),
                width: size.width,
                height: size.height,
            });
        }
        g.set_node(node.id.clone(), NodeLabel::sized(size.width, size.height));
    }

    for edge in edges {
        if !(g.has_node(&edge.source) && g.has_node(&edge.target)) {
            match settings.dangling_edges {
                DanglingEdgePolicy::Skip => {
                    tracing::warn!(
                        source = %edge.source,
                        target = %edge.target,
                        "edge references an unknown node; left out of the layout"
                    );
                    continue;
                }
                DanglingEdgePolicy::Error => {
                    return Err(Error::DanglingEdge {
                        source_id: edge.source.clone(),
                        target_id: edge.target.clone(),
                    });
                }
            }
        }
        g.set_edge(edge.source.clone(), edge.target.clone());
    }

    let cycles = alg::find_cycles(&g);
    if !cycles.is_empty() {
        tracing::debug!(
            cycles = cycles.len(),
            "input contains cycles; back edges are reversed for ranking"
        );
    }

    narwhal::layout(&mut g);
    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        width = g.graph().width,
        height = g.graph().height,
        "thought map laid out"
    );
    Ok(g)
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn top_left(g: &LayoutGraph, id: &str) -> Result<Position> {
    let missing = || Error::MissingPosition { id: id.to_string() };
    let n = g.node(id).ok_or_else(missing)?;
    let (Some(cx), Some(cy)) = (n.x, n.y) else {
        return Err(missing());
    };
    Ok(Position {
        x: cx - n.width / 2.0,
        y: cy - n.height / 2.0,
    })
}
