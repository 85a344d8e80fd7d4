//! Splits edges spanning several ranks into chains of dummy nodes, one per intermediate rank, so
//! ordering and positioning only ever see rank-adjacent edges. `undo` collapses each chain back
//! into the original edge, keeping the dummy positions as bend points.

use crate::graphlib::EdgeKey;
use crate::{EdgeLabel, LayoutGraph, NodeLabel, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct DummyChain {
    pub first: String,
    pub edge: EdgeKey,
    pub label: EdgeLabel,
}

/// Adds a dummy under the first free `_d{i}` id at or after `*next`.
fn add_dummy_node(g: &mut LayoutGraph, next: &mut usize, label: NodeLabel) -> String {
    loop {
        let v = format!("_d{}", *next);
        *next += 1;
        if !g.has_node(&v) {
            g.set_node(&v, label);
            return v;
        }
    }
}

pub fn run(g: &mut LayoutGraph) {
    g.graph_mut().dummy_chains.clear();
    let mut next_dummy = 0usize;
    for e in g.edge_keys() {
        normalize_edge(g, e, &mut next_dummy);
    }
}

fn normalize_edge(g: &mut LayoutGraph, e: EdgeKey, next_dummy: &mut usize) {
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    if w_rank <= v_rank + 1 {
        return;
    }
    let Some(label) = g.remove_edge_key(&e) else {
        return;
    };

    let weight = label.weight;
    let mut prev = e.v.clone();
    for r in (v_rank + 1)..w_rank {
        let dummy = add_dummy_node(
            g,
            next_dummy,
            NodeLabel {
                rank: Some(r),
                dummy_of: Some(e.clone()),
                ..Default::default()
            },
        );
        if r == v_rank + 1 {
            g.graph_mut().dummy_chains.push(DummyChain {
                first: dummy.clone(),
                edge: e.clone(),
                label: label.clone(),
            });
        }
        g.set_edge_named(
            prev,
            dummy.clone(),
            e.name.clone(),
            Some(EdgeLabel {
                weight,
                ..Default::default()
            }),
        );
        prev = dummy;
    }

    g.set_edge_named(
        prev,
        e.w.clone(),
        e.name.clone(),
        Some(EdgeLabel {
            weight,
            ..Default::default()
        }),
    );
}

pub fn undo(g: &mut LayoutGraph) {
    let chains = std::mem::take(&mut g.graph_mut().dummy_chains);
    let mut dummies: Vec<String> = Vec::new();
    let mut restored: Vec<(EdgeKey, EdgeLabel)> = Vec::with_capacity(chains.len());

    for chain in chains {
        let mut label = chain.label;
        label.points.clear();

        let mut v = chain.first;
        loop {
            let Some(node) = g.node(&v).filter(|n| n.is_dummy()) else {
                break;
            };
            if let (Some(x), Some(y)) = (node.x, node.y) {
                label.points.push(Point { x, y });
            }
            let next = g.successors(&v).first().map(|s| s.to_string());
            dummies.push(v);
            let Some(next) = next else {
                break;
            };
            v = next;
        }
        restored.push((chain.edge, label));
    }

    // One batch, one reindex.
    g.remove_nodes(&dummies);
    for (edge, label) in restored {
        g.set_edge_named(edge.v, edge.w, edge.name, Some(label));
    }
}
