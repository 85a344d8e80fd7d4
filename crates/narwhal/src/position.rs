//! Coordinate assignment.
//!
//! `y` stacks ranks: each rank is as tall as its tallest node and ranks are `ranksep` apart.
//! `x` keeps the order chosen by `order` and the minimum separation between neighbors
//! (`nodesep` around real nodes, `edgesep` around dummies), then repeatedly pulls every node
//! toward the weighted mean of its neighbors in the adjacent rank. Each pull solves the rank as an
//! isotonic regression, so a rank ends at the closest arrangement to its targets that still
//! respects the separations.

use crate::util::build_layer_matrix;
use crate::{LayoutGraph, NodeLabel};
use rustc_hash::FxHashMap as HashMap;

const BALANCE_ROUNDS: usize = 4;

pub fn position(g: &mut LayoutGraph) {
    let layering = build_layer_matrix(g);
    position_y(g, &layering);
    position_x(g, &layering);
}

fn position_y(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    let rank_sep = g.graph().ranksep;
    let mut prev_y: f64 = 0.0;
    for layer in layering {
        let max_h = layer
            .iter()
            .filter_map(|v| g.node(v).map(|n| n.height))
            .fold(0.0_f64, f64::max);
        for v in layer {
            if let Some(n) = g.node_mut(v) {
                n.y = Some(prev_y + max_h / 2.0);
            }
        }
        prev_y += max_h + rank_sep;
    }
}

/// Minimum distance between the centers of `left` and `right` when placed side by side.
pub fn separation(left: &NodeLabel, right: &NodeLabel, nodesep: f64, edgesep: f64) -> f64 {
    let gap = |n: &NodeLabel| if n.is_dummy() { edgesep } else { nodesep };
    left.width / 2.0 + gap(left) / 2.0 + gap(right) / 2.0 + right.width / 2.0
}

fn position_x(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    let nodesep = g.graph().nodesep;
    let edgesep = g.graph().edgesep;

    let seps: Vec<Vec<f64>> = layering
        .iter()
        .map(|layer| {
            layer
                .windows(2)
                .map(|pair| match (g.node(&pair[0]), g.node(&pair[1])) {
                    (Some(l), Some(r)) => separation(l, r, nodesep, edgesep),
                    _ => nodesep,
                })
                .collect()
        })
        .collect();

    let mut xs: HashMap<String, f64> = HashMap::default();
    for (layer, sep) in layering.iter().zip(&seps) {
        let mut x = 0.0;
        for (i, v) in layer.iter().enumerate() {
            if i > 0 {
                x += sep[i - 1];
            }
            xs.insert(v.clone(), x);
        }
    }

    for _ in 0..BALANCE_ROUNDS {
        for i in 1..layering.len() {
            balance_layer(g, &layering[i], &seps[i], Side::Predecessors, &mut xs);
        }
        for i in (0..layering.len().saturating_sub(1)).rev() {
            balance_layer(g, &layering[i], &seps[i], Side::Successors, &mut xs);
        }
    }

    let min_x = xs.values().copied().fold(f64::INFINITY, f64::min);
    let shift = if min_x.is_finite() { -min_x } else { 0.0 };
    g.for_each_node_mut(|id, n| {
        if let Some(x) = xs.get(id) {
            n.x = Some(x + shift);
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Predecessors,
    Successors,
}

fn balance_layer(
    g: &LayoutGraph,
    layer: &[String],
    sep: &[f64],
    side: Side,
    xs: &mut HashMap<String, f64>,
) {
    if layer.is_empty() {
        return;
    }

    let mut targets: Vec<f64> = Vec::with_capacity(layer.len());
    let mut weights: Vec<f64> = Vec::with_capacity(layer.len());
    for v in layer {
        let edges = match side {
            Side::Predecessors => g.in_edges(v, None),
            Side::Successors => g.out_edges(v, None),
        };
        let mut sum = 0.0;
        let mut weight = 0.0;
        for e in &edges {
            let u = if side == Side::Predecessors { &e.v } else { &e.w };
            let Some(&ux) = xs.get(u.as_str()) else {
                continue;
            };
            let w = g.edge_by_key(e).map(|l| l.weight).unwrap_or(0.0).max(0.0);
            sum += w * ux;
            weight += w;
        }
        let current = xs.get(v.as_str()).copied().unwrap_or(0.0);
        if weight > 0.0 {
            targets.push(sum / weight);
            weights.push(weight);
        } else {
            // Free nodes only resist being moved.
            targets.push(current);
            weights.push(1e-3);
        }
    }

    let placed = place_with_separation(&targets, &weights, sep);
    for (v, x) in layer.iter().zip(placed) {
        xs.insert(v.clone(), x);
    }
}

/// Weighted least-squares placement of `targets` keeping `x[i+1] - x[i] >= sep[i]`.
///
/// Subtracting the cumulative separation turns the constraints into a monotone sequence, which
/// pool-adjacent-violators solves exactly.
pub fn place_with_separation(targets: &[f64], weights: &[f64], sep: &[f64]) -> Vec<f64> {
    let mut offsets: Vec<f64> = Vec::with_capacity(targets.len());
    let mut acc = 0.0;
    for i in 0..targets.len() {
        if i > 0 {
            acc += sep.get(i - 1).copied().unwrap_or(0.0);
        }
        offsets.push(acc);
    }

    // (weighted mean, total weight, count)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(targets.len());
    for i in 0..targets.len() {
        let w = weights.get(i).copied().unwrap_or(1.0).max(f64::MIN_POSITIVE);
        blocks.push((targets[i] - offsets[i], w, 1));
        while blocks.len() > 1 {
            let (m2, w2, c2) = blocks[blocks.len() - 1];
            let (m1, w1, c1) = blocks[blocks.len() - 2];
            if m1 <= m2 {
                break;
            }
            blocks.pop();
            blocks.pop();
            let w = w1 + w2;
            blocks.push(((m1 * w1 + m2 * w2) / w, w, c1 + c2));
        }
    }

    let mut out: Vec<f64> = Vec::with_capacity(targets.len());
    for (mean, _, count) in blocks {
        for _ in 0..count {
            let i = out.len();
            out.push(mean + offsets[i]);
        }
    }
    out
}
