//! Ordering within ranks.
//!
//! Starts from a depth-first initial order, then sweeps down and up the ranks reordering each
//! rank by the barycenter of its neighbors in the adjacent rank. The ordering with the fewest
//! crossings wins; sweeping stops after four rounds without improvement.

use crate::util::build_layer_matrix;
use crate::{LayoutGraph, util};
use std::collections::BTreeSet;

mod cross_count;

pub use cross_count::cross_count;

const MAX_ROUNDS_WITHOUT_IMPROVEMENT: usize = 4;

pub fn order(g: &mut LayoutGraph) {
    let initial = init_order(g);
    assign_order(g, &initial);

    let mut best = initial;
    let mut best_cc = cross_count(g, &best);

    let mut i = 0usize;
    let mut last_best = 0usize;
    while last_best < MAX_ROUNDS_WITHOUT_IMPROVEMENT && best_cc > 0.0 {
        let bias_right = i % 4 >= 2;
        if i % 2 == 1 {
            sweep_down(g, bias_right);
        } else {
            sweep_up(g, bias_right);
        }

        let layering = build_layer_matrix(g);
        let cc = cross_count(g, &layering);
        if cc < best_cc {
            last_best = 0;
            best = layering;
            best_cc = cc;
        } else {
            last_best += 1;
        }
        i += 1;
    }

    assign_order(g, &best);
}

/// Layers filled by a depth-first walk that starts from nodes in rank order, so connected nodes
/// land near each other.
pub fn init_order(g: &LayoutGraph) -> Vec<Vec<String>> {
    let len = usize::try_from(util::max_rank(g) + 1).unwrap_or(0);
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); len];
    let mut visited: BTreeSet<String> = BTreeSet::new();

    let mut start: Vec<(i32, usize, String)> = g
        .nodes()
        .enumerate()
        .map(|(i, v)| (g.node(v).and_then(|n| n.rank).unwrap_or(0), i, v.to_string()))
        .collect();
    start.sort();

    let mut stack: Vec<(Vec<String>, usize)> = Vec::new();
    for (_, _, root) in &start {
        if !place(g, root, &mut visited, &mut layers) {
            continue;
        }
        stack.push((owned_successors(g, root), 0));
        while let Some((succ, next)) = stack.last_mut() {
            let Some(w) = succ.get(*next).cloned() else {
                stack.pop();
                continue;
            };
            *next += 1;
            if place(g, &w, &mut visited, &mut layers) {
                stack.push((owned_successors(g, &w), 0));
            }
        }
    }
    layers
}

/// Appends `v` to its rank's layer on first visit.
fn place(
    g: &LayoutGraph,
    v: &str,
    visited: &mut BTreeSet<String>,
    layers: &mut [Vec<String>],
) -> bool {
    if !visited.insert(v.to_string()) {
        return false;
    }
    let rank = g
        .node(v)
        .and_then(|n| n.rank)
        .and_then(|r| usize::try_from(r).ok())
        .unwrap_or(0);
    if let Some(layer) = layers.get_mut(rank) {
        layer.push(v.to_string());
    }
    true
}

fn owned_successors(g: &LayoutGraph, v: &str) -> Vec<String> {
    g.successors(v).into_iter().map(str::to_string).collect()
}

fn assign_order(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for layer in layering {
        for (i, v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = Some(i);
            }
        }
    }
}

fn sweep_down(g: &mut LayoutGraph, bias_right: bool) {
    let layering = build_layer_matrix(g);
    for i in 1..layering.len() {
        let sorted = sort_layer(g, &layering[i], Neighbors::Predecessors, bias_right);
        assign_order(g, std::slice::from_ref(&sorted));
    }
}

fn sweep_up(g: &mut LayoutGraph, bias_right: bool) {
    let layering = build_layer_matrix(g);
    for i in (0..layering.len().saturating_sub(1)).rev() {
        let sorted = sort_layer(g, &layering[i], Neighbors::Successors, bias_right);
        assign_order(g, std::slice::from_ref(&sorted));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Neighbors {
    Predecessors,
    Successors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarycenterEntry {
    pub v: String,
    /// Position in the layer before sorting.
    pub index: usize,
    pub barycenter: Option<f64>,
}

fn sort_layer(g: &LayoutGraph, layer: &[String], side: Neighbors, bias_right: bool) -> Vec<String> {
    let entries: Vec<BarycenterEntry> = layer
        .iter()
        .enumerate()
        .map(|(index, v)| BarycenterEntry {
            v: v.clone(),
            index,
            barycenter: barycenter(g, v, side),
        })
        .collect();
    sort_entries(entries, bias_right)
}

/// Weighted mean order of the neighbors on the fixed side, `None` for nodes without any.
fn barycenter(g: &LayoutGraph, v: &str, side: Neighbors) -> Option<f64> {
    let edges = match side {
        Neighbors::Predecessors => g.in_edges(v, None),
        Neighbors::Successors => g.out_edges(v, None),
    };
    let mut sum = 0.0;
    let mut weight = 0.0;
    for e in &edges {
        let u = if side == Neighbors::Predecessors {
            &e.v
        } else {
            &e.w
        };
        let Some(order) = g.node(u).and_then(|n| n.order) else {
            continue;
        };
        let w = g.edge_by_key(e).map(|l| l.weight).unwrap_or(0.0);
        sum += w * order as f64;
        weight += w;
    }
    (weight > 0.0).then(|| sum / weight)
}

/// Sorts entries with a barycenter; entries without one keep their original slot.
pub fn sort_entries(entries: Vec<BarycenterEntry>, bias_right: bool) -> Vec<String> {
    let (mut sortable, mut unsortable): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.barycenter.is_some());

    sortable.sort_by(|a, b| {
        let (ba, bb) = (a.barycenter.unwrap_or(0.0), b.barycenter.unwrap_or(0.0));
        ba.total_cmp(&bb).then_with(|| {
            if bias_right {
                b.index.cmp(&a.index)
            } else {
                a.index.cmp(&b.index)
            }
        })
    });
    // Popped from the back, smallest index first.
    unsortable.sort_by(|a, b| b.index.cmp(&a.index));

    let mut out: Vec<String> = Vec::with_capacity(sortable.len() + unsortable.len());
    let consume_unsortable = |out: &mut Vec<String>, unsortable: &mut Vec<BarycenterEntry>| {
        while unsortable.last().is_some_and(|e| e.index <= out.len()) {
            if let Some(e) = unsortable.pop() {
                out.push(e.v);
            }
        }
    };

    consume_unsortable(&mut out, &mut unsortable);
    for entry in sortable {
        out.push(entry.v);
        consume_unsortable(&mut out, &mut unsortable);
    }
    out.extend(unsortable.into_iter().rev().map(|e| e.v));
    out
}

