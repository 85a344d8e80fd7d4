//! Rank assignment.
//!
//! Ranks satisfy `rank(w) - rank(v) >= minlen` for every edge `v -> w`. The graph must be acyclic.

use crate::graphlib::{EdgeKey, alg};
use crate::{LayoutGraph, Ranker};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub fn rank(g: &mut LayoutGraph) {
    match g.graph().ranker {
        Ranker::LongestPath => longest_path(g),
        Ranker::TightTree => {
            longest_path(g);
            feasible_tree(g);
        }
    }
}

/// Places sinks on rank 0 and every other node `minlen` above its highest successor.
pub fn longest_path(g: &mut LayoutGraph) {
    struct Frame {
        v: String,
        edges: Vec<EdgeKey>,
        next_edge: usize,
        rank: Option<i32>,
        // `minlen` of the edge the parent frame followed to reach `v`.
        via_minlen: i32,
    }

    fn lower(rank: &mut Option<i32>, candidate: i32) {
        *rank = Some(rank.map_or(candidate, |r| r.min(candidate)));
    }

    let mut ranks: HashMap<String, i32> = HashMap::default();
    let mut roots: Vec<String> = g.sources().into_iter().map(str::to_string).collect();
    roots.extend(g.node_ids());

    let mut stack: Vec<Frame> = Vec::new();
    for root in roots {
        if ranks.contains_key(&root) {
            continue;
        }
        // A provisional rank guards against revisiting on malformed (cyclic) input.
        ranks.insert(root.clone(), 0);
        stack.push(Frame {
            edges: g.out_edges(&root, None),
            v: root,
            next_edge: 0,
            rank: None,
            via_minlen: 0,
        });

        while let Some(top) = stack.last_mut() {
            if let Some(e) = top.edges.get(top.next_edge) {
                top.next_edge += 1;
                let minlen = edge_minlen(g, e);
                if let Some(&w_rank) = ranks.get(&e.w) {
                    lower(&mut top.rank, w_rank - minlen);
                    continue;
                }
                let w = e.w.clone();
                ranks.insert(w.clone(), 0);
                stack.push(Frame {
                    edges: g.out_edges(&w, None),
                    v: w,
                    next_edge: 0,
                    rank: None,
                    via_minlen: minlen,
                });
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let rank = done.rank.unwrap_or(0);
            if let Some(label) = g.node_mut(&done.v) {
                label.rank = Some(rank);
            }
            ranks.insert(done.v, rank);
            if let Some(parent) = stack.last_mut() {
                lower(&mut parent.rank, rank - done.via_minlen);
            }
        }
    }
}

fn edge_minlen(g: &LayoutGraph, e: &EdgeKey) -> i32 {
    g.edge_by_key(e).map(|l| l.minlen as i32).unwrap_or(1)
}

pub fn slack(g: &LayoutGraph, e: &EdgeKey) -> i32 {
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    w_rank - v_rank - edge_minlen(g, e)
}

/// Pulls nodes together until every connected component is spanned by a tree of zero-slack
/// edges. Starts from a feasible ranking and keeps it feasible.
pub fn feasible_tree(g: &mut LayoutGraph) {
    for component in alg::components(g) {
        let Some(start) = component.first() else {
            continue;
        };
        let size = component.len();
        let mut tree: HashSet<String> = HashSet::default();
        tree.insert(start.clone());

        while grow_tight_tree(g, &mut tree) < size {
            let Some((edge, edge_slack)) = find_min_slack_edge(g, &tree) else {
                break;
            };
            let delta = if tree.contains(&edge.v) {
                edge_slack
            } else {
                -edge_slack
            };
            for v in &tree {
                if let Some(n) = g.node_mut(v) {
                    n.rank = n.rank.map(|r| r + delta);
                }
            }
        }
    }
}

fn grow_tight_tree(g: &LayoutGraph, tree: &mut HashSet<String>) -> usize {
    let mut stack: Vec<String> = tree.iter().cloned().collect();
    while let Some(v) = stack.pop() {
        for e in g.node_edges(&v) {
            let w = if e.v == v { &e.w } else { &e.v };
            if !tree.contains(w) && slack(g, &e) == 0 {
                tree.insert(w.clone());
                stack.push(w.clone());
            }
        }
    }
    tree.len()
}

fn find_min_slack_edge(g: &LayoutGraph, tree: &HashSet<String>) -> Option<(EdgeKey, i32)> {
    let mut best: Option<(EdgeKey, i32)> = None;
    for e in g.edges() {
        if tree.contains(&e.v) == tree.contains(&e.w) {
            continue;
        }
        let s = slack(g, e);
        if best.as_ref().is_none_or(|(_, b)| s < *b) {
            best = Some((e.clone(), s));
        }
    }
    best
}
