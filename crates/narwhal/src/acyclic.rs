//! Break cycles by reversing a feedback arc set found with a depth-first search.

use crate::graphlib::EdgeKey;
use crate::LayoutGraph;
use std::collections::BTreeSet;

pub fn run(g: &mut LayoutGraph) {
    let fas = dfs_fas(g);
    for e in fas.into_iter().filter(|e| !e.is_self_loop()) {
        let Some(mut label) = g.remove_edge_key(&e) else {
            continue;
        };
        label.forward_name = e.name.clone();
        label.reversed = true;

        let name = unique_rev_name(g, &e.w, &e.v);
        g.set_edge_named(e.w, e.v, Some(name), Some(label));
    }
}

pub fn undo(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        if !g.edge_by_key(&e).is_some_and(|l| l.reversed) {
            continue;
        }
        let Some(mut label) = g.remove_edge_key(&e) else {
            continue;
        };
        let forward_name = label.forward_name.take();
        label.reversed = false;
        label.points.reverse();
        g.set_edge_named(e.w, e.v, forward_name, Some(label));
    }
}

fn unique_rev_name(g: &LayoutGraph, v: &str, w: &str) -> String {
    let mut i = 1usize;
    loop {
        let candidate = format!("rev{i}");
        if !g.has_edge(v, w, Some(&candidate)) {
            return candidate;
        }
        i += 1;
    }
}

/// Back edges of a DFS started from every node in insertion order.
pub fn dfs_fas(g: &LayoutGraph) -> Vec<EdgeKey> {
    struct Frame {
        v: String,
        edges: Vec<EdgeKey>,
        next_edge: usize,
    }

    let mut fas: Vec<EdgeKey> = Vec::new();
    let mut on_stack: BTreeSet<String> = BTreeSet::new();
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    for root in g.nodes() {
        if !visited.insert(root.to_string()) {
            continue;
        }
        on_stack.insert(root.to_string());
        stack.push(Frame {
            v: root.to_string(),
            edges: g.out_edges(root, None),
            next_edge: 0,
        });

        while let Some(top) = stack.last_mut() {
            let Some(e) = top.edges.get(top.next_edge).cloned() else {
                on_stack.remove(&top.v);
                stack.pop();
                continue;
            };
            top.next_edge += 1;

            if e.is_self_loop() {
                continue;
            }
            if on_stack.contains(&e.w) {
                fas.push(e);
            } else if visited.insert(e.w.clone()) {
                on_stack.insert(e.w.clone());
                stack.push(Frame {
                    edges: g.out_edges(&e.w, None),
                    v: e.w,
                    next_edge: 0,
                });
            }
        }
    }
    fas
}
