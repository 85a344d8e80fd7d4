//! Self loops take no part in ranking or ordering. They are set aside before layout and put back
//! once their node has a position, drawn as a small loop off the node's side.

use crate::graphlib::EdgeKey;
use crate::{EdgeLabel, LayoutGraph, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct SelfLoop {
    pub edge: EdgeKey,
    pub label: EdgeLabel,
}

pub fn remove(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        if !e.is_self_loop() {
            continue;
        }
        if let Some(label) = g.remove_edge_key(&e) {
            g.graph_mut().self_loops.push(SelfLoop { edge: e, label });
        }
    }
}

pub fn restore(g: &mut LayoutGraph) {
    let loops = std::mem::take(&mut g.graph_mut().self_loops);
    let extent = g.graph().edgesep.max(1.0);
    for SelfLoop { edge, mut label } in loops {
        label.points.clear();
        if let Some(n) = g.node(&edge.v) {
            if let (Some(x), Some(y)) = (n.x, n.y) {
                let side = x + n.width / 2.0;
                let dy = n.height / 4.0;
                label.points = vec![
                    Point { x: side, y: y - dy },
                    Point {
                        x: side + extent * 0.8,
                        y: y - dy,
                    },
                    Point {
                        x: side + extent,
                        y,
                    },
                    Point {
                        x: side + extent * 0.8,
                        y: y + dy,
                    },
                    Point { x: side, y: y + dy },
                ];
            }
        }
        g.set_edge_named(edge.v, edge.w, edge.name, Some(label));
    }
}
