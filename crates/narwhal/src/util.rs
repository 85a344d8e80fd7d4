//! Helpers shared by the layout stages.

use crate::{LayoutGraph, NodeLabel, Point};

/// Shifts ranks so the smallest one is 0.
pub fn normalize_ranks(g: &mut LayoutGraph) {
    let min = g
        .nodes()
        .filter_map(|v| g.node(v).and_then(|n| n.rank))
        .min()
        .unwrap_or(0);
    g.for_each_node_mut(|_id, n| {
        if let Some(r) = n.rank {
            n.rank = Some(r - min);
        }
    });
}

pub fn max_rank(g: &LayoutGraph) -> i32 {
    g.nodes()
        .filter_map(|v| g.node(v).and_then(|n| n.rank))
        .max()
        .unwrap_or(0)
}

/// Node ids grouped by rank, each layer sorted by `order` (insertion order for unordered nodes).
pub fn build_layer_matrix(g: &LayoutGraph) -> Vec<Vec<String>> {
    let len = usize::try_from(max_rank(g) + 1).unwrap_or(0);
    let mut layering: Vec<Vec<(usize, String)>> = vec![Vec::new(); len];
    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let Some(rank) = n.rank.and_then(|r| usize::try_from(r).ok()) else {
            continue;
        };
        if let Some(layer) = layering.get_mut(rank) {
            layer.push((n.order.unwrap_or(usize::MAX), v.to_string()));
        }
    }
    layering
        .into_iter()
        .map(|mut layer| {
            layer.sort_by_key(|(order, _)| *order);
            layer.into_iter().map(|(_, v)| v).collect()
        })
        .collect()
}

/// Moves the drawing so its top-left corner sits at the graph margins and records the extent.
pub fn translate_graph(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let (Some(x), Some(y)) = (n.x, n.y) else {
            continue;
        };
        min_x = min_x.min(x - n.width / 2.0);
        max_x = max_x.max(x + n.width / 2.0);
        min_y = min_y.min(y - n.height / 2.0);
        max_y = max_y.max(y + n.height / 2.0);
    }
    for key in g.edges() {
        let Some(e) = g.edge_by_key(key) else {
            continue;
        };
        for p in &e.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }

    let marginx = g.graph().marginx;
    let marginy = g.graph().marginy;
    if !min_x.is_finite() {
        let graph = g.graph_mut();
        graph.width = 2.0 * marginx;
        graph.height = 2.0 * marginy;
        return;
    }

    let dx = marginx - min_x;
    let dy = marginy - min_y;
    g.for_each_node_mut(|_id, n| {
        n.x = n.x.map(|x| x + dx);
        n.y = n.y.map(|y| y + dy);
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });

    let graph = g.graph_mut();
    graph.width = max_x - min_x + 2.0 * marginx;
    graph.height = max_y - min_y + 2.0 * marginy;
}

/// Clips every edge polyline to the boundaries of its end nodes.
pub fn assign_node_intersects(g: &mut LayoutGraph) {
    for key in g.edge_keys() {
        if key.is_self_loop() {
            continue;
        }
        let (Some(v), Some(w)) = (g.node(&key.v).cloned(), g.node(&key.w).cloned()) else {
            continue;
        };
        let (Some(v_center), Some(w_center)) = (center(&v), center(&w)) else {
            continue;
        };
        let Some(e) = g.edge_mut_by_key(&key) else {
            continue;
        };
        let towards_v = e.points.first().copied().unwrap_or(w_center);
        let towards_w = e.points.last().copied().unwrap_or(v_center);
        e.points.insert(0, intersect_rect(&v, towards_v));
        e.points.push(intersect_rect(&w, towards_w));
    }
}

fn center(n: &NodeLabel) -> Option<Point> {
    Some(Point { x: n.x?, y: n.y? })
}

/// Point where the segment from the center of `node` to `point` leaves the node's rectangle.
/// Returns the center itself when `point` coincides with it.
pub fn intersect_rect(node: &NodeLabel, point: Point) -> Point {
    let x = node.x.unwrap_or(0.0);
    let y = node.y.unwrap_or(0.0);
    let dx = point.x - x;
    let dy = point.y - y;
    let mut w = node.width / 2.0;
    let mut h = node.height / 2.0;

    if dx == 0.0 && dy == 0.0 {
        return Point { x, y };
    }

    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        (h * dx / dy, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        (w, if dx == 0.0 { 0.0 } else { w * dy / dx })
    };

    Point {
        x: x + sx,
        y: y + sy,
    }
}
