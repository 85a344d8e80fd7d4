use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

#[derive(Debug, Clone)]
struct AdjCache {
    generation: u64,
    out: Vec<Vec<usize>>,
    in_: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, Hash)]
struct EdgeKeyView<'a> {
    v: &'a str,
    w: &'a str,
    name: Option<&'a str>,
}

impl hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    /// Allow several edges between the same pair of nodes, distinguished by name.
    pub multigraph: bool,
}

#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.v == self.w
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v && self.w == other.w && self.name == other.name
    }
}

impl Eq for EdgeKey {}

// Must hash exactly like `EdgeKeyView` so view lookups hit.
impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.as_str().hash(state);
        self.w.as_str().hash(state);
        self.name.as_deref().hash(state);
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    graph_label: G,
    default_node_label: Box<dyn Fn() -> N + Send + Sync>,
    default_edge_label: Box<dyn Fn() -> E + Send + Sync>,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    // Layout passes query adjacency far more often than they mutate the graph, so adjacency is
    // rebuilt lazily after a mutation bumps the generation.
    adj_gen: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            default_node_label: Box::new(N::default),
            default_edge_label: Box::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            adj_gen: 0,
            adj_cache: RefCell::new(None),
        }
    }

    fn invalidate_adj(&mut self) {
        self.adj_gen = self.adj_gen.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn build_adj(&self) -> AdjCache {
        let mut out: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut in_: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (edge_idx, e) in self.edges.iter().enumerate() {
            let (Some(&v_idx), Some(&w_idx)) =
                (self.node_index.get(&e.key.v), self.node_index.get(&e.key.w))
            else {
                continue;
            };
            out[v_idx].push(edge_idx);
            in_[w_idx].push(edge_idx);
        }
        AdjCache {
            generation: self.adj_gen,
            out,
            in_,
        }
    }

    fn with_adj<R>(&self, f: impl FnOnce(&AdjCache) -> R) -> R {
        let mut cache = self.adj_cache.borrow_mut();
        if cache.as_ref().is_some_and(|c| c.generation != self.adj_gen) {
            *cache = None;
        }
        let adj = cache.get_or_insert_with(|| self.build_adj());
        f(adj)
    }

    fn edge_key_view<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyView<'a> {
        let name = if self.options.multigraph { name } else { None };
        EdgeKeyView { v, w, name }
    }

    fn edge_index_of(&self, view: EdgeKeyView<'_>) -> Option<usize> {
        self.edge_index.get(&view).copied()
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn set_default_node_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.default_node_label = Box::new(f);
        self
    }

    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Box::new(f);
        self
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one (keeping its position in the
    /// insertion order).
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        self.invalidate_adj();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        let label = (self.default_node_label)();
        self.set_node(id, label)
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        self.remove_nodes(&[id]) == 1
    }

    /// Removes every listed node and its incident edges, reindexing once. Unknown ids are
    /// ignored; returns how many nodes were removed.
    pub fn remove_nodes<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let mut doomed: HashSet<&str> = HashSet::default();
        for id in ids {
            let id = id.as_ref();
            if self.node_index.remove(id).is_some() {
                doomed.insert(id);
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        self.invalidate_adj();
        self.nodes.retain(|n| !doomed.contains(n.id.as_str()));
        for (i, n) in self.nodes.iter().enumerate() {
            if let Some(slot) = self.node_index.get_mut(n.id.as_str()) {
                *slot = i;
            }
        }

        let incident = |key: &EdgeKey| {
            doomed.contains(key.v.as_str()) || doomed.contains(key.w.as_str())
        };
        let before = self.edges.len();
        for e in &self.edges {
            if incident(&e.key) {
                let _ = self.edge_index.remove_entry(&e.key);
            }
        }
        self.edges.retain(|e| !incident(&e.key));
        if self.edges.len() != before {
            for (i, e) in self.edges.iter().enumerate() {
                if let Some(slot) = self.edge_index.get_mut(&e.key) {
                    *slot = i;
                }
            }
        }
        doomed.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.label);
        }
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    /// Inserts an edge, creating missing endpoints with the default node label. Setting an
    /// existing edge replaces its label only when one is given.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

        let name = if self.options.multigraph {
            name.map(Into::into)
        } else {
            None
        };
        let key = EdgeKey { v, w, name };

        if let Some(&idx) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        self.invalidate_adj();
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_else(|| (self.default_edge_label)()),
        });
        self.edge_index.insert(key, idx);
        self
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_index_of(self.edge_key_view(v, w, name)).is_some()
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let idx = self.edge_index_of(self.edge_key_view(v, w, name))?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let idx = self.edge_index_of(self.edge_key_view(v, w, name))?;
        Some(&mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let idx = self.edge_index_of(self.edge_key_view(&key.v, &key.w, key.name.as_deref()))?;
        Some(&mut self.edges[idx].label)
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> Option<E> {
        let idx = self.edge_index_of(self.edge_key_view(&key.v, &key.w, key.name.as_deref()))?;
        self.invalidate_adj();
        let _ = self.edge_index.remove_entry(&self.edges[idx].key);
        let entry = self.edges.remove(idx);
        for i in idx..self.edges.len() {
            if let Some(slot) = self.edge_index.get_mut(&self.edges[i].key) {
                *slot = i;
            }
        }
        Some(entry.label)
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            let mut out: Vec<&str> = Vec::with_capacity(adj.out[v_idx].len());
            for &edge_idx in &adj.out[v_idx] {
                let w = self.edges[edge_idx].key.w.as_str();
                if !out.contains(&w) {
                    out.push(w);
                }
            }
            out
        })
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            let mut out: Vec<&str> = Vec::with_capacity(adj.in_[v_idx].len());
            for &edge_idx in &adj.in_[v_idx] {
                let u = self.edges[edge_idx].key.v.as_str();
                if !out.contains(&u) {
                    out.push(u);
                }
            }
            out
        })
    }

    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let mut out = self.predecessors(v);
        for w in self.successors(v) {
            if !out.contains(&w) {
                out.push(w);
            }
        }
        out
    }

    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.out[v_idx]
                .iter()
                .map(|&i| &self.edges[i].key)
                .filter(|k| w.is_none_or(|w| k.w == w))
                .cloned()
                .collect()
        })
    }

    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.in_[v_idx]
                .iter()
                .map(|&i| &self.edges[i].key)
                .filter(|k| u.is_none_or(|u| k.v == u))
                .cloned()
                .collect()
        })
    }

    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let mut out = self.in_edges(v, None);
        for e in self.out_edges(v, None) {
            if !out.contains(&e) {
                out.push(e);
            }
        }
        out
    }

    pub fn sources(&self) -> Vec<&str> {
        self.with_adj(|adj| {
            self.nodes
                .iter()
                .enumerate()
                .filter(|(i, _)| adj.in_[*i].is_empty())
                .map(|(_, n)| n.id.as_str())
                .collect()
        })
    }

    pub fn sinks(&self) -> Vec<&str> {
        self.with_adj(|adj| {
            self.nodes
                .iter()
                .enumerate()
                .filter(|(i, _)| adj.out[*i].is_empty())
                .map(|(_, n)| n.id.as_str())
                .collect()
        })
    }
}

pub mod alg {
    use super::Graph;
    use std::collections::{BTreeMap, BTreeSet, VecDeque};

    pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut out: Vec<String> = Vec::new();
        let mut stack: Vec<(Vec<&str>, usize)> = Vec::new();
        for &r in roots {
            if !g.has_node(r) || !visited.insert(r.to_string()) {
                continue;
            }
            out.push(r.to_string());
            stack.push((g.successors(r), 0));
            while let Some((succ, next)) = stack.last_mut() {
                let Some(&w) = succ.get(*next) else {
                    stack.pop();
                    continue;
                };
                *next += 1;
                if visited.insert(w.to_string()) {
                    out.push(w.to_string());
                    stack.push((g.successors(w), 0));
                }
            }
        }
        out
    }

    /// Weakly connected components, each in discovery order.
    pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut out: Vec<Vec<String>> = Vec::new();

        for start in g.node_ids() {
            if !seen.insert(start.clone()) {
                continue;
            }
            let mut comp: Vec<String> = Vec::new();
            let mut q: VecDeque<String> = VecDeque::new();
            q.push_back(start);
            while let Some(v) = q.pop_front() {
                for n in g.neighbors(&v) {
                    if seen.insert(n.to_string()) {
                        q.push_back(n.to_string());
                    }
                }
                comp.push(v);
            }
            out.push(comp);
        }

        out
    }

    /// Strongly connected components with more than one node, plus self loops.
    pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        struct Tarjan<'a, N, E, G>
        where
            N: Default + 'static,
            E: Default + 'static,
            G: Default,
        {
            g: &'a Graph<N, E, G>,
            index: usize,
            stack: Vec<String>,
            on_stack: BTreeSet<String>,
            indices: BTreeMap<String, usize>,
            lowlink: BTreeMap<String, usize>,
            sccs: Vec<Vec<String>>,
        }

        impl<'a, N, E, G> Tarjan<'a, N, E, G>
        where
            N: Default + 'static,
            E: Default + 'static,
            G: Default,
        {
            fn low(&self, v: &str) -> usize {
                self.lowlink.get(v).copied().unwrap_or(usize::MAX)
            }

            fn set_low(&mut self, v: &str, candidate: usize) {
                let low = self.low(v).min(candidate);
                self.lowlink.insert(v.to_string(), low);
            }

            fn enter(&mut self, v: &str) {
                self.indices.insert(v.to_string(), self.index);
                self.lowlink.insert(v.to_string(), self.index);
                self.index += 1;
                self.stack.push(v.to_string());
                self.on_stack.insert(v.to_string());
            }

            fn strongconnect(&mut self, root: &'a str) {
                let g = self.g;
                self.enter(root);
                let mut frames: Vec<(&'a str, Vec<&'a str>, usize)> =
                    vec![(root, g.successors(root), 0)];

                while let Some((v, succ, next)) = frames.last_mut() {
                    let v: &'a str = *v;
                    if let Some(&w) = succ.get(*next) {
                        *next += 1;
                        if !self.indices.contains_key(w) {
                            self.enter(w);
                            frames.push((w, g.successors(w), 0));
                        } else if self.on_stack.contains(w) {
                            let w_idx = self.indices.get(w).copied().unwrap_or(usize::MAX);
                            self.set_low(v, w_idx);
                        }
                        continue;
                    }
                    frames.pop();

                    if Some(&self.low(v)) == self.indices.get(v) {
                        let mut scc: Vec<String> = Vec::new();
                        while let Some(w) = self.stack.pop() {
                            self.on_stack.remove(&w);
                            let done = w == v;
                            scc.push(w);
                            if done {
                                break;
                            }
                        }
                        self.sccs.push(scc);
                    }
                    if let Some(&(parent, _, _)) = frames.last() {
                        self.set_low(parent, self.low(v));
                    }
                }
            }
        }

        let node_ids = g.node_ids();
        let mut tarjan = Tarjan {
            g,
            index: 0,
            stack: Vec::new(),
            on_stack: BTreeSet::new(),
            indices: BTreeMap::new(),
            lowlink: BTreeMap::new(),
            sccs: Vec::new(),
        };
        for v in g.nodes() {
            if !tarjan.indices.contains_key(v) {
                tarjan.strongconnect(v);
            }
        }

        let order: BTreeMap<&str, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(i, v)| (v.as_str(), i))
            .collect();
        let mut cycles: Vec<Vec<String>> = Vec::new();
        for mut scc in tarjan.sccs {
            if scc.len() > 1 {
                scc.sort_by_key(|v| order.get(v.as_str()).copied().unwrap_or(usize::MAX));
                cycles.push(scc);
            } else if !g.out_edges(&scc[0], Some(&scc[0])).is_empty() {
                cycles.push(scc);
            }
        }

        cycles.sort_by_key(|c| {
            c.first()
                .and_then(|v| order.get(v.as_str()).copied())
                .unwrap_or(usize::MAX)
        });
        cycles
    }
}
