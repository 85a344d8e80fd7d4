use crate::expand::ExpandRequest;
use crate::model::{FlowEdge, FlowNode};
use crate::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThoughtNode {
    pub id: String,
    pub label: String,
    pub parent: Option<String>,
}

/// A question and the ideas grown from it.
///
/// Node ids are sequential integers rendered as strings, starting with the root at `"0"`.
#[derive(Debug, Clone)]
pub struct ThoughtTree {
    nodes: Vec<ThoughtNode>,
    index: HashMap<String, usize>,
}

impl ThoughtTree {
    pub const ROOT_ID: &'static str = "0";

    pub fn new(root_label: impl Into<String>) -> Self {
        let root = ThoughtNode {
            id: Self::ROOT_ID.to_string(),
            label: root_label.into(),
            parent: None,
        };
        Self {
            index: HashMap::from([(root.id.clone(), 0)]),
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> &ThoughtNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: &str) -> Option<&ThoughtNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ThoughtNode> {
        self.nodes.iter()
    }

    pub fn children(&self, id: &str) -> Vec<&ThoughtNode> {
        self.nodes
            .iter()
            .filter(|n| n.parent.as_deref() == Some(id))
            .collect()
    }

    /// Appends one child of `parent_id` per non-blank idea and returns the new ids.
    pub fn expand<I, S>(&mut self, parent_id: &str, ideas: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.index.contains_key(parent_id) {
            return Err(Error::UnknownNode {
                id: parent_id.to_string(),
            });
        }

        let mut added = Vec::new();
        for idea in ideas {
            let label: String = idea.into();
            if label.trim().is_empty() {
                continue;
            }
            let id = self.nodes.len().to_string();
            self.index.insert(id.clone(), self.nodes.len());
            self.nodes.push(ThoughtNode {
                id: id.clone(),
                label,
                parent: Some(parent_id.to_string()),
            });
            added.push(id);
        }
        tracing::debug!(parent = parent_id, added = added.len(), "expanded thought");
        Ok(added)
    }

    /// Nodes from the root down to `id`.
    pub fn path(&self, id: &str) -> Result<Vec<&ThoughtNode>> {
        let mut cur = self.get(id).ok_or_else(|| Error::UnknownNode { id: id.to_string() })?;
        let mut path = vec![cur];
        while let Some(parent) = cur.parent.as_deref().and_then(|p| self.get(p)) {
            path.push(parent);
            cur = parent;
        }
        path.reverse();
        Ok(path)
    }

    pub fn context_path(&self, id: &str) -> Result<String> {
        let labels: Vec<&str> = self.path(id)?.iter().map(|n| n.label.as_str()).collect();
        Ok(labels.join(" -> "))
    }

    pub fn expand_request(&self, id: &str) -> Result<ExpandRequest> {
        let context = self.context_path(id)?;
        let question = self.get(id).map(|n| n.label.clone()).unwrap_or_default();
        Ok(ExpandRequest { context, question })
    }

    /// Nodes and parent-to-child edges, ready for [`crate::layouted_elements`].
    pub fn elements(&self) -> (Vec<FlowNode>, Vec<FlowEdge>) {
        let nodes = self
            .nodes
            .iter()
            .map(|n| FlowNode::new(n.id.clone(), n.label.clone()))
            .collect();
        let edges = self
            .nodes
            .iter()
            .filter_map(|n| {
                let parent = n.parent.as_deref()?;
                Some(
                    FlowEdge::new(parent, n.id.clone()).with_id(format!("e{parent}-{}", n.id)),
                )
            })
            .collect();
        (nodes, edges)
    }
}
