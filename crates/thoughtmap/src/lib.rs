#![forbid(unsafe_code)]

//! Thought-map layout.
//!
//! Nodes carry a text label, edges connect node ids. [`layouted_elements`] sizes every node from
//! its label, runs a layered layout and returns the nodes with a top-left `position` suitable for
//! placing them on a canvas.

pub mod config;
pub mod expand;
pub mod layout;
pub mod model;
pub mod sizing;
pub mod tree;

pub use config::{DanglingEdgePolicy, LayoutConfig, LayoutSettings};
pub use layout::{LayoutOptions, layouted_elements};
pub use model::{Elements, FlowEdge, FlowNode, LayoutedElements, LayoutedNode, Position};
pub use narwhal::{RankDir, Ranker};
pub use sizing::{FixedWidthSizer, LabelSizer, NodeSize};
pub use tree::ThoughtTree;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node at index {index} has an empty id")]
    EmptyNodeId { index: usize },
    #[error("edge {source_id} -> {target_id} references a node that does not exist")]
    DanglingEdge {
        source_id: String,
        target_id: String,
    },
    #[error("unknown node: {id}")]
    UnknownNode { id: String },
    #[error("node {id} has an invalid size {width}x{height}; both must be finite and positive")]
    InvalidNodeSize { id: String, width: f64, height: f64 },
    #[error("layout produced no position for node {id}")]
    MissingPosition { id: String },
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
