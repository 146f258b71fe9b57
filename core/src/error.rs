use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while building a [`Graph`](crate::Graph).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),
    #[error("node {node} has invalid cost {cost} (must be finite and non-negative)")]
    InvalidCost { node: NodeId, cost: f64 },
    #[error("node {node} has invalid estimate {estimate} (must be finite and non-negative)")]
    InvalidEstimate { node: NodeId, estimate: f64 },
}

/// Errors raised while building or editing a [`Grid`](crate::Grid).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) has invalid weight {weight} (must be finite and non-negative)")]
    InvalidWeight { x: usize, y: usize, weight: f64 },
    #[error("unexpected character {ch:?} at line {line}, column {column}")]
    InvalidCell {
        line: usize,
        column: usize,
        ch: char,
    },
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
