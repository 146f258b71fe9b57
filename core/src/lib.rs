//! astar-core: A* shortest-path search kernel.
//!
//! A pure Rust library that finds minimum-cost paths over any graph exposing
//! the [`SearchGraph`] capabilities (neighbor enumeration, walls, entry costs,
//! heuristic input). The engine keeps all per-search state in a table it owns,
//! so graphs are only borrowed and can be searched repeatedly or from several
//! threads at once.
//!
//! Two graph types ship with the crate: an adjacency-list [`Graph`] with
//! precomputed per-node estimates, and a weighted 2D [`Grid`].

mod error;
mod graph;
pub mod grid;
mod heap;
mod search;

pub use error::{GraphError, GridError};
pub use graph::{Graph, NodeId, NodeInfo, SearchGraph};
pub use grid::{Grid, GridPos};
pub use heap::IndexedMinHeap;
pub use search::{manhattan, search, search_detailed, SearchOutcome};
