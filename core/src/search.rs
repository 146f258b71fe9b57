use std::collections::HashMap;

use crate::graph::SearchGraph;
use crate::heap::IndexedMinHeap;

/// Default heuristic: the node's `dist` already is the remaining-cost
/// estimate, so it is returned unchanged.
pub fn manhattan(dist: f64) -> f64 {
    dist
}

/// Result of [`search_detailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<N> {
    /// Nodes from start (exclusive) to goal (inclusive). Empty when no path
    /// exists, and also when start and goal are the same node.
    pub path: Vec<N>,
    /// `g` of the goal when it was reached; `Some(0.0)` for start == goal.
    pub cost: Option<f64>,
    /// Nodes popped and expanded (closed).
    pub expanded: usize,
    /// Nodes that received search state, start included.
    pub discovered: usize,
}

impl<N> SearchOutcome<N> {
    pub fn found(&self) -> bool {
        self.cost.is_some()
    }
}

/// Transient per-node search state, one slot per discovered node.
#[derive(Debug)]
struct NodeState<N> {
    node: N,
    g: f64,
    /// Computed at most once per search.
    h: Option<f64>,
    f: f64,
    closed: bool,
    /// Slot of the predecessor on the best known path.
    parent: Option<usize>,
}

impl<N> NodeState<N> {
    fn new(node: N) -> Self {
        Self {
            node,
            g: 0.0,
            h: None,
            f: 0.0,
            closed: false,
            parent: None,
        }
    }
}

/// A* search from `start` to `goal`.
///
/// Returns the path excluding `start` and including `goal`, or an empty
/// vector when the goal is unreachable (or equal to `start`). `diagonal` is
/// passed through to [`SearchGraph::neighbors`]. `heuristic` receives each
/// node's [`SearchGraph::dist`] and is called at most once per node.
///
/// Optimal when costs are non-negative and the heuristic is admissible and
/// consistent; neither is checked.
pub fn search<G, H>(
    graph: &G,
    start: G::Node,
    goal: G::Node,
    diagonal: bool,
    heuristic: H,
) -> Vec<G::Node>
where
    G: SearchGraph + ?Sized,
    H: FnMut(G::Dist) -> f64,
{
    search_detailed(graph, start, goal, diagonal, heuristic).path
}

/// [`search`], also reporting the path cost and how much of the graph was touched.
pub fn search_detailed<G, H>(
    graph: &G,
    start: G::Node,
    goal: G::Node,
    diagonal: bool,
    mut heuristic: H,
) -> SearchOutcome<G::Node>
where
    G: SearchGraph + ?Sized,
    H: FnMut(G::Dist) -> f64,
{
    // node → slot in `states`; a node is visited iff it has a slot.
    let mut slots: HashMap<G::Node, usize> = HashMap::new();
    let mut states: Vec<NodeState<G::Node>> = Vec::new();
    let mut open = IndexedMinHeap::new();
    let mut neighbors: Vec<G::Node> = Vec::new();
    let mut expanded = 0;

    slots.insert(start, 0);
    states.push(NodeState::new(start));
    open.push(0, |id| states[id].f);

    while let Some(current) = open.pop_min(|id| states[id].f) {
        let node = states[current].node;

        if node == goal {
            let path = reconstruct_path(&states, current);
            let cost = states[current].g;
            tracing::debug!(
                ?start,
                ?goal,
                path_len = path.len(),
                cost,
                expanded,
                discovered = states.len(),
                "path found"
            );
            return SearchOutcome {
                path,
                cost: Some(cost),
                expanded,
                discovered: states.len(),
            };
        }

        states[current].closed = true;
        expanded += 1;
        let current_g = states[current].g;
        tracing::trace!(?node, g = current_g, f = states[current].f, "expanding");

        neighbors.clear();
        graph.neighbors(node, diagonal, &mut neighbors);

        for &neighbor in &neighbors {
            let slot = slots.get(&neighbor).copied();
            if slot.is_some_and(|id| states[id].closed) || graph.is_wall(neighbor) {
                continue;
            }

            let g = current_g + graph.cost(neighbor);
            let id = match slot {
                Some(id) if g < states[id].g => id,
                Some(_) => continue,
                None => {
                    let id = states.len();
                    states.push(NodeState::new(neighbor));
                    slots.insert(neighbor, id);
                    id
                }
            };

            let state = &mut states[id];
            let h = *state
                .h
                .get_or_insert_with(|| heuristic(graph.dist(neighbor)));
            state.parent = Some(current);
            state.g = g;
            state.f = g + h;

            if slot.is_none() {
                open.push(id, |id| states[id].f);
            } else {
                open.rescore(id, |id| states[id].f);
            }
        }
    }

    tracing::debug!(
        ?start,
        ?goal,
        expanded,
        discovered = states.len(),
        "no path"
    );
    SearchOutcome {
        path: Vec::new(),
        cost: None,
        expanded,
        discovered: states.len(),
    }
}

/// Walk parent links from `end` back to the parentless start; the start
/// itself is not included.
fn reconstruct_path<N: Copy>(states: &[NodeState<N>], end: usize) -> Vec<N> {
    let mut path = Vec::new();
    let mut current = end;

    while let Some(parent) = states[current].parent {
        path.push(states[current].node);
        current = parent;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, NodeInfo};

    /// Undirected chain 0..n with unit costs; estimates count down to the last node.
    fn make_chain(n: u64) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_node(i, NodeInfo::open(1.0, (n - 1 - i) as f64)).unwrap();
        }
        for i in 1..n {
            g.connect(i - 1, i).unwrap();
        }
        g
    }

    /// Two routes from 0 to 3, through 1 or through 2, with the given entry costs.
    fn make_diamond(cost_1: f64, cost_2: f64) -> Graph {
        let mut g = Graph::new();
        g.add_node(0, NodeInfo::open(1.0, 0.0)).unwrap();
        g.add_node(1, NodeInfo::open(cost_1, 0.0)).unwrap();
        g.add_node(2, NodeInfo::open(cost_2, 0.0)).unwrap();
        g.add_node(3, NodeInfo::open(1.0, 0.0)).unwrap();
        g.load_edges(vec![(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
        g
    }

    #[test]
    fn test_chain_path() {
        let g = make_chain(6);
        let path = search(&g, 0, 5, false, manhattan);
        assert_eq!(path, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_start_equals_goal_is_empty() {
        let g = make_chain(3);
        let outcome = search_detailed(&g, 1, 1, false, manhattan);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.cost, Some(0.0));
        assert_eq!(outcome.expanded, 0);
    }

    #[test]
    fn test_no_path() {
        let mut g = Graph::new();
        g.add_node(0, NodeInfo::open(1.0, 0.0)).unwrap();
        g.add_node(1, NodeInfo::open(1.0, 0.0)).unwrap();
        let outcome = search_detailed(&g, 0, 1, false, manhattan);
        assert!(outcome.path.is_empty());
        assert!(!outcome.found());
        assert_eq!(outcome.expanded, 1);
    }

    #[test]
    fn test_directed_edges_respected() {
        let mut g = Graph::new();
        for id in 0..3 {
            g.add_node(id, NodeInfo::open(1.0, 0.0)).unwrap();
        }
        g.load_edges(vec![(0, 1), (1, 2)]).unwrap();
        assert_eq!(search(&g, 0, 2, false, manhattan), vec![1, 2]);
        assert!(search(&g, 2, 0, false, manhattan).is_empty());
    }

    #[test]
    fn test_prefers_cheaper_route() {
        let g = make_diamond(10.0, 2.0);
        let outcome = search_detailed(&g, 0, 3, false, manhattan);
        assert_eq!(outcome.path, vec![2, 3]);
        assert_eq!(outcome.cost, Some(3.0));
    }

    #[test]
    fn test_goal_wall_unreachable() {
        let mut g = make_chain(4);
        g.add_node(3, NodeInfo::wall()).unwrap();
        assert!(search(&g, 0, 3, false, manhattan).is_empty());
    }

    #[test]
    fn test_wall_blocks_chain() {
        let mut g = make_chain(5);
        g.add_node(2, NodeInfo::wall()).unwrap();
        let outcome = search_detailed(&g, 0, 4, false, manhattan);
        assert!(outcome.path.is_empty());
        // Only 0 and 1 are reachable.
        assert_eq!(outcome.expanded, 2);
        assert_eq!(outcome.discovered, 2);
    }

    /// 0→5→3 is explored first because 1 carries a pessimistic estimate and 3
    /// an inflated one; 0→1→2→3 then improves 3 while it is still open.
    fn make_detour() -> Graph {
        let mut g = Graph::new();
        g.add_node(0, NodeInfo::open(1.0, 0.0)).unwrap();
        g.add_node(1, NodeInfo::open(1.0, 2.5)).unwrap();
        g.add_node(2, NodeInfo::open(1.0, 0.0)).unwrap();
        g.add_node(3, NodeInfo::open(1.0, 10.0)).unwrap();
        g.add_node(4, NodeInfo::open(1.0, 0.0)).unwrap();
        g.add_node(5, NodeInfo::open(3.0, 0.0)).unwrap();
        g.load_edges(vec![(0, 5), (0, 1), (5, 3), (1, 2), (2, 3), (3, 4)])
            .unwrap();
        g
    }

    #[test]
    fn test_rescore_improves_open_node() {
        let g = make_detour();
        let outcome = search_detailed(&g, 0, 4, false, manhattan);
        assert_eq!(outcome.path, vec![1, 2, 3, 4]);
        assert_eq!(outcome.cost, Some(4.0));
    }

    #[test]
    fn test_heuristic_cached_once_per_node() {
        let g = make_detour();
        let mut calls: Vec<f64> = Vec::new();
        let path = search(&g, 0, 4, false, |dist: f64| {
            calls.push(dist);
            dist
        });
        assert_eq!(path, vec![1, 2, 3, 4]);
        // 5, 1, 3, 2, 4 are each estimated once; improving 3 reuses its estimate.
        assert_eq!(calls, vec![0.0, 2.5, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_diagonal_hint_ignored_by_graph() {
        let g = make_chain(4);
        assert_eq!(
            search(&g, 0, 3, true, manhattan),
            search(&g, 0, 3, false, manhattan)
        );
    }

    #[test]
    fn test_unknown_start() {
        let g = make_chain(3);
        let outcome = search_detailed(&g, 99, 2, false, manhattan);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.discovered, 1);
    }
}
