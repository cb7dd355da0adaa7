//! Path search between two nodes of a [`Tree`].
//!
//! The tree is treated as an undirected graph: from any node the search may
//! move down into a child or up into the parent. A tree has exactly one
//! simple path between two nodes, so whatever the search finds is that path.
//!
//! Results are ordered from the end node back to the start node, which is
//! the order the frames unwind in. Callers that want start -> end reverse it
//! (see [`crate::writer::PathWriter`]).

use crate::error::PathError;
use crate::record::NodeId;
use crate::tree::{Node, NodeIndex, Tree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a path is located once both endpoints are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    /// Depth-first search from the start node, children first, then the parent.
    #[default]
    DepthFirst,
    /// Lift both endpoints through their parents up to the lowest common ancestor.
    AncestorWalk,
}

impl FromStr for PathStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" | "depth_first" => Ok(PathStrategy::DepthFirst),
            "ancestor" | "ancestor_walk" => Ok(PathStrategy::AncestorWalk),
            _ => Err(anyhow::anyhow!("unknown path strategy '{}' (expected dfs or ancestor)", s)),
        }
    }
}

impl fmt::Display for PathStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStrategy::DepthFirst => f.write_str("dfs"),
            PathStrategy::AncestorWalk => f.write_str("ancestor"),
        }
    }
}

/// Finds the path from `start` to `end`, ordered end -> start.
///
/// Returns an empty vector if either id is absent from the tree.
pub fn find_path(tree: &Tree, start: NodeId, end: NodeId) -> Vec<NodeId> {
    find_path_with(tree, start, end, PathStrategy::DepthFirst)
}

/// Same as [`find_path`] with an explicit strategy.
pub fn find_path_with(tree: &Tree, start: NodeId, end: NodeId, strategy: PathStrategy) -> Vec<NodeId> {
    match try_find_path_with(tree, start, end, strategy) {
        Ok(path) => path,
        Err(err) => {
            log::debug!("query {} -> {}: {}", start, end, err);
            Vec::new()
        }
    }
}

/// Finds the path from `start` to `end`, ordered end -> start.
///
/// Fails with [`PathError::NodeNotFound`] naming the first absent endpoint
/// (start is checked before end). An empty vector means both nodes exist but
/// are not connected.
pub fn try_find_path(tree: &Tree, start: NodeId, end: NodeId) -> Result<Vec<NodeId>, PathError> {
    try_find_path_with(tree, start, end, PathStrategy::DepthFirst)
}

/// Same as [`try_find_path`] with an explicit strategy.
pub fn try_find_path_with(
    tree: &Tree,
    start: NodeId,
    end: NodeId,
    strategy: PathStrategy,
) -> Result<Vec<NodeId>, PathError> {
    log::debug!("source {} target {}", start, end);

    let start_index = tree.find_node(start).ok_or(PathError::NodeNotFound(start))?;
    let end_index = tree.find_node(end).ok_or(PathError::NodeNotFound(end))?;

    let path = match strategy {
        PathStrategy::DepthFirst => depth_first(tree.nodes(), start_index, end),
        PathStrategy::AncestorWalk => ancestor_walk(tree.nodes(), start_index, end_index),
    };

    Ok(path.unwrap_or_default())
}

/// One entry of the explicit search stack.
struct Frame {
    index: NodeIndex,
    /// Next position in the node's child list to try.
    next_child: usize,
    parent_tried: bool,
}

impl Frame {
    fn new(index: NodeIndex) -> Self {
        Frame { index, next_child: 0, parent_tried: false }
    }
}

/// Depth-first search from `start` over child and parent edges.
///
/// Each node is visited at most once. The stack always holds the chain of
/// nodes from `start` to the node being explored, so when the target is
/// reached the stack read top-down is the path end -> start.
fn depth_first(nodes: &[Node], start: NodeIndex, target: NodeId) -> Option<Vec<NodeId>> {
    let mut visited = vec![false; nodes.len()];
    let mut stack = vec![Frame::new(start)];
    visited[start] = true;

    if nodes[start].id() == target {
        log::trace!("found {} at search start", target);
        return Some(unwind(nodes, &stack));
    }

    while let Some(frame) = stack.last_mut() {
        let node = &nodes[frame.index];

        let mut step = None;
        while let Some(&child) = node.children().get(frame.next_child) {
            frame.next_child += 1;
            if !visited[child] {
                step = Some(child);
                break;
            }
        }

        if step.is_none() && !frame.parent_tried {
            frame.parent_tried = true;
            step = node.parent().filter(|&parent| !visited[parent]);
        }

        match step {
            Some(index) => {
                visited[index] = true;
                stack.push(Frame::new(index));
                if nodes[index].id() == target {
                    log::trace!("found {} at depth {} of search", target, stack.len() - 1);
                    return Some(unwind(nodes, &stack));
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    None
}

/// Reads the active chain innermost first.
fn unwind(nodes: &[Node], stack: &[Frame]) -> Vec<NodeId> {
    stack.iter().rev().map(|frame| nodes[frame.index].id()).collect()
}

fn depth(nodes: &[Node], mut index: NodeIndex) -> usize {
    let mut depth = 0;
    while let Some(parent) = nodes[index].parent() {
        index = parent;
        depth += 1;
    }
    depth
}

/// Joins both endpoints at their lowest common ancestor.
fn ancestor_walk(nodes: &[Node], start: NodeIndex, end: NodeIndex) -> Option<Vec<NodeId>> {
    let mut a = start;
    let mut b = end;
    let mut depth_a = depth(nodes, a);
    let mut depth_b = depth(nodes, b);

    // from_start: start .. child of ancestor; from_end: end .. child of ancestor
    let mut from_start = Vec::with_capacity(depth_a);
    let mut from_end = Vec::with_capacity(depth_b);

    while depth_a > depth_b {
        from_start.push(a);
        a = nodes[a].parent()?;
        depth_a -= 1;
    }
    while depth_b > depth_a {
        from_end.push(b);
        b = nodes[b].parent()?;
        depth_b -= 1;
    }
    while a != b {
        from_start.push(a);
        from_end.push(b);
        a = nodes[a].parent()?;
        b = nodes[b].parent()?;
    }

    let mut path: Vec<NodeId> = Vec::with_capacity(from_start.len() + from_end.len() + 1);
    path.extend(from_end.iter().map(|&i| nodes[i].id()));
    path.push(nodes[a].id());
    path.extend(from_start.iter().rev().map(|&i| nodes[i].id()));
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NodeRecord;
    use crate::tree::build;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample() -> Tree {
        let records = [
            NodeRecord::new(1, 0),
            NodeRecord::new(2, 1),
            NodeRecord::new(3, 1),
            NodeRecord::new(4, 2),
        ];
        build(&records).unwrap().tree
    }

    /// Random tree where every record's parent appears earlier.
    fn random_tree(rng: &mut StdRng, size: usize) -> Tree {
        let mut records = vec![NodeRecord::new(100, 0)];
        for i in 1..size {
            let parent = records[rng.gen_range(0..i)].id;
            records.push(NodeRecord::new(100 + i as NodeId, parent));
        }
        build(&records).unwrap().tree
    }

    #[test]
    fn test_sample_paths() {
        let tree = sample();
        assert_eq!(find_path(&tree, 4, 3), vec![3, 1, 2, 4]);
        assert_eq!(find_path(&tree, 3, 4), vec![4, 2, 1, 3]);
        assert_eq!(find_path(&tree, 1, 4), vec![4, 2, 1]);
        assert_eq!(find_path(&tree, 4, 1), vec![1, 2, 4]);
    }

    #[test]
    fn test_path_to_self() {
        let tree = sample();
        for id in [1, 2, 3, 4] {
            assert_eq!(find_path(&tree, id, id), vec![id]);
            assert_eq!(find_path_with(&tree, id, id, PathStrategy::AncestorWalk), vec![id]);
        }
    }

    #[test]
    fn test_absent_nodes_give_empty_path() {
        let tree = sample();
        assert!(find_path(&tree, 5, 1).is_empty());
        assert!(find_path(&tree, 1, 5).is_empty());
        assert_eq!(try_find_path(&tree, 5, 1), Err(PathError::NodeNotFound(5)));
        assert_eq!(try_find_path(&tree, 1, 6), Err(PathError::NodeNotFound(6)));
        assert_eq!(try_find_path(&tree, 7, 6), Err(PathError::NodeNotFound(7)));
        // A failed query leaves later queries unaffected
        assert_eq!(find_path(&tree, 4, 3), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_idempotent() {
        let tree = sample();
        assert_eq!(find_path(&tree, 4, 3), find_path(&tree, 4, 3));
    }

    #[test]
    fn test_strategies_agree_on_random_trees() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let size = rng.gen_range(1..200);
            let tree = random_tree(&mut rng, size);
            for _ in 0..50 {
                let start = 100 + rng.gen_range(0..size) as NodeId;
                let end = 100 + rng.gen_range(0..size) as NodeId;

                let dfs = find_path(&tree, start, end);
                let lca = find_path_with(&tree, start, end, PathStrategy::AncestorWalk);
                assert_eq!(dfs, lca);

                assert_eq!(dfs.first(), Some(&end));
                assert_eq!(dfs.last(), Some(&start));
                for pair in dfs.windows(2) {
                    assert!(tree.are_adjacent(pair[0], pair[1]));
                }
            }
        }
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 100_000;
        let records: Vec<NodeRecord> = (0..depth)
            .map(|i| NodeRecord::new(i, i - 1))
            .collect();
        let tree = build(&records).unwrap().tree;

        let path = find_path(&tree, depth - 1, 0);
        assert_eq!(path.len(), depth as usize);
        assert_eq!(path[0], 0);
        assert_eq!(path[path.len() - 1], depth - 1);

        let path = find_path(&tree, 0, depth - 1);
        assert_eq!(path.len(), depth as usize);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("dfs".parse::<PathStrategy>().unwrap(), PathStrategy::DepthFirst);
        assert_eq!("ancestor".parse::<PathStrategy>().unwrap(), PathStrategy::AncestorWalk);
        assert!("bfs".parse::<PathStrategy>().is_err());
        assert_eq!(PathStrategy::AncestorWalk.to_string(), "ancestor");
    }
}
