use crate::record::{NodeId, NodeRecord, PathQuery, TreeInput};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const DEFAULT_NODES: usize = 100;
const DEFAULT_QUERIES: usize = 10;
const DEFAULT_MAX_CHILDREN: usize = 4;

/// Generates random tree inputs with queries, reproducible from a seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeGenerator {
    pub nodes: usize,
    pub queries: usize,
    /// Upper bound on children per node; 0 means unbounded
    pub max_children: usize,
    pub seed: u64,
    /// Percentage (0-100) of records whose parent is only emitted later
    pub missing_percent: u8,
}

impl TreeGenerator {
    pub fn new() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            queries: DEFAULT_QUERIES,
            max_children: DEFAULT_MAX_CHILDREN,
            seed: 42, // Default seed for reproducibility
            missing_percent: 0,
        }
    }

    pub fn with_config(nodes: usize, queries: usize, max_children: usize, seed: u64) -> Self {
        Self {
            nodes,
            queries,
            max_children,
            seed,
            missing_percent: 0,
        }
    }

    /// Generates records in construction order followed by queries.
    ///
    /// Ids are a shuffled permutation of `1..=nodes`. Without missing parents
    /// every record's parent appears strictly earlier. Queries pick both
    /// endpoints among the generated ids.
    pub fn generate(&self) -> TreeInput {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut input = TreeInput::default();
        if self.nodes == 0 {
            return input;
        }

        let mut ids: Vec<NodeId> = (1..=self.nodes as NodeId).collect();
        ids.shuffle(&mut rng);

        // Positions that can still take another child
        let mut open: Vec<usize> = Vec::with_capacity(self.nodes);
        let mut child_counts = vec![0usize; self.nodes];

        input.records.push(NodeRecord::with_tag(ids[0], 0, rng.gen_range(0..10)));
        open.push(0);

        for position in 1..self.nodes {
            let tag = rng.gen_range(0..10);
            let forward = position + 1 < self.nodes
                && rng.gen_range(0..100) < u32::from(self.missing_percent);

            let parent_id = if forward {
                // Refer to a node that has not been emitted yet
                ids[rng.gen_range(position + 1..self.nodes)]
            } else {
                let slot = rng.gen_range(0..open.len());
                let parent = open[slot];
                child_counts[parent] += 1;
                if self.max_children > 0 && child_counts[parent] >= self.max_children {
                    open.swap_remove(slot);
                }
                ids[parent]
            };

            input.records.push(NodeRecord::with_tag(ids[position], parent_id, tag));
            if !forward {
                open.push(position);
            }
        }

        for _ in 0..self.queries {
            let start = ids[rng.gen_range(0..self.nodes)];
            let end = ids[rng.gen_range(0..self.nodes)];
            input.queries.push(PathQuery::new(start, end));
        }

        input
    }
}

impl Default for TreeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
