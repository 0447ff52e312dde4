use crate::task::Task;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Blocker graph for the tasks of one release. Nodes carry the task's
/// position in the input slice; an edge `u -> v` means `u` blocks `v`.
/// Blocker ids that name no task in the slice are not edges.
pub struct DependencyGraph {
    pub graph: DiGraph<usize, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
    priorities: Vec<i32>,
}

impl DependencyGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut nodes = Vec::with_capacity(tasks.len());

        // Add nodes first. A repeated id keeps its first node for lookups.
        for (position, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(position);
            id_to_index.entry(task.id.clone()).or_insert(node_ix);
            nodes.push(node_ix);
        }

        // Add edges: blocker -> task
        for (position, task) in tasks.iter().enumerate() {
            for blocker_id in &task.blocker_task_ids {
                if let Some(&blocker_ix) = id_to_index.get(blocker_id) {
                    graph.add_edge(blocker_ix, nodes[position], ());
                }
            }
        }

        Self {
            graph,
            id_to_index,
            priorities: tasks.iter().map(|task| task.priority).collect(),
        }
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.id_to_index.get(task_id).map(|&ix| self.graph[ix])
    }

    /// Kahn's algorithm that always takes the lowest `priority` among the
    /// ready tasks, ties going to the earlier input position. Tasks stuck
    /// behind a cycle are appended by priority so every task appears once.
    pub fn processing_order(&self) -> Vec<usize> {
        let count = self.graph.node_count();
        let mut in_degree: Vec<usize> = vec![0; count];
        for ix in self.graph.node_indices() {
            in_degree[ix.index()] = self
                .graph
                .neighbors_directed(ix, Direction::Incoming)
                .count();
        }

        let mut ready: BinaryHeap<Reverse<(i32, usize)>> = self
            .graph
            .node_indices()
            .filter(|ix| in_degree[ix.index()] == 0)
            .map(|ix| Reverse(self.sort_key(ix)))
            .collect();

        let mut order = Vec::with_capacity(count);
        let mut emitted = vec![false; count];
        while let Some(Reverse((_, position))) = ready.pop() {
            let ix = NodeIndex::new(position);
            order.push(position);
            emitted[position] = true;
            for dependent in self.graph.neighbors_directed(ix, Direction::Outgoing) {
                let slot = &mut in_degree[dependent.index()];
                *slot -= 1;
                if *slot == 0 {
                    ready.push(Reverse(self.sort_key(dependent)));
                }
            }
        }

        if order.len() < count {
            let mut remainder: Vec<(i32, usize)> = (0..count)
                .filter(|&position| !emitted[position])
                .map(|position| self.sort_key(NodeIndex::new(position)))
                .collect();
            remainder.sort();
            order.extend(remainder.into_iter().map(|(_, position)| position));
        }
        order
    }

    fn sort_key(&self, ix: NodeIndex) -> (i32, usize) {
        let position = self.graph[ix];
        (self.priorities[position], position)
    }
}
