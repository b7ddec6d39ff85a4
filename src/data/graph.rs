/// Outcome of a graph mutation. Out-of-range ids are tolerated rather than
/// treated as errors, callers that want strictness can match on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpdate {
    Applied,
    OutOfRange,
    NotFound,
}

/// Undirected graph over dense vertex ids `0..vertex_count`.
///
/// Neighbor lists keep insertion order and tolerate duplicate edges. Breadth
/// first search breaks ties by this order, so it must not be deduplicated or
/// reordered.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    pub fn new(vertex_count: usize) -> Self {
        Graph {
            adjacency: vec![Vec::new(); vertex_count],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    fn in_range(&self, i: usize, j: usize) -> bool {
        i < self.vertex_count() && j < self.vertex_count()
    }

    pub fn add_edge(&mut self, i: usize, j: usize) -> EdgeUpdate {
        if !self.in_range(i, j) {
            return EdgeUpdate::OutOfRange;
        }
        self.adjacency[i].push(j);
        self.adjacency[j].push(i);
        EdgeUpdate::Applied
    }

    /// Removes a single occurrence of the edge, leaving any duplicates.
    pub fn remove_edge(&mut self, i: usize, j: usize) -> EdgeUpdate {
        if !self.in_range(i, j) {
            return EdgeUpdate::OutOfRange;
        }
        let Some(pos_j) = self.adjacency[i].iter().position(|&v| v == j) else {
            return EdgeUpdate::NotFound;
        };
        self.adjacency[i].remove(pos_j);
        // A self-loop was stored twice in the same list.
        if let Some(pos_i) = self.adjacency[j].iter().position(|&v| v == i) {
            self.adjacency[j].remove(pos_i);
        }
        EdgeUpdate::Applied
    }

    pub fn is_edge(&self, i: usize, j: usize) -> bool {
        self.in_range(i, j) && self.adjacency[i].contains(&j)
    }

    /// Neighbors of `vertex` in insertion order; empty when out of range.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        self.adjacency.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }
}
