use log::{debug, info};

use crate::data::graph::Graph;
use crate::data::road_map::RoadMap;
use crate::errors::Result;

/// Vertices of a found route, stored from the end back to the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    reversed: Vec<usize>,
}

impl Path {
    /// End-to-start order.
    pub fn vertices(&self) -> &[usize] {
        &self.reversed
    }

    pub fn start_to_end(&self) -> impl Iterator<Item = usize> + '_ {
        self.reversed.iter().rev().copied()
    }

    pub fn hops(&self) -> usize {
        self.reversed.len() - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    Found(Path),
    NotFound,
}

impl RouteResult {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RouteResult::Found(path) => Some(path),
            RouteResult::NotFound => None,
        }
    }
}

/// Unweighted shortest path search (fewest edges) over a borrowed graph.
pub struct PathFinder<'a> {
    graph: &'a Graph,
}

impl<'a> PathFinder<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        PathFinder { graph }
    }

    /// Resolves external point ids through `map` and searches between them.
    /// An id missing from the map is an error, an unreachable target is not.
    pub fn route(map: &RoadMap, start_id: &str, end_id: &str) -> Result<RouteResult> {
        let start = map.ids().index_of(start_id)
            .ok_or_else(|| format!("Start point {} is not in the map", start_id))?;
        let end = map.ids().index_of(end_id)
            .ok_or_else(|| format!("End point {} is not in the map", end_id))?;

        let result = PathFinder::new(map.graph()).search(start, end);
        match &result {
            RouteResult::Found(path) => {
                info!(start = start_id, end = end_id, hops = path.hops(); "Path found")
            },
            RouteResult::NotFound => info!(start = start_id, end = end_id; "Path not found"),
        }
        Ok(result)
    }

    /// Layer-by-layer breadth first search from `start` to `end`.
    ///
    /// Neighbors are visited in adjacency insertion order and the first
    /// discovery of a vertex fixes its predecessor, so equal-length routes are
    /// broken deterministically. Expansion stops as soon as `end` is
    /// discovered.
    pub fn search(&self, start: usize, end: usize) -> RouteResult {
        let vertex_count = self.graph.vertex_count();
        if start >= vertex_count || end >= vertex_count {
            return RouteResult::NotFound;
        }
        if start == end {
            return RouteResult::Found(Path { reversed: vec![start] });
        }

        let mut discovered = vec![false; vertex_count];
        let mut predecessor: Vec<Option<usize>> = vec![None; vertex_count];
        discovered[start] = true;

        let mut layer = vec![start];
        let mut depth = 0usize;
        let mut found = false;

        'layers: while !layer.is_empty() {
            debug!(depth = depth, frontier = layer.len(); "Expanding layer");
            let mut next_layer = Vec::new();
            for &u in &layer {
                for &v in self.graph.neighbors(u) {
                    if discovered[v] {
                        continue;
                    }
                    discovered[v] = true;
                    predecessor[v] = Some(u);
                    if v == end {
                        found = true;
                        break 'layers;
                    }
                    next_layer.push(v);
                }
            }
            layer = next_layer;
            depth += 1;
        }

        if !found {
            return RouteResult::NotFound;
        }

        let mut reversed = vec![end];
        let mut current = end;
        while let Some(previous) = predecessor[current] {
            reversed.push(previous);
            current = previous;
        }
        RouteResult::Found(Path { reversed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::road_map::tests::{bounds, chain_map, node, way};

    fn graph(vertex_count: usize, edges: &[(usize, usize)]) -> Graph {
        let mut graph = Graph::new(vertex_count);
        for &(i, j) in edges {
            graph.add_edge(i, j);
        }
        graph
    }

    fn found(result: RouteResult) -> Vec<usize> {
        match result {
            RouteResult::Found(path) => path.vertices().to_vec(),
            RouteResult::NotFound => panic!("expected a path"),
        }
    }

    #[test]
    fn chain_route_is_reported_end_to_start() {
        let map = chain_map();
        let result = PathFinder::route(&map, "A", "D").unwrap();
        let path = result.path().unwrap();
        assert_eq!(path.vertices(), &[3, 2, 1, 0]);
        assert_eq!(path.start_to_end().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(path.hops(), 3);
    }

    #[test]
    fn route_to_self_is_trivial() {
        let map = chain_map();
        let result = PathFinder::route(&map, "A", "A").unwrap();
        assert_eq!(found(result), vec![0]);

        // also for a point with no roads at all
        let result = PathFinder::route(&map, "E", "E").unwrap();
        assert_eq!(found(result), vec![4]);
    }

    #[test]
    fn disconnected_target_is_not_found() {
        let map = chain_map();
        assert_eq!(PathFinder::route(&map, "A", "E").unwrap(), RouteResult::NotFound);
        assert_eq!(PathFinder::route(&map, "E", "A").unwrap(), RouteResult::NotFound);
    }

    #[test]
    fn unknown_endpoint_is_an_error() {
        let map = chain_map();
        assert!(PathFinder::route(&map, "A", "nowhere").is_err());
        assert!(PathFinder::route(&map, "nowhere", "A").is_err());
    }

    #[test]
    fn vertex_zero_is_a_valid_predecessor() {
        // 1 - 0 - 2
        let graph = graph(3, &[(1, 0), (0, 2)]);
        assert_eq!(found(PathFinder::new(&graph).search(1, 2)), vec![2, 0, 1]);
    }

    #[test]
    fn finds_shortest_route_in_tree() {
        //       0
        //     /   \
        //    1     2
        //   / \     \
        //  3   4     5
        //             \
        //              6
        let graph = graph(7, &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (5, 6)]);
        let finder = PathFinder::new(&graph);
        assert_eq!(found(finder.search(3, 6)), vec![6, 5, 2, 0, 1, 3]);
        assert_eq!(found(finder.search(4, 3)), vec![3, 1, 4]);
    }

    #[test]
    fn shortcut_beats_long_way_round() {
        // ring 0-1-2-3-4-5-0 plus chord 0-3
        let graph = graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (0, 3)]);
        let path = found(PathFinder::new(&graph).search(1, 4));
        assert_eq!(path.len() - 1, 3);
    }

    #[test]
    fn equal_length_ties_follow_insertion_order() {
        // two 2-hop routes 0-1-3 and 0-2-3
        let first = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(found(PathFinder::new(&first).search(0, 3)), vec![3, 1, 0]);

        let second = graph(4, &[(0, 2), (0, 1), (2, 3), (1, 3)]);
        assert_eq!(found(PathFinder::new(&second).search(0, 3)), vec![3, 2, 0]);
    }

    #[test]
    fn target_predecessor_is_first_discoverer_in_layer() {
        // 1 and 2 both reach 3 in the same layer; 1 is expanded first and
        // claims 3 before 2 is looked at.
        let graph = graph(4, &[(0, 1), (0, 2), (2, 3), (1, 3)]);
        assert_eq!(found(PathFinder::new(&graph).search(0, 3)), vec![3, 1, 0]);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let graph = graph(5, &[(0, 1), (1, 2), (0, 3), (3, 2), (2, 4), (1, 4)]);
        let finder = PathFinder::new(&graph);
        let first = finder.search(0, 4);
        for _ in 0..10 {
            assert_eq!(finder.search(0, 4), first);
        }
    }

    #[test]
    fn duplicate_edges_do_not_change_the_result() {
        let graph = graph(3, &[(0, 1), (0, 1), (1, 2), (1, 2)]);
        assert_eq!(found(PathFinder::new(&graph).search(0, 2)), vec![2, 1, 0]);
    }

    #[test]
    fn search_stops_on_exhausted_component() {
        let graph = graph(6, &[(0, 1), (1, 2), (2, 0), (3, 4)]);
        assert_eq!(PathFinder::new(&graph).search(0, 4), RouteResult::NotFound);
        assert_eq!(PathFinder::new(&graph).search(0, 5), RouteResult::NotFound);
    }

    #[test]
    fn out_of_range_vertices_are_not_found() {
        let graph = graph(2, &[(0, 1)]);
        assert_eq!(PathFinder::new(&graph).search(0, 2), RouteResult::NotFound);
        assert_eq!(PathFinder::new(&graph).search(9, 9), RouteResult::NotFound);
    }

    #[test]
    fn routes_across_several_ways() {
        let nodes = vec![
            node("10", 0.0, 0.0),
            node("20", 0.1, 0.1),
            node("30", 0.2, 0.2),
            node("40", 0.3, 0.3),
        ];
        let ways = vec![
            way("a", &["10", "20"], &[("highway", "primary")]),
            way("b", &["30", "20"], &[("highway", "primary")]),
            way("c", &["30", "40"], &[("highway", "primary")]),
        ];
        let map = RoadMap::new(bounds(), &nodes, &ways).unwrap();
        let result = PathFinder::route(&map, "40", "10").unwrap();
        assert_eq!(found(result), vec![0, 1, 2, 3]);
    }
}
