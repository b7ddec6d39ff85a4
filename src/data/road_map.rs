use std::collections::HashMap;

use log::{info, warn};

use super::graph::{EdgeUpdate, Graph};
use super::osm::{self, Bounds, OsmDocument};
use crate::errors::Result;

/// A map point with its dense vertex index.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub index: usize,
}

/// A retained highway polyline, as vertex indices. Always at least two long.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: String,
    pub indices: Vec<usize>,
}

/// External point id <-> dense index.
#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    by_external: HashMap<String, usize>,
    by_index: Vec<String>,
}

impl IdMapping {
    /// Returns the new index, or `None` if the id was already mapped.
    fn insert(&mut self, external_id: &str) -> Option<usize> {
        if self.by_external.contains_key(external_id) {
            return None;
        }
        let index = self.by_index.len();
        self.by_external.insert(external_id.to_string(), index);
        self.by_index.push(external_id.to_string());
        Some(index)
    }

    pub fn index_of(&self, external_id: &str) -> Option<usize> {
        self.by_external.get(external_id).copied()
    }

    pub fn external_id(&self, index: usize) -> Option<&str> {
        self.by_index.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

/// The road network: points, highway ways, and the undirected graph derived
/// from them.
#[derive(Debug, Clone)]
pub struct RoadMap {
    bounds: Bounds,
    points: Vec<Point>,
    ways: Vec<Way>,
    ids: IdMapping,
    graph: Graph,
}

impl RoadMap {
    pub fn new(bounds: Bounds, nodes: &[osm::Node], ways: &[osm::Way]) -> Result<Self> {
        let mut ids = IdMapping::default();
        let mut points = Vec::with_capacity(nodes.len());
        for node in nodes {
            match ids.insert(&node.id) {
                Some(index) => points.push(Point {
                    id: node.id.clone(),
                    lat: node.lat,
                    lon: node.lon,
                    index,
                }),
                None => warn!(node_id = node.id.as_str(); "Skipping duplicate node"),
            }
        }

        let mut graph = Graph::new(points.len());
        let mut retained = Vec::new();
        let mut discarded = 0usize;
        for way in ways {
            if !way.is_highway() {
                discarded += 1;
                continue;
            }
            let indices = way.node_refs.iter()
                .map(|node_ref| ids.index_of(node_ref).ok_or_else(|| {
                    format!("Way {} references unknown node {}", way.id, node_ref)
                }))
                .collect::<std::result::Result<Vec<usize>, String>>()?;
            if indices.len() < 2 {
                return Err(format!(
                    "Highway way {} has {} node(s), at least 2 are required",
                    way.id,
                    indices.len(),
                ).into());
            }
            for pair in indices.windows(2) {
                let update = graph.add_edge(pair[0], pair[1]);
                debug_assert_eq!(update, EdgeUpdate::Applied);
            }
            retained.push(Way {
                id: way.id.clone(),
                indices,
            });
        }

        info!(
            points = points.len(),
            highways = retained.len(),
            discarded_ways = discarded,
            edges = graph.edge_count();
            "Built road map"
        );

        Ok(RoadMap {
            bounds,
            points,
            ways: retained,
            ids,
            graph,
        })
    }

    pub fn from_document(document: &OsmDocument) -> Result<Self> {
        let bounds = document.bounds.ok_or("Map document has no <bounds> element")?;
        Self::new(bounds, &document.nodes, &document.ways)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn point(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn ids(&self) -> &IdMapping {
        &self.ids
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Every consecutive index pair of every retained way, in way order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ways.iter()
            .flat_map(|way| way.indices.windows(2).map(|pair| (pair[0], pair[1])))
    }
}
