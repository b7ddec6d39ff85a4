//! Raw `.osm` elements as read from the file, before any routing-specific
//! processing. External ids are kept as opaque strings.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Way {
    pub id: String,
    pub node_refs: Vec<String>,
    /// In document order.
    pub tags: Vec<Tag>,
}

impl Way {
    pub fn is_highway(&self) -> bool {
        self.tags.iter().any(|tag| tag.key == "highway")
    }
}

#[derive(Debug, Clone, Default)]
pub struct OsmDocument {
    pub bounds: Option<Bounds>,
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
}
