pub mod graph;
pub mod osm;
pub mod road_map;
