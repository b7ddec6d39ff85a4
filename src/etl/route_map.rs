use std::path::PathBuf;

use log::warn;

use crate::data::osm::OsmDocument;
use crate::data::road_map::RoadMap;
use crate::errors::Result;
use crate::path_finder::{PathFinder, RouteResult};

use super::draw_map::{self, GrayImage, RenderConfig};
use super::parse_osm;
use super::Etl;

pub const ETL_NAME: &str = "route_map";

pub struct RouteRequest {
    pub start: String,
    pub end: String,
    pub map_path: PathBuf,
    pub output_path: PathBuf,
}

pub struct Output {
    pub image: GrayImage,
    pub route: RouteResult,
}

/// Reads a map, finds the route and renders both into an image.
pub struct RouteMapEtl<'a> {
    request: &'a RouteRequest,
    config: &'a RenderConfig,
    route: Option<RouteResult>,
}

impl<'a> RouteMapEtl<'a> {
    pub fn new(request: &'a RouteRequest, config: &'a RenderConfig) -> RouteMapEtl<'a> {
        RouteMapEtl {
            request,
            config,
            route: None,
        }
    }

    /// Result of the last search, available once the image was saved.
    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    fn render(&self, map: &RoadMap, route: &RouteResult) -> Result<GrayImage> {
        let segments = draw_map::segments(map, route, self.config)?;
        draw_map::draw(&segments, self.config)
    }
}

impl Etl for RouteMapEtl<'_> {
    type Input = OsmDocument;
    type Output = Output;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        parse_osm::read_osm_file(&self.request.map_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let map = RoadMap::from_document(&input)?;
        let route = PathFinder::route(&map, &self.request.start, &self.request.end)?;
        if route == RouteResult::NotFound {
            warn!(start = self.request.start.as_str(), end = self.request.end.as_str(); "Rendering road network without a route");
            println!("Path not found");
        }
        let image = self.render(&map, &route)?;
        Ok(Output {
            image,
            route,
        })
    }

    fn load(&mut self, output: Self::Output) -> Result<()> {
        draw_map::save(&output.image, &self.request.output_path)?;
        self.route = Some(output.route);
        Ok(())
    }
}
