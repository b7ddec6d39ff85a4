use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_bfs_route::errors::Result;
use osm_bfs_route::etl::draw_map::RenderConfig;
use osm_bfs_route::etl::route_map::{RouteMapEtl, RouteRequest};
use osm_bfs_route::etl::Etl;

/// Finds the route with the fewest road segments between two OSM nodes and
/// draws it over the road network.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Id of the node to start from.
    source_point: String,

    /// Id of the node to reach.
    destination_point: String,

    /// `.osm` map file, optionally xz compressed (`.osm.xz`).
    map_file: PathBuf,

    /// Image to write. `.png` paths get a PNG, anything else a binary PGM.
    output_file: PathBuf,

    /// JSON file overriding rendering defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_render_config(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| format!("Could not open config file {}: {}", path.display(), err))?;
            Ok(serde_json::from_reader(file)?)
        },
        None => Ok(RenderConfig::default()),
    }
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let config = load_render_config(args.config.as_deref())?;
    let request = RouteRequest {
        start: args.source_point,
        end: args.destination_point,
        map_path: args.map_file,
        output_path: args.output_file,
    };
    RouteMapEtl::new(&request, &config).process()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn takes_four_positional_arguments() {
        let args = Args::try_parse_from(["osm_bfs_route", "1", "4", "map.osm", "out.ppm"]).unwrap();
        assert_eq!(args.source_point, "1");
        assert_eq!(args.destination_point, "4");
        assert_eq!(args.map_file, PathBuf::from("map.osm"));
        assert_eq!(args.output_file, PathBuf::from("out.ppm"));
        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(Args::try_parse_from(["osm_bfs_route", "1", "4", "map.osm"]).is_err());
        assert!(Args::try_parse_from(["osm_bfs_route", "1", "4", "map.osm", "out.ppm", "extra"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_render_config(Some(Path::new("/no/such/config.json"))).is_err());
        assert_eq!(load_render_config(None).unwrap(), RenderConfig::default());
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/render.json");
        assert_eq!(load_render_config(Some(&path)).unwrap(), RenderConfig::default());
    }
}
