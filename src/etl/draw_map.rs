use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use raqote::{AntialiasMode, DrawOptions, DrawTarget, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};
use serde::Deserialize;

use crate::data::osm::Bounds;
use crate::data::road_map::RoadMap;
use crate::errors::Result;
use crate::path_finder::RouteResult;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width_px: u32,
    pub height_px: u32,
    pub background: u8,
    pub road_intensity: u8,
    pub road_width: f32,
    pub path_intensity: u8,
    pub path_width: f32,
    pub antialias: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width_px: 1000,
            height_px: 1000,
            background: 255,
            road_intensity: 150,
            road_width: 1.0,
            path_intensity: 50,
            path_width: 4.0,
            antialias: false,
        }
    }
}

/// Affine normalisation of the bounding box onto the canvas. Latitude drives
/// the x axis and longitude the y axis.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    bounds: Bounds,
    width: f64,
    height: f64,
}

impl Projection {
    pub fn new(bounds: &Bounds, width_px: u32, height_px: u32) -> Result<Self> {
        if !(bounds.max_lat > bounds.min_lat && bounds.max_lon > bounds.min_lon) {
            return Err(format!("Degenerate map bounds {:?}", bounds).into());
        }
        Ok(Projection {
            bounds: *bounds,
            width: width_px.into(),
            height: height_px.into(),
        })
    }

    /// Pixel position, truncated toward zero.
    pub fn project(&self, lat: f64, lon: f64) -> (i32, i32) {
        let lat_diff = self.bounds.max_lat - self.bounds.min_lat;
        let lon_diff = self.bounds.max_lon - self.bounds.min_lon;
        let x = (lat - self.bounds.min_lat) / lat_diff * self.width;
        let y = (lon - self.bounds.min_lon) / lon_diff * self.height;
        (x as i32, y as i32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub intensity: u8,
    pub width: f32,
}

/// All road segments in way order, followed by the route segments (if any)
/// so the route is painted on top.
pub fn segments(map: &RoadMap, route: &RouteResult, config: &RenderConfig) -> Result<Vec<Segment>> {
    let projection = Projection::new(map.bounds(), config.width_px, config.height_px)?;
    let project = |index: usize| -> Result<(i32, i32)> {
        let point = map.point(index).ok_or_else(|| format!("No point with index {}", index))?;
        Ok(projection.project(point.lat, point.lon))
    };

    let mut out = Vec::new();
    for (i, j) in map.edges() {
        out.push(Segment {
            from: project(i)?,
            to: project(j)?,
            intensity: config.road_intensity,
            width: config.road_width,
        });
    }
    if let Some(path) = route.path() {
        for pair in path.vertices().windows(2) {
            out.push(Segment {
                from: project(pair[0])?,
                to: project(pair[1])?,
                intensity: config.path_intensity,
                width: config.path_width,
            });
        }
    }
    Ok(out)
}

/// Single channel 8-bit raster.
#[derive(Debug, Clone)]
pub struct GrayImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }
}

fn gray(intensity: u8) -> SolidSource {
    SolidSource::from_unpremultiplied_argb(0xff, intensity, intensity, intensity)
}

fn stroke(width: f32) -> StrokeStyle {
    StrokeStyle {
        cap: LineCap::Round,
        join: LineJoin::Round,
        width,
        miter_limit: 2.0,
        dash_array: Vec::new(),
        dash_offset: 0.0,
    }
}

pub fn draw(segments: &[Segment], config: &RenderConfig) -> Result<GrayImage> {
    let mut dt = DrawTarget::new(
        config.width_px.try_into()?,
        config.height_px.try_into()?,
    );
    dt.clear(gray(config.background));

    let mut draw_options = DrawOptions::new();
    if !config.antialias {
        draw_options.antialias = AntialiasMode::None;
    }

    for segment in segments {
        // Integer coordinates address pixels, stroke through their centres.
        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.0 as f32 + 0.5, segment.from.1 as f32 + 0.5);
        pb.line_to(segment.to.0 as f32 + 0.5, segment.to.1 as f32 + 0.5);
        let raqote_path = pb.finish();

        dt.stroke(
            &raqote_path,
            &Source::Solid(gray(segment.intensity)),
            &stroke(segment.width),
            &draw_options,
        );
    }

    // Every colour drawn is a grey, so any channel carries the intensity.
    let data = dt.get_data().iter()
        .map(|argb| ((argb >> 8) & 0xff) as u8)
        .collect();

    Ok(GrayImage {
        width: config.width_px,
        height: config.height_px,
        data,
    })
}

fn write_pgm(image: &GrayImage, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P5\n{} {}\n255\n", image.width, image.height)?;
    out.write_all(&image.data)?;
    out.flush()?;
    Ok(())
}

fn write_png(image: &GrayImage, path: &Path) -> Result<()> {
    let out = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(out, image.width, image.height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.data)?;
    Ok(())
}

/// Writes a grayscale PNG for `.png` paths and a binary PGM otherwise.
pub fn save(image: &GrayImage, path: &Path) -> Result<()> {
    let is_png = path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        write_png(image, path)?;
    } else {
        write_pgm(image, path)?;
    }
    let path_str = path.display().to_string();
    info!(path = path_str.as_str(), png = is_png; "Saved image");
    Ok(())
}
