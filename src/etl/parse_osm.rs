use std::fs;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Bounds, Node, OsmDocument, Tag, Way};
use crate::errors::{Error, Result};

enum ParserState {
    Top,
    Node,
    Way(Way),
    Relation,
}

fn attribute(el: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(el: &BytesStart, key: &str) -> Result<String> {
    attribute(el, key.as_bytes())?.ok_or_else(|| {
        let name = String::from_utf8_lossy(el.name().as_ref()).into_owned();
        Error::from(format!("<{}> element is missing the '{}' attribute", name, key))
    })
}

fn required_coordinate(el: &BytesStart, key: &str) -> Result<f64> {
    let value = required_attribute(el, key)?;
    value.trim().parse::<f64>().map_err(|err| {
        Error::from(format!("Invalid {} value '{}': {}", key, value, err))
    })
}

fn parse_bounds(el: &BytesStart) -> Result<Bounds> {
    Ok(Bounds {
        min_lat: required_coordinate(el, "minlat")?,
        min_lon: required_coordinate(el, "minlon")?,
        max_lat: required_coordinate(el, "maxlat")?,
        max_lon: required_coordinate(el, "maxlon")?,
    })
}

fn parse_node(el: &BytesStart) -> Result<Node> {
    Ok(Node {
        id: required_attribute(el, "id")?,
        lat: required_coordinate(el, "lat")?,
        lon: required_coordinate(el, "lon")?,
    })
}

fn parse_tag(el: &BytesStart) -> Result<Tag> {
    Ok(Tag {
        key: required_attribute(el, "k")?,
        value: attribute(el, b"v")?.unwrap_or_default(),
    })
}

/// Handles an opening or self-closing element. Self-closing elements never
/// change the state since no matching end event follows.
fn open_element(
    document: &mut OsmDocument,
    state: &mut ParserState,
    el: &BytesStart,
    is_empty: bool,
) -> Result<()> {
    match state {
        ParserState::Top => match el.name().as_ref() {
            b"bounds" => {
                if document.bounds.is_none() {
                    document.bounds = Some(parse_bounds(el)?);
                }
            },
            b"node" => {
                document.nodes.push(parse_node(el)?);
                if !is_empty {
                    *state = ParserState::Node;
                }
            },
            b"way" => {
                let way = Way {
                    id: required_attribute(el, "id")?,
                    ..Default::default()
                };
                if is_empty {
                    document.ways.push(way);
                } else {
                    *state = ParserState::Way(way);
                }
            },
            b"relation" => {
                if !is_empty {
                    *state = ParserState::Relation;
                }
            },
            _ => (),
        },
        ParserState::Way(way) => match el.name().as_ref() {
            b"nd" => way.node_refs.push(required_attribute(el, "ref")?),
            b"tag" => way.tags.push(parse_tag(el)?),
            _ => (),
        },
        // Node tags and relation members are not needed for routing.
        ParserState::Node | ParserState::Relation => (),
    }
    Ok(())
}

fn close_element(document: &mut OsmDocument, state: &mut ParserState, name: &[u8]) {
    let closes = match state {
        ParserState::Top => false,
        ParserState::Node => name == b"node",
        ParserState::Way(_) => name == b"way",
        ParserState::Relation => name == b"relation",
    };
    if !closes {
        return;
    }
    if let ParserState::Way(way) = mem::replace(state, ParserState::Top) {
        document.ways.push(way);
    }
}

pub fn parse_osm<R: BufRead>(mut reader: Reader<R>) -> Result<OsmDocument> {
    let mut buf = Vec::new();
    let mut document = OsmDocument::default();
    let mut state = ParserState::Top;

    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {}", reader.buffer_position(), e
                ).into())
            },
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => open_element(&mut document, &mut state, &e, false)?,
            Ok(Event::Empty(e)) => open_element(&mut document, &mut state, &e, true)?,
            Ok(Event::End(e)) => close_element(&mut document, &mut state, e.name().as_ref()),
            // Declarations, comments and free text (e.g. Overpass <note>) carry no map data.
            Ok(_) => (),
        }
        buf.clear();
    }

    if !matches!(state, ParserState::Top) {
        return Err("Unexpected end of OSM document inside an element".into());
    }

    debug!(
        nodes = document.nodes.len(),
        ways = document.ways.len(),
        has_bounds = document.bounds.is_some();
        "Parsed OSM document"
    );
    Ok(document)
}

fn create_osm_reader(path: &Path) -> Result<Reader<Box<dyn BufRead>>> {
    let file = fs::File::open(path)
        .map_err(|err| format!("Could not open map file {}: {}", path.display(), err))?;
    let file_reader = BufReader::new(file);
    let source: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    Ok(reader)
}

/// Reads a `.osm` file, or a `.osm.xz` file which is decompressed on the fly.
pub fn read_osm_file(path: &Path) -> Result<OsmDocument> {
    parse_osm(create_osm_reader(path)?)
}

pub fn parse_osm_str(xml: &str) -> Result<OsmDocument> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    parse_osm(reader)
}
