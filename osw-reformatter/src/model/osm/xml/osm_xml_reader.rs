use crate::model::{
    osm::{
        graph::{
            OsmEntityKind, OsmGraph, OsmNodeData, OsmNodeId, OsmRelationData, OsmRelationId,
            OsmRelationMember, OsmWayData, OsmWayId,
        },
        OsmElement, OsmError,
    },
    osw::TagValue,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

/// streams the entities of an OSM XML document to `f` in document order.
/// an element is handed over once its closing tag has been read, so its
/// tags, node references and members are complete.
pub fn for_each_element<F>(filepath: &Path, mut f: F) -> Result<(), OsmError>
where
    F: FnMut(OsmElement) -> Result<(), OsmError>,
{
    let path_str = filepath.to_string_lossy().to_string();
    let file = File::open(filepath).map_err(|e| OsmError::IoError(path_str.clone(), e))?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<OsmElement> = None;
    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            OsmError::XmlReadError(
                path_str.clone(),
                format!("at position {}: {e}", reader.buffer_position()),
            )
        })?;
        let read_err = |msg: String| OsmError::XmlReadError(path_str.clone(), msg);
        match event {
            Event::Eof => break,
            Event::Start(e) => match e.name().as_ref() {
                b"node" | b"way" | b"relation" => {
                    current = Some(parse_element(&e).map_err(read_err)?);
                }
                _ => add_child(&mut current, &e).map_err(read_err)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"node" | b"way" | b"relation" => {
                    f(parse_element(&e).map_err(read_err)?)?;
                }
                _ => add_child(&mut current, &e).map_err(read_err)?,
            },
            Event::End(e) => {
                if let b"node" | b"way" | b"relation" = e.name().as_ref() {
                    match current.take() {
                        Some(OsmElement::Way(mut way)) => {
                            way.nodes.dedup();
                            f(OsmElement::Way(way))?;
                        }
                        Some(element) => f(element)?,
                        None => {
                            return Err(read_err(String::from("closing tag without element")))
                        }
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// reads a whole document into a graph without classifying its entities.
/// references are not checked, so the graph mirrors the document as written.
pub fn read_osm_xml(filepath: &Path) -> Result<OsmGraph, OsmError> {
    let mut graph = OsmGraph::empty();
    for_each_element(filepath, |element| match element {
        OsmElement::Node(n) => graph.insert_node(n),
        OsmElement::Way(w) => graph.insert_way(w),
        OsmElement::Relation(r) => graph.insert_relation(r),
    })?;
    log::debug!(
        "read {} nodes, {} ways, {} relations from {}",
        graph.n_nodes(),
        graph.n_ways(),
        graph.n_relations(),
        filepath.display()
    );
    Ok(graph)
}

fn attributes(e: &BytesStart) -> Result<HashMap<String, String>, String> {
    e.attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?.to_string();
            Ok((key, value))
        })
        .collect()
}

fn required<T: std::str::FromStr>(
    attrs: &HashMap<String, String>,
    key: &str,
    element: &str,
) -> Result<T, String> {
    let raw = attrs
        .get(key)
        .ok_or_else(|| format!("{element} missing attribute '{key}'"))?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("{element} has invalid {key} '{raw}'"))
}

fn optional_version(attrs: &HashMap<String, String>) -> Option<u32> {
    attrs.get("version").and_then(|v| v.trim().parse().ok())
}

fn optional_visible(attrs: &HashMap<String, String>) -> Option<bool> {
    attrs.get("visible").map(|v| v.trim() == "true")
}

fn parse_element(e: &BytesStart) -> Result<OsmElement, String> {
    let attrs = attributes(e)?;
    let element = match e.name().as_ref() {
        b"node" => {
            let id: i64 = required(&attrs, "id", "node")?;
            let lat: f64 = required(&attrs, "lat", "node")?;
            let lon: f64 = required(&attrs, "lon", "node")?;
            let mut node = OsmNodeData::new(OsmNodeId(id), lon, lat);
            node.version = optional_version(&attrs);
            node.visible = optional_visible(&attrs);
            OsmElement::Node(node)
        }
        b"way" => {
            let id: i64 = required(&attrs, "id", "way")?;
            let mut way = OsmWayData::new(OsmWayId(id), vec![]);
            way.version = optional_version(&attrs);
            way.visible = optional_visible(&attrs);
            OsmElement::Way(way)
        }
        _ => {
            let id: i64 = required(&attrs, "id", "relation")?;
            let mut relation = OsmRelationData::new(OsmRelationId(id), vec![]);
            relation.version = optional_version(&attrs);
            relation.visible = optional_visible(&attrs);
            OsmElement::Relation(relation)
        }
    };
    Ok(element)
}

/// attaches a `tag`, `nd` or `member` child to the open element.
/// other children (and children outside an entity) are ignored.
fn add_child(current: &mut Option<OsmElement>, e: &BytesStart) -> Result<(), String> {
    let Some(element) = current.as_mut() else {
        return Ok(());
    };
    match (e.name().as_ref(), element) {
        (b"tag", element) => {
            let attrs = attributes(e)?;
            let k = attrs
                .get("k")
                .ok_or_else(|| String::from("tag missing attribute 'k'"))?;
            let v = attrs.get("v").cloned().unwrap_or_default();
            let tags = match element {
                OsmElement::Node(n) => &mut n.tags,
                OsmElement::Way(w) => &mut w.tags,
                OsmElement::Relation(r) => &mut r.tags,
            };
            tags.insert(k.clone(), TagValue::from(v));
        }
        (b"nd", OsmElement::Way(way)) => {
            let attrs = attributes(e)?;
            let reference: i64 = required(&attrs, "ref", "nd")?;
            way.nodes.push(OsmNodeId(reference));
        }
        (b"member", OsmElement::Relation(relation)) => {
            let attrs = attributes(e)?;
            let kind = attrs
                .get("type")
                .ok_or_else(|| String::from("member missing attribute 'type'"))?
                .parse::<OsmEntityKind>()?;
            let reference: i64 = required(&attrs, "ref", "member")?;
            let role = attrs.get("role").map(|r| r.as_str()).unwrap_or_default();
            relation
                .members
                .push(OsmRelationMember::new(kind, reference, role));
        }
        _ => {}
    }
    Ok(())
}
