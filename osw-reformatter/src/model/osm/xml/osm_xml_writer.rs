use crate::model::{
    osm::{graph::OsmGraph, OsmError},
    osw::TagSet,
};
use kdam::tqdm;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub trait OsmXmlWriter {
    /// streams the graph to an OSM XML document, one element at a time.
    fn write_osm_xml(&self, filepath: &Path, generator: &str) -> Result<(), OsmError>;
}

impl OsmXmlWriter for OsmGraph {
    fn write_osm_xml(&self, filepath: &Path, generator: &str) -> Result<(), OsmError> {
        let path_str = filepath.to_string_lossy().to_string();
        let file = File::create(filepath).map_err(|e| OsmError::IoError(path_str.clone(), e))?;
        let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 2);
        let mut out = XmlSink {
            writer: &mut writer,
            path: &path_str,
        };

        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("osm");
        root.push_attribute(("version", "0.6"));
        root.push_attribute(("generator", generator));
        root.push_attribute(("upload", "false"));
        out.event(Event::Start(root))?;

        for node in tqdm!(self.nodes(), desc = "write nodes", total = self.n_nodes()) {
            let mut start = BytesStart::new("node");
            start.push_attribute(("id", node.osmid.to_string().as_str()));
            start.push_attribute(("lat", node.y.to_string().as_str()));
            start.push_attribute(("lon", node.x.to_string().as_str()));
            push_native(&mut start, node.version, node.visible);
            out.element(start, "node", &[], &node.tags)?;
        }
        eprintln!();

        for way in tqdm!(self.ways(), desc = "write ways", total = self.n_ways()) {
            let mut start = BytesStart::new("way");
            start.push_attribute(("id", way.osmid.to_string().as_str()));
            push_native(&mut start, way.version, way.visible);
            let refs = way
                .nodes
                .iter()
                .map(|n| {
                    let mut nd = BytesStart::new("nd");
                    nd.push_attribute(("ref", n.to_string().as_str()));
                    nd
                })
                .collect::<Vec<_>>();
            out.element(start, "way", &refs, &way.tags)?;
        }
        eprintln!();

        for relation in self.relations() {
            let mut start = BytesStart::new("relation");
            start.push_attribute(("id", relation.osmid.to_string().as_str()));
            push_native(&mut start, relation.version, relation.visible);
            let members = relation
                .members
                .iter()
                .map(|m| {
                    let mut member = BytesStart::new("member");
                    member.push_attribute(("type", m.kind.to_string().as_str()));
                    member.push_attribute(("ref", m.reference.to_string().as_str()));
                    member.push_attribute(("role", m.role.as_str()));
                    member
                })
                .collect::<Vec<_>>();
            out.element(start, "relation", &members, &relation.tags)?;
        }

        out.event(Event::End(BytesEnd::new("osm")))?;
        writer
            .into_inner()
            .flush()
            .map_err(|e| OsmError::IoError(path_str.clone(), e))?;
        log::info!(
            "wrote {} nodes, {} ways, {} relations to {path_str}",
            self.n_nodes(),
            self.n_ways(),
            self.n_relations()
        );
        Ok(())
    }
}

fn push_native(start: &mut BytesStart, version: Option<u32>, visible: Option<bool>) {
    if let Some(v) = version {
        start.push_attribute(("version", v.to_string().as_str()));
    }
    if let Some(v) = visible {
        start.push_attribute(("visible", if v { "true" } else { "false" }));
    }
}

struct XmlSink<'a, W: Write> {
    writer: &'a mut Writer<W>,
    path: &'a str,
}

impl<W: Write> XmlSink<'_, W> {
    fn event(&mut self, event: Event) -> Result<(), OsmError> {
        self.writer
            .write_event(event)
            .map_err(|e| OsmError::XmlWriteError(String::from(self.path), e.to_string()))
    }

    /// writes an entity element with its child elements followed by its tags,
    /// collapsing to an empty element when it has neither.
    fn element(
        &mut self,
        start: BytesStart,
        name: &str,
        children: &[BytesStart],
        tags: &TagSet,
    ) -> Result<(), OsmError> {
        if children.is_empty() && tags.is_empty() {
            return self.event(Event::Empty(start));
        }
        self.event(Event::Start(start))?;
        for child in children {
            self.event(Event::Empty(child.borrow()))?;
        }
        for (k, v) in tags.iter() {
            let mut tag = BytesStart::new("tag");
            tag.push_attribute(("k", k.as_str()));
            tag.push_attribute(("v", v.to_string().as_str()));
            self.event(Event::Empty(tag))?;
        }
        self.event(Event::End(BytesEnd::new(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::OsmXmlWriter;
    use crate::model::{
        osm::{
            graph::{
                OsmEntityKind, OsmGraph, OsmNodeData, OsmNodeId, OsmRelationData, OsmRelationId,
                OsmRelationMember, OsmWayData, OsmWayId,
            },
            xml::read_osm_xml,
        },
        osw::tag_value::text_tags,
    };

    #[test]
    fn test_write_then_read() {
        let mut graph = OsmGraph::empty();
        let mut first = OsmNodeData::new(OsmNodeId(1), -122.3, 47.6);
        first.version = Some(1);
        first.visible = Some(true);
        graph.insert_node(first).expect("insert");
        graph
            .insert_node(
                OsmNodeData::new(OsmNodeId(2), -122.31, 47.61)
                    .with_tags(text_tags([("note", "<quoted> & \"escaped\"")])),
            )
            .expect("insert");
        graph
            .insert_way(
                OsmWayData::new(OsmWayId(5), vec![OsmNodeId(1), OsmNodeId(2)])
                    .with_tags(text_tags([("highway", "footway")])),
            )
            .expect("insert");
        graph
            .insert_relation(OsmRelationData::new(
                OsmRelationId(9),
                vec![OsmRelationMember::new(OsmEntityKind::Way, 5, "outer")],
            ))
            .expect("insert");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.osm.xml");
        graph.write_osm_xml(&path, "unit-test").expect("writes");

        let text = std::fs::read_to_string(&path).expect("readable");
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("generator=\"unit-test\""));
        assert!(text.contains("upload=\"false\""));

        let back = read_osm_xml(&path).expect("reads back");
        assert_eq!(back.n_nodes(), 2);
        let node = back.get_node_data(&OsmNodeId(1)).expect("node 1");
        assert_eq!(node.version, Some(1));
        assert_eq!(node.visible, Some(true));
        let tagged = back.get_node_data(&OsmNodeId(2)).expect("node 2");
        assert_eq!(
            tagged.tags.get("note").map(|v| v.to_string()),
            Some(String::from("<quoted> & \"escaped\""))
        );
        let way = back.get_way_data(&OsmWayId(5)).expect("way");
        assert_eq!(way.nodes, vec![OsmNodeId(1), OsmNodeId(2)]);
        let relation = back.relations().next().expect("relation");
        assert_eq!(relation.members[0].reference, 5);
    }
}
