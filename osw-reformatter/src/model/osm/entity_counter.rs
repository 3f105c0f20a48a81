use super::{OsmElement, OsmError, OsmSource};
use crate::model::osw::{osw_normalizer::classify, EntityCategory};
use serde::{Deserialize, Serialize};

/// one independent counting pass over a source. each pass owns its own
/// cursor, so the three passes can run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCounter {
    /// ways matching a way rule
    Ways,
    /// nodes matching a network node rule
    Nodes,
    /// nodes matching a point rule
    Points,
}

impl EntityCounter {
    pub fn accept(&self, element: &OsmElement) -> bool {
        match (self, element) {
            (EntityCounter::Ways, OsmElement::Way(way)) => {
                let category = EntityCategory::Way {
                    closed: way.is_closed(),
                };
                classify(&way.tags, &category).is_some()
            }
            (EntityCounter::Nodes, OsmElement::Node(node)) => {
                !node.tags.is_empty() && classify(&node.tags, &EntityCategory::Node).is_some()
            }
            (EntityCounter::Points, OsmElement::Node(node)) => {
                !node.tags.is_empty() && classify(&node.tags, &EntityCategory::Point).is_some()
            }
            _ => false,
        }
    }

    pub fn count(&self, source: &OsmSource) -> Result<usize, OsmError> {
        let mut count: usize = 0;
        source.for_each_element(|element| {
            if self.accept(&element) {
                count += 1;
            }
            Ok(())
        })?;
        log::debug!("counted {count} {self:?} in {}", source.filepath());
        Ok(count)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub ways: usize,
    pub nodes: usize,
    pub points: usize,
}

/// counts ways, nodes and points of a source. with `parallelize` the three
/// passes run on the rayon pool and are joined before returning.
pub fn count_entities(source: &OsmSource, parallelize: bool) -> Result<EntityCounts, OsmError> {
    let (ways, (nodes, points)) = if parallelize {
        rayon::join(
            || EntityCounter::Ways.count(source),
            || {
                rayon::join(
                    || EntityCounter::Nodes.count(source),
                    || EntityCounter::Points.count(source),
                )
            },
        )
    } else {
        (
            EntityCounter::Ways.count(source),
            (
                EntityCounter::Nodes.count(source),
                EntityCounter::Points.count(source),
            ),
        )
    };
    Ok(EntityCounts {
        ways: ways?,
        nodes: nodes?,
        points: points?,
    })
}

#[cfg(test)]
mod tests {
    use super::{count_entities, EntityCounts};
    use crate::model::osm::OsmSource;

    const DOC: &str = r#"<osm version="0.6">
  <node id="1" lat="0.0" lon="0.0"><tag k="kerb" v="raised"/></node>
  <node id="2" lat="0.0" lon="0.001"/>
  <node id="3" lat="0.0" lon="0.002"><tag k="natural" v="tree"/></node>
  <node id="4" lat="0.0" lon="0.003"><tag k="power" v="pole"/></node>
  <way id="7"><nd ref="1"/><nd ref="2"/><tag k="highway" v="footway"/></way>
  <way id="8"><nd ref="1"/><nd ref="2"/><tag k="highway" v="primary"/></way>
</osm>"#;

    #[test]
    fn test_counts_match_sequential_and_parallel() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("count.osm");
        std::fs::write(&path, DOC).expect("write fixture");
        let source = OsmSource::from_filepath(&path.to_string_lossy()).expect("xml source");
        let expected = EntityCounts {
            ways: 1,
            nodes: 1,
            points: 2,
        };
        assert_eq!(count_entities(&source, false).expect("counts"), expected);
        assert_eq!(count_entities(&source, true).expect("counts"), expected);
    }
}
