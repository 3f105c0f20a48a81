use super::{
    graph::{BuildSummary, GraphBuilder, OsmGraph},
    xml, OsmElement, OsmError,
};
use kdam::{term, Bar, BarExt};
use osmpbf::ElementReader;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// a raw entity stream on disk
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum OsmSource {
    Pbf { pbf_filepath: String },
    Xml { xml_filepath: String },
}

impl OsmSource {
    /// picks the reader from the file extension: `.pbf` files are read with
    /// osmpbf, `.osm` and `.xml` files as OSM XML.
    pub fn from_filepath(filepath: &str) -> Result<OsmSource, OsmError> {
        let lower = filepath.to_lowercase();
        if lower.ends_with(".pbf") {
            Ok(OsmSource::Pbf {
                pbf_filepath: String::from(filepath),
            })
        } else if lower.ends_with(".osm") || lower.ends_with(".xml") {
            Ok(OsmSource::Xml {
                xml_filepath: String::from(filepath),
            })
        } else {
            Err(OsmError::UnsupportedSource(String::from(filepath)))
        }
    }

    pub fn filepath(&self) -> &str {
        match self {
            OsmSource::Pbf { pbf_filepath } => pbf_filepath,
            OsmSource::Xml { xml_filepath } => xml_filepath,
        }
    }

    /// the file name without its directory and OSM extensions,
    /// so `data/wa.microsoft.osm.pbf` becomes `wa.microsoft`.
    pub fn file_stem(&self) -> String {
        let name = Path::new(self.filepath())
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut stem = name.as_str();
        for suffix in [".pbf", ".xml", ".osm"] {
            if stem.to_lowercase().ends_with(suffix) {
                stem = &stem[..stem.len() - suffix.len()];
            }
        }
        String::from(stem)
    }

    /// hands every entity of the source to `f` in file order, stopping at the
    /// first error `f` returns.
    pub fn for_each_element<F>(&self, mut f: F) -> Result<(), OsmError>
    where
        F: FnMut(OsmElement) -> Result<(), OsmError>,
    {
        match self {
            OsmSource::Pbf { pbf_filepath } => {
                let reader = ElementReader::from_path(Path::new(pbf_filepath))
                    .map_err(|e| OsmError::PbfLibError { source: e })?;
                let mut failure: Option<OsmError> = None;
                reader
                    .for_each(|e| {
                        if failure.is_none() {
                            if let Err(err) = f(OsmElement::from(e)) {
                                failure = Some(err);
                            }
                        }
                    })
                    .map_err(|e| OsmError::PbfLibError { source: e })?;
                match failure {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
            OsmSource::Xml { xml_filepath } => {
                xml::for_each_element(Path::new(xml_filepath), f)
            }
        }
    }

    /// builds the classified entity graph of this source in a single pass.
    pub fn read_graph(&self, ignore_invalid: bool) -> Result<(OsmGraph, BuildSummary), OsmError> {
        term::hide_cursor().map_err(|e| OsmError::InternalError(e.to_string()))?;
        let mut reader_bar = Bar::builder()
            .desc(self.filepath())
            .unit(" rows")
            .unit_scale(true)
            .build()
            .map_err(OsmError::InternalError)?;
        let mut builder = GraphBuilder::new(ignore_invalid);
        let result = self.for_each_element(|element| {
            let _ = reader_bar.update(1);
            builder.add_element(element)
        });
        eprintln!();
        term::show_cursor().map_err(|e| OsmError::InternalError(e.to_string()))?;
        result?;
        builder.finalize()
    }
}
