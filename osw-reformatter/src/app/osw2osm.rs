use super::{bundle_ops, ConversionResponse};
use crate::{
    algorithm::{remap, reverse::ReverseMapper},
    config::ReformatterConfiguration,
    model::{
        osm::{xml::OsmXmlWriter, OsmError},
        osw::{layer_reader, OswLayer},
        ReformatterError,
    },
};
use std::path::{Path, PathBuf};

/// converts a zipped walkway bundle back into an OSM XML document
pub struct Osw2Osm {
    zip_file: PathBuf,
    output_directory: PathBuf,
    prefix: String,
    config: ReformatterConfiguration,
}

impl Osw2Osm {
    pub fn new(
        zip_file: &Path,
        output_directory: &Path,
        prefix: &str,
        config: ReformatterConfiguration,
    ) -> Osw2Osm {
        Osw2Osm {
            zip_file: zip_file.to_path_buf(),
            output_directory: output_directory.to_path_buf(),
            prefix: String::from(prefix),
            config,
        }
    }

    pub fn convert(&self) -> ConversionResponse {
        ConversionResponse::from_result(self.run())
    }

    /// the document written by [`Osw2Osm::run`]
    pub fn output_filepath(&self) -> PathBuf {
        self.output_directory
            .join(format!("{}.graph.osm.xml", self.prefix))
    }

    /// runs the conversion, returning the path of the document written
    pub fn run(&self) -> Result<Vec<String>, ReformatterError> {
        eprintln!();
        log::info!("  (((1))) extracting layers from {}", self.zip_file.display());
        let layer_directory = self
            .output_directory
            .join(format!("{}.layers", self.prefix));
        let layers = bundle_ops::extract_layers(&self.zip_file, &layer_directory)?;
        if !layers.contains_key(&OswLayer::Nodes) {
            return Err(ReformatterError::MissingLayer(OswLayer::Nodes.to_string()));
        }
        if !layers.contains_key(&OswLayer::Edges) && !layers.contains_key(&OswLayer::Lines) {
            return Err(ReformatterError::MissingLayer(format!(
                "{} or {}",
                OswLayer::Edges,
                OswLayer::Lines
            )));
        }

        eprintln!();
        log::info!("  (((2))) rebuilding entities from {} layers", layers.len());
        let mut mapper = ReverseMapper::new(&self.config);
        for layer in OswLayer::ALL {
            let Some(filepath) = layers.get(&layer) else {
                continue;
            };
            let features = layer_reader::read_layer(filepath, layer)?;
            mapper.add_layer(layer, &features)?;
        }
        let (graph, summary) = mapper.finish();
        log::debug!("{summary:?}");

        eprintln!();
        log::info!("  (((3))) assigning sequential ids");
        let mut graph = remap::remap_sequential(graph)?;

        eprintln!();
        log::info!("  (((4))) adding version attributes");
        let patched = remap::ensure_version_attribute(&mut graph);
        log::info!("added version {} to {patched} entities", remap::DEFAULT_VERSION);

        let filepath = self.output_filepath();
        eprintln!();
        log::info!("  (((5))) writing {}", filepath.display());
        if filepath.exists() && !self.config.overwrite {
            return Err(ReformatterError::OsmError {
                source: OsmError::IoError(
                    filepath.to_string_lossy().to_string(),
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "output file exists and overwrite is disabled",
                    ),
                ),
            });
        }
        graph.write_osm_xml(&filepath, &self.config.generator)?;
        Ok(vec![filepath.to_string_lossy().to_string()])
    }
}
