use super::ConversionResponse;
use crate::{
    algorithm::{geometry, simplification},
    config::ReformatterConfiguration,
    model::{
        osm::{count_entities, OsmSource},
        osw::OswWriter,
        ReformatterError,
    },
};
use std::path::{Path, PathBuf};

/// converts a raw OSM entity file into walkway network layers
pub struct Osm2Osw {
    source_file: String,
    output_directory: PathBuf,
    prefix: String,
    config: ReformatterConfiguration,
}

impl Osm2Osw {
    pub fn new(
        source_file: &str,
        output_directory: &Path,
        prefix: &str,
        config: ReformatterConfiguration,
    ) -> Osm2Osw {
        Osm2Osw {
            source_file: String::from(source_file),
            output_directory: output_directory.to_path_buf(),
            prefix: String::from(prefix),
            config,
        }
    }

    pub fn convert(&self) -> ConversionResponse {
        ConversionResponse::from_result(self.run())
    }

    /// runs the conversion, returning the paths of the layer files written
    pub fn run(&self) -> Result<Vec<String>, ReformatterError> {
        let source = OsmSource::from_filepath(&self.source_file)?;
        let file_prefix = format!("{}.{}", self.prefix, source.file_stem());

        if self.config.count_entities {
            eprintln!();
            log::info!("  (((1))) estimating number of ways, nodes and points");
            let counts = count_entities(&source, self.config.parallelize)?;
            log::info!(
                "source holds {} ways, {} nodes and {} points matching the walkway schema",
                counts.ways,
                counts.nodes,
                counts.points
            );
        } else {
            eprintln!();
            log::info!("  (((1))) estimating number of ways, nodes and points (skipped)");
        }

        eprintln!();
        log::info!("  (((2))) creating network from {}", source.filepath());
        let (mut graph, build_summary) = source.read_graph(self.config.ignore_invalid_entities)?;
        log::debug!("{build_summary:?}");

        if self.config.simplify {
            eprintln!();
            log::info!("  (((3))) simplifying graph");
            simplification::simplify_graph(&mut graph, self.config.merge_ways)?;
        } else {
            eprintln!();
            log::info!("  (((3))) simplifying graph (skipped)");
        }

        eprintln!();
        log::info!("  (((4))) constructing geometries");
        let dataset =
            geometry::construct_geometries(&graph, self.config.ignore_invalid_entities)?;

        eprintln!();
        log::info!("  (((5))) writing layers to {}", self.output_directory.display());
        let files =
            dataset.write_osw(&self.output_directory, &file_prefix, self.config.overwrite)?;
        Ok(files)
    }
}
