use crate::{
    algorithm::remap,
    model::{
        osm::{
            graph::OsmGraph,
            xml::{read_osm_xml, OsmXmlWriter},
            OsmError,
        },
        ReformatterError,
    },
};
use std::path::{Path, PathBuf};

/// renumbers an OSM XML document on disk to sequential ids per entity kind.
pub fn remap_xml_file(filepath: &Path, generator: &str) -> Result<Vec<String>, ReformatterError> {
    let graph = read_osm_xml(filepath)?;
    let graph = remap::remap_sequential(graph)?;
    replace_document(filepath, &graph, generator)
}

/// adds the default version to visible entities of an OSM XML document on
/// disk, returning the number of entities patched.
pub fn ensure_version_xml_file(filepath: &Path, generator: &str) -> Result<usize, ReformatterError> {
    let mut graph = read_osm_xml(filepath)?;
    let patched = remap::ensure_version_attribute(&mut graph);
    replace_document(filepath, &graph, generator)?;
    Ok(patched)
}

/// writes next to the original first so a failed write leaves it intact
fn replace_document(
    filepath: &Path,
    graph: &OsmGraph,
    generator: &str,
) -> Result<Vec<String>, ReformatterError> {
    let staging = staging_path(filepath)?;
    graph.write_osm_xml(&staging, generator)?;
    std::fs::rename(&staging, filepath).map_err(|e| OsmError::IoError(
        filepath.to_string_lossy().to_string(),
        e,
    ))?;
    log::info!("rewrote {}", filepath.display());
    Ok(vec![filepath.to_string_lossy().to_string()])
}

fn staging_path(filepath: &Path) -> Result<PathBuf, ReformatterError> {
    let name = filepath.file_name().ok_or_else(|| {
        ReformatterError::ConfigurationError(format!(
            "{} is not a file path",
            filepath.display()
        ))
    })?;
    Ok(filepath.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}
