use super::{
    osw_feature::{OswDataset, OswFeature},
    osw_layer::OswLayer,
};
use crate::model::osm::OsmError;
use kdam::tqdm;
use std::{
    collections::HashSet,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub trait OswWriter {
    /// writes one GeoJSON feature collection per layer into a shared
    /// directory, returning the paths of the files written.
    fn write_osw(
        &self,
        output_directory: &Path,
        file_prefix: &str,
        overwrite: bool,
    ) -> Result<Vec<String>, OsmError>;
}

impl OswWriter for OswDataset {
    fn write_osw(
        &self,
        output_directory: &Path,
        file_prefix: &str,
        overwrite: bool,
    ) -> Result<Vec<String>, OsmError> {
        if !output_directory.is_dir() {
            std::fs::create_dir_all(output_directory).map_err(|e| {
                OsmError::IoError(output_directory.to_string_lossy().to_string(), e)
            })?;
        }
        let mut written = vec![];
        for layer in OswLayer::ALL {
            let features = self.features(layer);
            if features.is_empty() && !layer.is_mandatory() {
                continue;
            }
            let filepath = output_directory.join(layer.filename(file_prefix));
            if filepath.exists() && !overwrite {
                return Err(OsmError::IoError(
                    filepath.to_string_lossy().to_string(),
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "output file exists and overwrite is disabled",
                    ),
                ));
            }
            write_layer(&filepath, layer, features)?;
            log::info!("wrote {} {layer} features to {}", features.len(), filepath.display());
            written.push(filepath.to_string_lossy().to_string());
        }
        Ok(written)
    }
}

/// streams a feature collection to disk one feature at a time.
/// feature ids must be unique within the layer.
pub fn write_layer(filepath: &Path, layer: OswLayer, features: &[OswFeature]) -> Result<(), OsmError> {
    let path_str = filepath.to_string_lossy().to_string();
    let io_err = |e: std::io::Error| OsmError::IoError(path_str.clone(), e);
    let file = File::create(filepath).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut ids: HashSet<&str> = HashSet::with_capacity(features.len());

    writer
        .write_all(br#"{"type":"FeatureCollection","features":["#)
        .map_err(io_err)?;
    let iter = tqdm!(
        features.iter().enumerate(),
        desc = format!("write {layer}"),
        total = features.len()
    );
    for (idx, feature) in iter {
        if !ids.insert(feature.id.as_str()) {
            return Err(OsmError::DuplicateFeatureId(layer.to_string(), feature.id.clone()));
        }
        let gj = feature.to_geojson()?;
        if idx > 0 {
            writer.write_all(b",").map_err(io_err)?;
        }
        serde_json::to_writer(&mut writer, &gj)
            .map_err(|e| OsmError::GeoJsonError(path_str.clone(), e.to_string()))?;
    }
    eprintln!();
    writer.write_all(b"]}").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}
