use crate::model::{osw::OswLayer, ReformatterError};
use std::{
    collections::HashMap,
    fs::File,
    io,
    path::{Path, PathBuf},
};
use zip::ZipArchive;

/// extracts the layer files of a walkway bundle into `output_directory`.
///
/// archive members are matched to layers by file name, directories inside
/// the archive are flattened and operating system metadata entries are
/// skipped. when two members hold the same layer the first one is used.
pub fn extract_layers(
    zip_path: &Path,
    output_directory: &Path,
) -> Result<HashMap<OswLayer, PathBuf>, ReformatterError> {
    let file = File::open(zip_path).map_err(|e| {
        ReformatterError::StdIoError {
            source: io::Error::new(e.kind(), format!("{}: {e}", zip_path.display())),
        }
    })?;
    let mut archive = ZipArchive::new(file)?;
    std::fs::create_dir_all(output_directory)?;

    let mut layers: HashMap<OswLayer, PathBuf> = HashMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        else {
            log::warn!("skipping archive entry with unsafe path '{}'", entry.name());
            continue;
        };
        if entry.name().contains("__MACOSX") || name.starts_with("._") {
            continue;
        }
        let Some(layer) = OswLayer::from_filename(&name) else {
            log::debug!("skipping archive entry '{}'", entry.name());
            continue;
        };
        if layers.contains_key(&layer) {
            log::warn!("archive holds more than one {layer} file, ignoring '{}'", entry.name());
            continue;
        }
        let target = output_directory.join(&name);
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        log::info!("extracted {layer} layer to {}", target.display());
        layers.insert(layer, target);
    }
    Ok(layers)
}
