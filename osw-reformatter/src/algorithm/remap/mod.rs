mod sequential_remap;
mod version_patch;

pub use sequential_remap::{remap_sequential, ID_MIRROR_TAGS};
pub use version_patch::{ensure_version_attribute, DEFAULT_VERSION};
