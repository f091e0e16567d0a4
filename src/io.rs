//! Boundary between the layout core and graph files.

use std::path::Path;

use crate::error::{ExportError, ImportError};
use crate::graph::GraphStore;

/// Produces a verified [`GraphStore`] from a file.
///
/// Referential integrity is checked before the store is returned, so layout
/// stages never see dangling edges.
pub trait Importer {
    fn import(&self, path: &Path) -> Result<GraphStore, ImportError>;
}

/// Writes a laid-out [`GraphStore`] to a file.
pub trait Exporter {
    fn export(&self, store: &GraphStore, path: &Path) -> Result<(), ExportError>;
}
