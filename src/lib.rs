//! gexf-layout - force-directed layout for GEXF graph files
//!
//! Computes a two-dimensional embedding of a graph: connected nodes are drawn
//! close together, all nodes repel, and bounding shapes (including label
//! extents) are separated afterwards. The result is written back as GEXF with
//! `viz:position` and `viz:size` on every node.
//!
//! # Architecture
//!
//! - `graph`: GraphStore using petgraph's StableGraph plus SoA position buffers
//! - `spatial`: R-tree over node bounding boxes for overlap detection
//! - `layout`: force-directed engine, overlap resolver, label adjuster
//! - `gexf` / `io`: importer and exporter at the file boundary
//! - `pipeline`: the sequential stage state machine
//!
//! ```no_run
//! use std::path::Path;
//! use gexf_layout::{GexfExporter, GexfImporter, LayoutParameters, NoProgress, Pipeline};
//!
//! # fn main() -> gexf_layout::Result<()> {
//! let path = Path::new("graph.gexf");
//! let pipeline = Pipeline::import(&GexfImporter::with_defaults(), path, LayoutParameters::default())?;
//! pipeline.run(&mut NoProgress, &GexfExporter::new(), path)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gexf;
pub mod graph;
pub mod io;
pub mod layout;
pub mod pipeline;
pub mod spatial;
pub mod text;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::LayoutParameters;
pub use error::{Error, Result};
pub use gexf::{GexfExporter, GexfImporter};
pub use graph::{GraphStore, Node, NodeId};
pub use io::{Exporter, Importer};
pub use layout::{
    ForceDirectedLayout, LabelAdjuster, LineProgress, NoProgress, OverlapResolver, Progress,
};
pub use pipeline::{Pipeline, PipelineState, RunSummary};
pub use text::{MonospaceMeasure, TextMeasure};
