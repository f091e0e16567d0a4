//! GEXF import and export.
//!
//! Only the parts of GEXF the layout needs are read: node ids and labels,
//! `viz:position` / `viz:size`, edges with weight and type, and the `meta`
//! block. Attribute declarations and dynamics are ignored.

mod reader;
mod writer;

pub use reader::GexfImporter;
pub use writer::GexfExporter;
