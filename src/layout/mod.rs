//! Layout stages operating on a [`GraphStore`](crate::graph::GraphStore).
//!
//! Every stage takes the store by exclusive reference together with its own
//! configuration and a progress observer, mutates positions (or sizes, for
//! sizing) and returns a report. Topology is never touched.

pub mod force;
pub mod label_adjust;
pub mod noverlap;
pub mod placement;
pub mod progress;
pub mod shape;
pub mod sizing;

pub use force::{ForceDirectedLayout, ForceReport};
pub use label_adjust::LabelAdjuster;
pub use noverlap::{OverlapReport, OverlapResolver};
pub use progress::{LineProgress, NoProgress, Progress, Stage};
pub use shape::Shape;
pub use sizing::apply_sizing;
