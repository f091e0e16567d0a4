//! Layout parameters.
//!
//! All tunables of the pipeline live in [`LayoutParameters`], an explicit value
//! handed to each stage. Every section has compiled-in defaults and can be
//! overridden from a TOML file:
//!
//! ```toml
//! [force]
//! area = { per_node = 2000.0 }
//! speed = 2.0
//!
//! [labels]
//! enabled = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// How the simulation area is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    /// Absolute area, independent of the node count.
    Fixed(f64),
    /// Area grows linearly with the node count: `per_node * n`.
    PerNode(f64),
}

impl Area {
    /// Resolve the area for a graph of `node_count` nodes.
    pub fn resolve(self, node_count: usize) -> f64 {
        match self {
            Area::Fixed(area) => area,
            Area::PerNode(scale) => scale * node_count as f64,
        }
    }
}

/// Configuration for the force-directed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForceConfig {
    /// Simulation area (default: fixed 10000).
    pub area: Area,
    /// Multiplier applied to the summed displacement (default: 1.0).
    pub speed: f64,
    /// Pull toward the origin (default: 0.0, disabled).
    pub gravity: f64,
    /// Iteration cap (default: 500).
    pub max_iterations: u32,
    /// Converged once the largest step is below `convergence_threshold * k`
    /// (default: 0.001).
    pub convergence_threshold: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            area: Area::Fixed(10_000.0),
            speed: 1.0,
            gravity: 0.0,
            max_iterations: 500,
            convergence_threshold: 0.001,
        }
    }
}

/// Bounding shape used by the overlap stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Circle,
    Box,
}

/// Configuration for the overlap removal stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlapConfig {
    pub enabled: bool,
    /// Iteration cap (default: 50).
    pub max_iterations: u32,
    /// Extra clearance added around every shape (default: 5.0).
    pub margin: f64,
    /// Scale applied to node sizes before the margin (default: 1.0).
    pub ratio: f64,
    pub shape: ShapeKind,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 50,
            margin: 5.0,
            ratio: 1.0,
            shape: ShapeKind::Circle,
        }
    }
}

/// Configuration for the label-aware overlap stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub enabled: bool,
    /// Iteration cap (default: 50).
    pub max_iterations: u32,
    /// Font size in layout units (default: 12.0).
    pub font_size: f64,
    /// Average glyph advance as a fraction of the font size (default: 0.6).
    pub char_width: f64,
    /// Line height as a fraction of the font size (default: 1.2).
    pub line_height: f64,
    /// Extra clearance around every label box (default: 2.0).
    pub margin: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 50,
            font_size: 12.0,
            char_width: 0.6,
            line_height: 1.2,
            margin: 2.0,
        }
    }
}

/// Source of node sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Keep the sizes the importer produced.
    #[default]
    Keep,
    /// Rank by number of incoming edges.
    InDegree,
    /// Rank by number of outgoing edges.
    OutDegree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingConfig {
    pub mode: SizingMode,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            mode: SizingMode::Keep,
            min_size: 10.0,
            max_size: 50.0,
        }
    }
}

/// Importer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Radius for nodes without a `viz:size` (default: 10.0).
    pub default_node_size: f64,
    /// Spacing of the spiral used for nodes without a `viz:position` (default: 30.0).
    pub placement_spacing: f64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_node_size: 10.0,
            placement_spacing: 30.0,
        }
    }
}

/// Every tunable of a layout run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutParameters {
    pub force: ForceConfig,
    pub overlap: OverlapConfig,
    pub labels: LabelConfig,
    pub sizing: SizingConfig,
    pub import: ImportConfig,
}

impl LayoutParameters {
    /// Area proportional to the node count, faster simulation.
    pub fn per_node_area() -> Self {
        let mut params = Self::default();
        params.force.area = Area::PerNode(2_000.0);
        params.force.speed = 2.0;
        params
    }

    /// Fixed area, fastest simulation.
    pub fn fixed_area() -> Self {
        let mut params = Self::default();
        params.force.area = Area::Fixed(10_000.0);
        params.force.speed = 3.0;
        params
    }

    /// Parse parameters from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
