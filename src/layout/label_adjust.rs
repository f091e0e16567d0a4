//! Label-aware overlap removal.
//!
//! Runs the noverlap loop again with every node's box grown to cover its
//! label. Labels are usually much larger than the node shapes, so this pass
//! runs last on positions that are already separated.

use super::noverlap::{OverlapReport, resolve};
use super::progress::{Progress, Stage};
use super::shape::Shape;
use crate::config::LabelConfig;
use crate::error::OverlapError;
use crate::graph::{GraphStore, Node};
use crate::text::{MonospaceMeasure, TextMeasure};

/// Separates nodes by their label boxes.
#[derive(Debug, Clone)]
pub struct LabelAdjuster<M: TextMeasure = MonospaceMeasure> {
    config: LabelConfig,
    measure: M,
}

impl LabelAdjuster {
    /// Adjuster measuring labels with the configured monospace metric.
    pub fn new(config: LabelConfig) -> Self {
        let measure = MonospaceMeasure::new(config.char_width, config.line_height);
        Self { config, measure }
    }

    pub fn with_defaults() -> Self {
        Self::new(LabelConfig::default())
    }
}

impl<M: TextMeasure> LabelAdjuster<M> {
    /// Adjuster with a custom text metric.
    pub fn with_measure(config: LabelConfig, measure: M) -> Self {
        Self { config, measure }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Label box of a node: the node's own extent grown to the label's.
    pub fn label_shape(&self, node: &Node) -> Shape {
        let text = node.label.as_deref().unwrap_or(&node.key);
        let (width, height) = self.measure.measure(text, self.config.font_size);
        Shape::Box {
            half_width: node.size.max(width / 2.0) + self.config.margin,
            half_height: node.size.max(height / 2.0) + self.config.margin,
        }
    }

    /// Label boxes of every node, in slot order.
    pub fn shapes(&self, store: &GraphStore) -> Vec<Shape> {
        store
            .node_slice()
            .iter()
            .map(|node| self.label_shape(node))
            .collect()
    }

    fn validate(&self) -> Result<(), OverlapError> {
        let checks = [
            ("font_size", self.config.font_size),
            ("char_width", self.config.char_width),
            ("line_height", self.config.line_height),
            ("margin", self.config.margin),
        ];
        for (name, value) in checks {
            // NaN fails the comparison too
            if !(value.is_finite() && value >= 0.0) {
                return Err(OverlapError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Separate nodes whose label boxes overlap.
    pub fn run(
        &self,
        store: &mut GraphStore,
        progress: &mut dyn Progress,
    ) -> Result<OverlapReport, OverlapError> {
        self.validate()?;
        let shapes = self.shapes(store);
        resolve(
            store,
            &shapes,
            self.config.max_iterations,
            Stage::LabelAdjust,
            progress,
        )
    }
}

impl Default for LabelAdjuster {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::layout::progress::NoProgress;

    struct FixedMeasure(f64, f64);

    impl TextMeasure for FixedMeasure {
        fn measure(&self, _text: &str, _font_size: f64) -> (f64, f64) {
            (self.0, self.1)
        }
    }

    #[test]
    fn test_label_shape_covers_label() {
        let adjuster = LabelAdjuster::with_defaults();
        let node = Node::new("n").with_label("a long label text");

        // 17 columns * 0.6 * 12 = 122.4 wide, 1 line * 1.2 * 12 = 14.4 high
        match adjuster.label_shape(&node) {
            Shape::Box {
                half_width,
                half_height,
            } => {
                assert!((half_width - (61.2 + 2.0)).abs() < 1e-9);
                assert!((half_height - (10.0 + 2.0)).abs() < 1e-9);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_missing_label_falls_back_to_key() {
        let adjuster = LabelAdjuster::with_measure(LabelConfig::default(), FixedMeasure(0.0, 0.0));
        let shape = adjuster.label_shape(&Node::new("key").with_size(4.0));
        assert_eq!(
            shape,
            Shape::Box {
                half_width: 6.0,
                half_height: 6.0
            }
        );
    }

    #[test]
    fn test_overlapping_labels_are_separated() {
        let mut store = GraphStore::new();
        store
            .add_node(Node::new("a").with_label("a long label text"), 0.0, 0.0)
            .unwrap();
        store
            .add_node(Node::new("b").with_label("another long label"), 40.0, 0.0)
            .unwrap();

        let report = LabelAdjuster::with_defaults()
            .run(&mut store, &mut NoProgress)
            .unwrap();

        assert!(report.converged);
        assert!(report.initial_area > 0.0);
        assert_eq!(report.final_area, 0.0);

        // Label boxes are wide and short, so the pair separates vertically
        let (ax, ay) = store.position(NodeId(0)).unwrap();
        let (bx, by) = store.position(NodeId(1)).unwrap();
        assert_eq!((ax, bx), (0.0, 40.0));
        assert!((by - ay).abs() >= 24.0 - 1e-6);
    }

    #[test]
    fn test_custom_measure_drives_extents() {
        let config = LabelConfig {
            margin: 0.0,
            ..LabelConfig::default()
        };
        let adjuster = LabelAdjuster::with_measure(config, FixedMeasure(100.0, 40.0));
        let mut store = GraphStore::new();
        store.add_node(Node::new("a"), 0.0, 0.0).unwrap();
        store.add_node(Node::new("b"), 90.0, 0.0).unwrap();

        let report = adjuster.run(&mut store, &mut NoProgress).unwrap();
        assert!(report.converged);
        let (ax, _) = store.position(NodeId(0)).unwrap();
        let (bx, _) = store.position(NodeId(1)).unwrap();
        assert!((bx - ax - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_iteration_cap_respected() {
        let config = LabelConfig {
            max_iterations: 3,
            ..LabelConfig::default()
        };
        let mut store = GraphStore::new();
        for i in 0..12 {
            store
                .add_node(Node::new(format!("n{i}")).with_label("overlapping"), i as f64, 0.0)
                .unwrap();
        }
        let report = LabelAdjuster::new(config)
            .run(&mut store, &mut NoProgress)
            .unwrap();
        assert!(report.iterations <= 3);
    }

    #[test]
    fn test_invalid_metrics_rejected() {
        let mut store = GraphStore::new();
        store
            .add_node(Node::new("a").with_label("fifteen letters"), 0.0, 0.0)
            .unwrap();
        store
            .add_node(Node::new("b").with_label("fifteen letters"), 30.0, 0.0)
            .unwrap();

        let err = LabelAdjuster::new(LabelConfig {
            char_width: f64::NAN,
            ..LabelConfig::default()
        })
        .run(&mut store, &mut NoProgress)
        .unwrap_err();
        assert!(matches!(err, OverlapError::InvalidParameter { name: "char_width", .. }));

        let err = LabelAdjuster::new(LabelConfig {
            font_size: -12.0,
            ..LabelConfig::default()
        })
        .run(&mut store, &mut NoProgress)
        .unwrap_err();
        assert_eq!(
            err,
            OverlapError::InvalidParameter {
                name: "font_size",
                value: -12.0
            }
        );
        assert_eq!(store.positions_x(), &[0.0, 30.0]);
    }
}
