//! Noverlap: iterative removal of overlapping node shapes.
//!
//! Each iteration finds every overlapping pair (R-tree broad phase, exact
//! shape test), computes the minimum translation vector separating the pair
//! and splits it between the two nodes by inverse mass. Corrections from all
//! pairs are summed per node and applied together at the end of the iteration.
//!
//! Summed corrections can push a node into a third shape. A trial update is
//! therefore only accepted when the total overlap area does not grow; otherwise
//! the step is halved. This keeps the overlap area non-increasing from one
//! iteration to the next.

use tracing::{debug, trace, warn};

use super::progress::{Progress, Stage};
use super::shape::{Contact, Shape, contact};
use crate::config::{OverlapConfig, ShapeKind};
use crate::error::OverlapError;
use crate::graph::GraphStore;
use crate::spatial::{BoxIndex, NodeBox};

/// Maximum number of step halvings per iteration before the pass gives up.
const MAX_STEP_HALVINGS: u32 = 8;

/// Outcome of an overlap removal pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    /// Accepted iterations, never more than the configured cap.
    pub iterations: u32,
    /// No pair overlaps any more.
    pub converged: bool,
    pub initial_area: f64,
    pub final_area: f64,
    /// Overlapping pairs left when the pass stopped.
    pub remaining_pairs: usize,
    /// Total overlap area before the first iteration and after each accepted one.
    pub area_history: Vec<f64>,
}

/// Removes overlaps between node bounding shapes.
#[derive(Debug, Clone)]
pub struct OverlapResolver {
    config: OverlapConfig,
}

impl OverlapResolver {
    pub fn new(config: OverlapConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(OverlapConfig::default())
    }

    pub fn config(&self) -> &OverlapConfig {
        &self.config
    }

    /// Bounding shape of every node, in slot order.
    pub fn shapes(&self, store: &GraphStore) -> Vec<Shape> {
        store
            .node_slice()
            .iter()
            .map(|node| {
                let extent = node.size * self.config.ratio + self.config.margin;
                match self.config.shape {
                    ShapeKind::Circle => Shape::Circle { radius: extent },
                    ShapeKind::Box => Shape::Box {
                        half_width: extent,
                        half_height: extent,
                    },
                }
            })
            .collect()
    }

    /// Separate overlapping nodes.
    ///
    /// Stopping at the iteration cap with overlaps left is not an error.
    pub fn run(
        &self,
        store: &mut GraphStore,
        progress: &mut dyn Progress,
    ) -> Result<OverlapReport, OverlapError> {
        let shapes = self.shapes(store);
        resolve(
            store,
            &shapes,
            self.config.max_iterations,
            Stage::Overlap,
            progress,
        )
    }
}

impl Default for OverlapResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Shared resolution loop for the plain and the label-aware pass.
pub(crate) fn resolve(
    store: &mut GraphStore,
    shapes: &[Shape],
    max_iterations: u32,
    stage: Stage,
    progress: &mut dyn Progress,
) -> Result<OverlapReport, OverlapError> {
    validate(store, shapes)?;

    let n = store.node_count();
    let inverse_mass: Vec<f64> = store.node_slice().iter().map(|node| node.inverse_mass()).collect();
    let mut xs = store.positions_x().to_vec();
    let mut ys = store.positions_y().to_vec();

    let mut contacts = find_contacts(&xs, &ys, shapes);
    let initial_area = total_area(&contacts);
    let mut area = initial_area;
    let mut area_history = vec![initial_area];
    let mut iterations = 0;

    debug!(%stage, nodes = n, pairs = contacts.len(), area, "overlap removal started");

    let mut cx = vec![0.0; n];
    let mut cy = vec![0.0; n];

    while iterations < max_iterations && !contacts.is_empty() {
        cx.fill(0.0);
        cy.fill(0.0);
        for c in &contacts {
            let (wi, wj) = (inverse_mass[c.i], inverse_mass[c.j]);
            let total = wi + wj;
            if total <= 0.0 {
                continue;
            }
            cx[c.i] -= c.mtv.0 * wi / total;
            cy[c.i] -= c.mtv.1 * wi / total;
            cx[c.j] += c.mtv.0 * wj / total;
            cy[c.j] += c.mtv.1 * wj / total;
        }

        if cx.iter().chain(&cy).all(|&d| d == 0.0) {
            debug!(%stage, pairs = contacts.len(), "only immovable pairs overlap");
            break;
        }

        let mut accepted = None;
        let mut step = 1.0;
        for _ in 0..=MAX_STEP_HALVINGS {
            let trial_x: Vec<f64> = xs.iter().zip(&cx).map(|(x, d)| x + d * step).collect();
            let trial_y: Vec<f64> = ys.iter().zip(&cy).map(|(y, d)| y + d * step).collect();
            let trial = find_contacts(&trial_x, &trial_y, shapes);
            let trial_area = total_area(&trial);
            if trial_area <= area {
                accepted = Some((trial_x, trial_y, trial, trial_area));
                break;
            }
            step *= 0.5;
        }

        let Some((trial_x, trial_y, trial, trial_area)) = accepted else {
            warn!(%stage, iteration = iterations + 1, area, "no correction reduces the overlap, stopping");
            break;
        };

        xs = trial_x;
        ys = trial_y;
        contacts = trial;
        area = trial_area;
        iterations += 1;
        area_history.push(area);

        trace!(%stage, iteration = iterations, step, pairs = contacts.len(), area, "overlap iteration");
        progress.on_iteration(stage, iterations, max_iterations, area);
    }

    {
        let (store_x, store_y) = store.positions_mut();
        store_x.copy_from_slice(&xs);
        store_y.copy_from_slice(&ys);
    }

    let converged = contacts.is_empty();
    if !converged {
        warn!(%stage, iterations, pairs = contacts.len(), area, "overlaps remain");
    }
    debug!(%stage, iterations, converged, area, "overlap removal finished");
    progress.on_stage_end(stage, iterations, converged);

    Ok(OverlapReport {
        iterations,
        converged,
        initial_area,
        final_area: area,
        remaining_pairs: contacts.len(),
        area_history,
    })
}

fn validate(store: &GraphStore, shapes: &[Shape]) -> Result<(), OverlapError> {
    let (xs, ys) = (store.positions_x(), store.positions_y());
    for (i, node) in store.node_slice().iter().enumerate() {
        let shape = shapes.get(i).copied().unwrap_or(Shape::Circle { radius: f64::NAN });
        if !shape.is_well_formed() {
            let (half_width, half_height) = shape.half_extents();
            return Err(OverlapError::MalformedShape {
                node: node.key.clone(),
                half_width,
                half_height,
            });
        }
        if !xs[i].is_finite() || !ys[i].is_finite() {
            return Err(OverlapError::NonFinitePosition {
                node: node.key.clone(),
            });
        }
    }
    Ok(())
}

/// All overlapping pairs, ordered by `(i, j)`.
fn find_contacts(xs: &[f64], ys: &[f64], shapes: &[Shape]) -> Vec<Contact> {
    let boxes = shapes
        .iter()
        .enumerate()
        .map(|(slot, shape)| {
            let (min, max) = shape.envelope(xs[slot], ys[slot]);
            NodeBox::new(slot, min, max)
        })
        .collect();
    let index = BoxIndex::build(boxes);

    index
        .candidate_pairs()
        .into_iter()
        .filter_map(|(i, j)| contact(i, (xs[i], ys[i], shapes[i]), j, (xs[j], ys[j], shapes[j])))
        .collect()
}

fn total_area(contacts: &[Contact]) -> f64 {
    contacts.iter().map(|c| c.area).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeId};
    use crate::layout::progress::NoProgress;

    fn resolver(max_iterations: u32, shape: ShapeKind) -> OverlapResolver {
        OverlapResolver::new(OverlapConfig {
            enabled: true,
            max_iterations,
            margin: 0.0,
            ratio: 1.0,
            shape,
        })
    }

    fn store_from(points: &[(f64, f64)]) -> GraphStore {
        let mut store = GraphStore::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            store.add_node(Node::new(format!("n{i}")), x, y).unwrap();
        }
        store
    }

    #[test]
    fn test_no_overlap_is_noop() {
        let mut store = store_from(&[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();

        assert_eq!(report.iterations, 0);
        assert!(report.converged);
        assert_eq!(report.final_area, 0.0);
        assert_eq!(store.positions_x(), &[0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_empty_and_singleton() {
        let mut store = GraphStore::new();
        let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();
        assert_eq!(report.iterations, 0);

        let mut store = store_from(&[(1.0, 2.0)]);
        let report = resolver(50, ShapeKind::Box).run(&mut store, &mut NoProgress).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(store.position(NodeId(0)), Some((1.0, 2.0)));
    }

    #[test]
    fn test_pair_separates_evenly() {
        let mut store = store_from(&[(0.0, 0.0), (15.0, 0.0)]);
        let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();

        assert!(report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(store.position(NodeId(0)), Some((-2.5, 0.0)));
        assert_eq!(store.position(NodeId(1)), Some((17.5, 0.0)));
    }

    #[test]
    fn test_distant_node_untouched() {
        let mut store = store_from(&[(0.0, 0.0), (15.0, 0.0), (500.0, 500.0)]);
        let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();

        assert!(report.converged);
        assert_eq!(store.position(NodeId(0)), Some((-2.5, 0.0)));
        assert_eq!(store.position(NodeId(2)), Some((500.0, 500.0)));
    }

    #[test]
    fn test_correction_split_by_inverse_mass() {
        let mut store = GraphStore::new();
        store.add_node(Node::new("heavy").with_mass(3.0), 0.0, 0.0).unwrap();
        store.add_node(Node::new("light"), 15.0, 0.0).unwrap();

        resolver(1, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();
        let (heavy_x, _) = store.position(NodeId(0)).unwrap();
        let (light_x, _) = store.position(NodeId(1)).unwrap();
        assert!((heavy_x + 1.25).abs() < 1e-9, "heavy moved to {heavy_x}");
        assert!((light_x - 18.75).abs() < 1e-9, "light moved to {light_x}");
    }

    #[test]
    fn test_pinned_partner_takes_whole_correction() {
        let mut store = store_from(&[(0.0, 0.0), (15.0, 0.0)]);
        store.pin_node(NodeId(0));
        resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();

        assert_eq!(store.position(NodeId(0)), Some((0.0, 0.0)));
        assert_eq!(store.position(NodeId(1)), Some((20.0, 0.0)));
    }

    #[test]
    fn test_two_pinned_nodes_left_alone() {
        let mut store = store_from(&[(0.0, 0.0), (5.0, 0.0)]);
        store.pin_node(NodeId(0));
        store.pin_node(NodeId(1));
        let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();

        assert_eq!(report.iterations, 0);
        assert!(!report.converged);
        assert_eq!(report.remaining_pairs, 1);
        assert_eq!(store.positions_x(), &[0.0, 5.0]);
    }

    #[test]
    fn test_area_history_monotone_on_cluster() {
        let points: Vec<(f64, f64)> = (0..30)
            .map(|i| ((i % 6) as f64 * 3.0, (i / 6) as f64 * 3.0))
            .collect();
        for shape in [ShapeKind::Circle, ShapeKind::Box] {
            let mut store = store_from(&points);
            let report = resolver(50, shape).run(&mut store, &mut NoProgress).unwrap();

            assert!(report.final_area < report.initial_area);
            assert_eq!(report.area_history.len(), report.iterations as usize + 1);
            for window in report.area_history.windows(2) {
                assert!(window[1] <= window[0], "area grew: {window:?}");
            }
        }
    }

    #[test]
    fn test_iteration_cap() {
        let points: Vec<(f64, f64)> = (0..20).map(|i| (i as f64 * 0.5, 0.0)).collect();
        let mut store = store_from(&points);
        let report = resolver(2, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();
        assert!(report.iterations <= 2);
    }

    #[test]
    fn test_coincident_nodes_deterministic() {
        let run = || {
            let mut store = store_from(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
            let report = resolver(50, ShapeKind::Circle).run(&mut store, &mut NoProgress).unwrap();
            (store.positions_x().to_vec(), store.positions_y().to_vec(), report)
        };
        let (x1, y1, report) = run();
        let (x2, y2, _) = run();

        assert_eq!(x1, x2);
        assert_eq!(y1, y2);
        assert!(report.final_area < report.initial_area);
    }

    #[test]
    fn test_box_shapes_separate_along_one_axis() {
        let mut store = store_from(&[(0.0, 0.0), (18.0, 2.0)]);
        let report = resolver(50, ShapeKind::Box).run(&mut store, &mut NoProgress).unwrap();

        assert!(report.converged);
        assert_eq!(store.position(NodeId(0)), Some((-1.0, 0.0)));
        assert_eq!(store.position(NodeId(1)), Some((19.0, 2.0)));
    }

    #[test]
    fn test_malformed_shape_is_error() {
        let mut store = store_from(&[(0.0, 0.0), (1.0, 0.0)]);
        let resolver = OverlapResolver::new(OverlapConfig {
            margin: -100.0,
            ..OverlapConfig::default()
        });
        let err = resolver.run(&mut store, &mut NoProgress).unwrap_err();
        assert!(matches!(err, OverlapError::MalformedShape { ref node, .. } if node == "n0"));
    }

    #[test]
    fn test_non_finite_position_is_error() {
        let mut store = store_from(&[(0.0, 0.0), (f64::NAN, 0.0)]);
        let err = OverlapResolver::with_defaults()
            .run(&mut store, &mut NoProgress)
            .unwrap_err();
        assert_eq!(
            err,
            OverlapError::NonFinitePosition {
                node: "n1".to_string()
            }
        );
    }
}
