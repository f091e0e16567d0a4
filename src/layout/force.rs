//! Fruchterman-Reingold force-directed layout.
//!
//! Every pair of nodes repels with `k² / d`, every edge pulls its endpoints
//! together with `d² / k`, where `k = sqrt(area / n)` is the ideal edge length.
//! The summed displacement of each node is scaled by the speed multiplier and
//! clamped to a temperature that cools linearly to zero over the iteration
//! budget.
//!
//! The repulsion pass visits all `n (n - 1) / 2` pairs per iteration.

use tracing::{debug, trace};

use super::placement::separation_direction;
use super::progress::{Progress, Stage};
use crate::config::{Area, ForceConfig};
use crate::error::LayoutError;
use crate::graph::GraphStore;

/// Distance substituted for coincident or nearly coincident nodes.
pub const EPSILON: f64 = 0.01;

/// Outcome of a force-directed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceReport {
    /// Iterations actually executed.
    pub iterations: u32,
    /// Whether the run stopped because the net forces became negligible.
    ///
    /// Measured on the unclamped displacement, so a run that merely cooled
    /// down before reaching equilibrium reports `false`.
    pub converged: bool,
    /// Largest applied node displacement of the last iteration.
    pub last_max_displacement: f64,
    /// Ideal edge length `k` used for the run.
    pub ideal_edge_length: f64,
}

/// Fruchterman-Reingold layout engine.
#[derive(Debug, Clone)]
pub struct ForceDirectedLayout {
    config: ForceConfig,
}

impl ForceDirectedLayout {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ForceConfig::default())
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Ideal edge length for a graph of `node_count` nodes.
    pub fn ideal_edge_length(&self, node_count: usize) -> f64 {
        if node_count == 0 {
            return 0.0;
        }
        (self.config.area.resolve(node_count) / node_count as f64).sqrt()
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let (name, area) = match self.config.area {
            Area::Fixed(area) => ("area.fixed", area),
            Area::PerNode(scale) => ("area.per_node", scale),
        };
        let checks = [
            (name, area, area > 0.0),
            ("speed", self.config.speed, self.config.speed > 0.0),
            ("gravity", self.config.gravity, self.config.gravity >= 0.0),
            (
                "convergence_threshold",
                self.config.convergence_threshold,
                self.config.convergence_threshold >= 0.0,
            ),
        ];
        for (name, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(LayoutError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Run the simulation on the store's positions.
    ///
    /// Graphs with fewer than two nodes are left untouched. On error no
    /// position of the failing iteration has been applied.
    pub fn run(
        &self,
        store: &mut GraphStore,
        progress: &mut dyn Progress,
    ) -> Result<ForceReport, LayoutError> {
        self.validate()?;

        let n = store.node_count();
        let k = self.ideal_edge_length(n);
        let max_iterations = self.config.max_iterations;

        let mut report = ForceReport {
            iterations: 0,
            converged: false,
            last_max_displacement: 0.0,
            ideal_edge_length: k,
        };

        if n < 2 || max_iterations == 0 {
            progress.on_stage_end(Stage::ForceDirected, 0, n < 2);
            report.converged = n < 2;
            return Ok(report);
        }

        let area = self.config.area.resolve(n);
        let t0 = area.sqrt() / 10.0;
        let k_sq = k * k;
        let edges = store.edge_slots();
        let pinned: Vec<bool> = store.node_slice().iter().map(|node| node.pinned).collect();
        let threshold = self.config.convergence_threshold * k;

        debug!(nodes = n, edges = edges.len(), k, area, "force layout started");

        let mut disp_x = vec![0.0; n];
        let mut disp_y = vec![0.0; n];

        for iteration in 0..max_iterations {
            disp_x.fill(0.0);
            disp_y.fill(0.0);

            let (xs, ys) = (store.positions_x(), store.positions_y());

            // Repulsion between every pair
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = xs[i] - xs[j];
                    let dy = ys[i] - ys[j];
                    let dist = (dx * dx + dy * dy).sqrt();
                    let (ux, uy, dist) = if dist < EPSILON {
                        let (ux, uy) = separation_direction(j, i);
                        (ux, uy, EPSILON)
                    } else {
                        (dx / dist, dy / dist, dist)
                    };
                    let force = k_sq / dist;
                    disp_x[i] += ux * force;
                    disp_y[i] += uy * force;
                    disp_x[j] -= ux * force;
                    disp_y[j] -= uy * force;
                }
            }

            // Attraction along edges
            for &(s, t, weight) in &edges {
                if s == t {
                    continue;
                }
                let dx = xs[s] - xs[t];
                let dy = ys[s] - ys[t];
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < EPSILON {
                    continue;
                }
                let force = dist * dist / k * weight;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp_x[s] -= fx;
                disp_y[s] -= fy;
                disp_x[t] += fx;
                disp_y[t] += fy;
            }

            if self.config.gravity > 0.0 {
                let pull = 0.01 * self.config.gravity;
                for i in 0..n {
                    disp_x[i] -= pull * xs[i];
                    disp_y[i] -= pull * ys[i];
                }
            }

            // Scale, clamp and validate before touching any position
            let temperature = t0 * (1.0 - iteration as f64 / max_iterations as f64);
            let mut max_step: f64 = 0.0;
            let mut max_force: f64 = 0.0;
            for i in 0..n {
                if pinned[i] {
                    disp_x[i] = 0.0;
                    disp_y[i] = 0.0;
                    continue;
                }
                let dx = disp_x[i] * self.config.speed;
                let dy = disp_y[i] * self.config.speed;
                let len = (dx * dx + dy * dy).sqrt();
                if !len.is_finite() {
                    return Err(LayoutError::NonFiniteDisplacement {
                        node: store.node_slice()[i].key.clone(),
                        iteration: iteration + 1,
                    });
                }
                let scale = if len > temperature { temperature / len } else { 1.0 };
                disp_x[i] = dx * scale;
                disp_y[i] = dy * scale;
                max_step = max_step.max(len.min(temperature));
                max_force = max_force.max(len);
            }

            let (xs, ys) = store.positions_mut();
            for i in 0..n {
                xs[i] += disp_x[i];
                ys[i] += disp_y[i];
            }

            report.iterations = iteration + 1;
            report.last_max_displacement = max_step;
            trace!(
                iteration = iteration + 1,
                temperature,
                max_step,
                max_force,
                "force iteration"
            );
            progress.on_iteration(Stage::ForceDirected, iteration + 1, max_iterations, max_step);

            if max_force < threshold {
                report.converged = true;
                break;
            }
        }

        debug!(
            iterations = report.iterations,
            converged = report.converged,
            "force layout finished"
        );
        progress.on_stage_end(Stage::ForceDirected, report.iterations, report.converged);
        Ok(report)
    }
}

impl Default for ForceDirectedLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}
