//! The sequential layout pipeline.
//!
//! A [`Pipeline`] owns the [`GraphStore`] from import to export and moves
//! through `Imported → LaidOut → OverlapResolved → LabelAdjusted → Exported`.
//! The two overlap stages may be skipped; going backwards or repeating a stage
//! is a [`PipelineError`]. Any stage error aborts the run and nothing is
//! exported.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::config::LayoutParameters;
use crate::error::{ExportError, PipelineError, Result};
use crate::graph::GraphStore;
use crate::io::{Exporter, Importer};
use crate::layout::{
    ForceDirectedLayout, ForceReport, LabelAdjuster, OverlapReport, OverlapResolver, Progress,
    apply_sizing,
};

/// Position of a pipeline run in the stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineState {
    Imported,
    LaidOut,
    OverlapResolved,
    LabelAdjusted,
    Exported,
}

impl PipelineState {
    pub fn name(self) -> &'static str {
        match self {
            PipelineState::Imported => "imported",
            PipelineState::LaidOut => "laid-out",
            PipelineState::OverlapResolved => "overlap-resolved",
            PipelineState::LabelAdjusted => "label-adjusted",
            PipelineState::Exported => "exported",
        }
    }

    /// Whether a stage may move the run from `self` to `next`.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Imported, LaidOut)
                | (LaidOut, OverlapResolved | LabelAdjusted | Exported)
                | (OverlapResolved, LabelAdjusted | Exported)
                | (LabelAdjusted, Exported)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reports of every stage that ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    /// Node sizes were recomputed from degrees.
    pub resized: bool,
    pub force: Option<ForceReport>,
    pub overlap: Option<OverlapReport>,
    pub labels: Option<OverlapReport>,
}

/// A single layout run over one graph.
#[derive(Debug)]
pub struct Pipeline {
    store: GraphStore,
    params: LayoutParameters,
    state: PipelineState,
    summary: RunSummary,
}

impl Pipeline {
    /// Start a run on an already verified store.
    pub fn new(store: GraphStore, params: LayoutParameters) -> Self {
        let summary = RunSummary {
            nodes: store.node_count(),
            edges: store.edge_count(),
            ..RunSummary::default()
        };
        Self {
            store,
            params,
            state: PipelineState::Imported,
            summary,
        }
    }

    /// Import a graph and start a run on it.
    pub fn import(importer: &dyn Importer, path: &Path, params: LayoutParameters) -> Result<Self> {
        let store = importer.import(path)?;
        info!(
            path = %path.display(),
            nodes = store.node_count(),
            edges = store.edge_count(),
            "graph imported"
        );
        Ok(Self::new(store, params))
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn params(&self) -> &LayoutParameters {
        &self.params
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn check(&self, to: PipelineState) -> std::result::Result<(), PipelineError> {
        if self.state.can_advance_to(to) {
            Ok(())
        } else {
            Err(PipelineError::OutOfOrder {
                from: self.state,
                to,
            })
        }
    }

    /// Apply degree sizing, then run the force-directed layout.
    pub fn layout(&mut self, progress: &mut dyn Progress) -> Result<ForceReport> {
        self.check(PipelineState::LaidOut)?;

        self.summary.resized = apply_sizing(&mut self.store, &self.params.sizing);
        let engine = ForceDirectedLayout::new(self.params.force.clone());
        let report = engine.run(&mut self.store, progress)?;
        info!(
            iterations = report.iterations,
            converged = report.converged,
            "force layout done"
        );

        self.summary.force = Some(report);
        self.state = PipelineState::LaidOut;
        Ok(report)
    }

    /// Remove overlaps between node shapes.
    pub fn resolve_overlaps(&mut self, progress: &mut dyn Progress) -> Result<OverlapReport> {
        self.check(PipelineState::OverlapResolved)?;

        let resolver = OverlapResolver::new(self.params.overlap.clone());
        let report = resolver.run(&mut self.store, progress)?;
        info!(
            iterations = report.iterations,
            converged = report.converged,
            area = report.final_area,
            "overlap removal done"
        );

        self.summary.overlap = Some(report.clone());
        self.state = PipelineState::OverlapResolved;
        Ok(report)
    }

    /// Remove overlaps between label boxes.
    pub fn adjust_labels(&mut self, progress: &mut dyn Progress) -> Result<OverlapReport> {
        self.check(PipelineState::LabelAdjusted)?;

        let adjuster = LabelAdjuster::new(self.params.labels.clone());
        let report = adjuster.run(&mut self.store, progress)?;
        info!(
            iterations = report.iterations,
            converged = report.converged,
            area = report.final_area,
            "label adjustment done"
        );

        self.summary.labels = Some(report.clone());
        self.state = PipelineState::LabelAdjusted;
        Ok(report)
    }

    /// Run every remaining stage enabled in the parameters, stopping before export.
    pub fn run_stages(&mut self, progress: &mut dyn Progress) -> Result<()> {
        if self.state == PipelineState::Imported {
            self.layout(progress)?;
        }
        if self.params.overlap.enabled && self.state == PipelineState::LaidOut {
            self.resolve_overlaps(progress)?;
        }
        if self.params.labels.enabled && self.state < PipelineState::LabelAdjusted {
            self.adjust_labels(progress)?;
        }
        Ok(())
    }

    /// Hand the final store to `write`, ending the run.
    ///
    /// `Exported` is terminal, so the pipeline is consumed whether or not
    /// the write succeeds.
    pub fn export_with<T, F>(self, write: F) -> Result<(T, RunSummary)>
    where
        F: FnOnce(&GraphStore) -> std::result::Result<T, ExportError>,
    {
        self.check(PipelineState::Exported)?;
        let output = write(&self.store)?;
        Ok((output, self.summary))
    }

    /// Write the final store to `path`.
    pub fn export(self, exporter: &dyn Exporter, path: &Path) -> Result<RunSummary> {
        let ((), summary) = self.export_with(|store| exporter.export(store, path))?;
        info!(path = %path.display(), "graph exported");
        Ok(summary)
    }

    /// Run all enabled stages and export.
    pub fn run(
        mut self,
        progress: &mut dyn Progress,
        exporter: &dyn Exporter,
        path: &Path,
    ) -> Result<RunSummary> {
        self.run_stages(progress)?;
        self.export(exporter, path)
    }
}
