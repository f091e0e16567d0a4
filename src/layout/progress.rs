//! Per-iteration progress reporting.
//!
//! Stages receive a `&mut dyn Progress` and call it once per iteration. The
//! reported metric is stage specific: the largest node displacement for the
//! force stage, the total overlap area for the overlap stages.

use std::fmt;
use std::io::{self, Write};

/// The iterating stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ForceDirected,
    Overlap,
    LabelAdjust,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::ForceDirected => "force",
            Stage::Overlap => "noverlap",
            Stage::LabelAdjust => "label-adjust",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer of stage iterations.
pub trait Progress {
    /// Called after every completed iteration (1-based).
    fn on_iteration(&mut self, stage: Stage, iteration: u32, max_iterations: u32, metric: f64);

    /// Called once when a stage finishes, including stages that ran zero iterations.
    fn on_stage_end(&mut self, _stage: Stage, _iterations: u32, _converged: bool) {}
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_iteration(&mut self, _stage: Stage, _iteration: u32, _max_iterations: u32, _metric: f64) {}
}

/// Writes one text line per iteration.
///
/// Output is for humans only; write failures are ignored.
pub struct LineProgress<W: Write> {
    out: W,
}

impl LineProgress<io::Stdout> {
    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Progress for LineProgress<W> {
    fn on_iteration(&mut self, stage: Stage, iteration: u32, max_iterations: u32, metric: f64) {
        let _ = writeln!(
            self.out,
            "{stage} iteration {iteration}/{max_iterations}: {metric:.4}"
        );
    }

    fn on_stage_end(&mut self, stage: Stage, iterations: u32, converged: bool) {
        let state = if converged { "converged" } else { "stopped" };
        let _ = writeln!(self.out, "{stage} {state} after {iterations} iterations");
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_progress_format() {
        let mut progress = LineProgress::new(Vec::new());
        progress.on_iteration(Stage::ForceDirected, 3, 500, 1.5);
        progress.on_stage_end(Stage::ForceDirected, 3, true);

        let text = String::from_utf8(progress.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "force iteration 3/500: 1.5000");
        assert_eq!(lines[1], "force converged after 3 iterations");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Overlap.to_string(), "noverlap");
        assert_eq!(Stage::LabelAdjust.name(), "label-adjust");
    }
}
