use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LayoutParameters;
use crate::gexf::{GexfExporter, GexfImporter};
use crate::layout::{LineProgress, NoProgress, Progress};
use crate::pipeline::{Pipeline, RunSummary};

#[derive(Parser, Debug)]
#[command(
    name = "gexf-layout",
    version,
    about = "Force-directed layout with overlap and label adjustment for GEXF files"
)]
pub struct Args {
    /// GEXF file to lay out. Rewritten in place unless --output is given.
    pub path: PathBuf,

    /// Write the result here instead of replacing the input
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// TOML file with layout parameters
    #[arg(short = 'c', long = "config", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in parameter set
    #[arg(short = 'p', long = "preset", value_enum)]
    pub preset: Option<Preset>,

    /// Skip the node overlap pass
    #[arg(long = "no-overlap")]
    pub no_overlap: bool,

    /// Skip the label overlap pass
    #[arg(long = "no-labels")]
    pub no_labels: bool,

    /// Do not print per-iteration progress
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Area grows with the node count, speed 2
    PerNode,
    /// Fixed area, speed 3
    Fixed,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let params = load_params(&args)?;
    let output = args.output.clone().unwrap_or_else(|| args.path.clone());

    let importer = GexfImporter::new(params.import.clone());
    let pipeline = Pipeline::import(&importer, &args.path, params)
        .with_context(|| format!("failed to import {}", args.path.display()))?;

    let mut line_progress;
    let mut silent = NoProgress;
    let progress: &mut dyn Progress = if args.quiet {
        &mut silent
    } else {
        line_progress = LineProgress::stdout();
        &mut line_progress
    };

    let summary = pipeline
        .run(progress, &GexfExporter::new(), &output)
        .with_context(|| format!("failed to lay out {}", args.path.display()))?;

    if !args.quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn load_params(args: &Args) -> Result<LayoutParameters> {
    let mut params = match (&args.config, args.preset) {
        (Some(path), _) => LayoutParameters::from_toml_file(path)?,
        (None, Some(Preset::PerNode)) => LayoutParameters::per_node_area(),
        (None, Some(Preset::Fixed)) => LayoutParameters::fixed_area(),
        (None, None) => LayoutParameters::default(),
    };
    if args.no_overlap {
        params.overlap.enabled = false;
    }
    if args.no_labels {
        params.labels.enabled = false;
    }
    Ok(params)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    } else {
        EnvFilter::new(default_level)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_summary(summary: &RunSummary) {
    println!("{} nodes, {} edges", summary.nodes, summary.edges);
    if let Some(force) = &summary.force {
        println!(
            "force: {} iterations, {}",
            force.iterations,
            if force.converged { "converged" } else { "stopped at cap" }
        );
    }
    for (name, report) in [("noverlap", &summary.overlap), ("label-adjust", &summary.labels)] {
        if let Some(report) = report {
            println!(
                "{name}: {} iterations, overlap area {:.2} -> {:.2}",
                report.iterations, report.initial_area, report.final_area
            );
        }
    }
}
