//! Command-line driver for flipping-ratio reduction of HB3A scans.
#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand, ValueEnum};

use flipratio_core::{PeakCombine, ReductionConfig};
use flipratio_io::{
    compute_flipping_ratio, load_scan_image, read_ub_matrix, reduce_scan_pairs, PairOutcome,
    ScanFileSet,
};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    FlipratioIo(#[from] flipratio_io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

/// Peak combination policy selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Combine {
    /// Union of the spin-up and spin-down peak masks
    Or,
    /// Intersection of the spin-up and spin-down peak masks
    And,
}

impl From<Combine> for PeakCombine {
    fn from(value: Combine) -> Self {
        match value {
            Combine::Or => PeakCombine::Or,
            Combine::And => PeakCombine::And,
        }
    }
}

/// Flipping-ratio reduction for four-circle polarized diffraction.
#[derive(Parser)]
#[command(name = "flipratio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce every spin pair of a scan into flipping ratios
    Reduce {
        /// Directory holding the scan's data files
        #[arg(long)]
        data_dir: PathBuf,

        /// Experiment number
        #[arg(long)]
        exp: u32,

        /// Scan number
        #[arg(long)]
        scan: u32,

        /// Gaussian smoothing width for peak detection (pixels)
        #[arg(long, default_value = "3.0")]
        sigma: f64,

        /// Radius of the border padding disk (pixels)
        #[arg(long, default_value = "10")]
        radius: usize,

        /// How to combine the per-spin peak masks
        #[arg(long, value_enum, default_value = "or")]
        combine: Combine,

        /// Write reduction records as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show dimensions, reflection, and counts of one detector frame
    Info {
        /// Detector frame XML file
        input: PathBuf,
    },

    /// Print the UB matrix from a scan .dat file
    Ub {
        /// Scan .dat file
        input: PathBuf,
    },

    /// Reduce a single explicit pair of frames
    Pair {
        /// Spin-up frame
        spin_up: PathBuf,

        /// Spin-down frame
        spin_down: PathBuf,

        /// Gaussian smoothing width for peak detection (pixels)
        #[arg(long, default_value = "3.0")]
        sigma: f64,

        /// Radius of the border padding disk (pixels)
        #[arg(long, default_value = "10")]
        radius: usize,
    },
}

/// One reflection in the JSON reduction report.
#[derive(Serialize)]
struct ReductionRecord {
    spin_up: String,
    spin_down: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    h: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    l: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ReductionRecord {
    fn from_outcome(outcome: &PairOutcome) -> Self {
        let mut record = Self {
            spin_up: outcome.pair.spin_up.display().to_string(),
            spin_down: outcome.pair.spin_down.display().to_string(),
            h: None,
            k: None,
            l: None,
            ratio: None,
            sigma: None,
            rejection: None,
            error: None,
        };
        match &outcome.reduction {
            Ok(reduction) => {
                record.h = Some(reduction.metadata.hkl.h);
                record.k = Some(reduction.metadata.hkl.k);
                record.l = Some(reduction.metadata.hkl.l);
                if let Some((ratio, sigma)) = reduction.ratio() {
                    record.ratio = Some(ratio);
                    record.sigma = Some(sigma);
                }
                record.rejection = reduction.rejection().map(|r| r.as_str().to_owned());
            }
            Err(err) => record.error = Some(err.to_string()),
        }
        record
    }
}

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Reduce {
            data_dir,
            exp,
            scan,
            sigma,
            radius,
            combine,
            output,
        } => {
            let config = ReductionConfig::default()
                .with_sigma(sigma)
                .with_disk_radius(radius)
                .with_peak_combine(combine.into());

            let set = ScanFileSet::new(&data_dir, exp, scan);
            let pairs = set.discover_pairs()?;
            eprintln!("Reducing {} pair(s) of exp {} scan {}...", pairs.len(), exp, scan);

            let outcomes = reduce_scan_pairs(&pairs, &config);
            let mut accepted = 0usize;
            for outcome in &outcomes {
                print_outcome(outcome);
                if let Ok(reduction) = &outcome.reduction {
                    if reduction.is_accepted() {
                        accepted += 1;
                    }
                }
            }
            eprintln!("{} of {} pair(s) accepted", accepted, outcomes.len());

            if let Some(path) = output {
                let records: Vec<ReductionRecord> =
                    outcomes.iter().map(ReductionRecord::from_outcome).collect();
                let mut file = File::create(&path)?;
                serde_json::to_writer_pretty(&mut file, &records)?;
                file.write_all(b"\n")?;
                eprintln!("Report written to {}", path.display());
            }
        }

        Commands::Info { input } => {
            let (image, metadata) = load_scan_image(&input)?;
            let (rows, cols) = image.dim();
            println!("file:    {}", input.display());
            println!("size:    {} x {} pixels", rows, cols);
            println!("hkl:     {}", metadata.hkl);
            println!("counts:  {}", image.total_counts());
        }

        Commands::Ub { input } => {
            let ub = read_ub_matrix(&input)?;
            for row in &ub {
                println!("{:>12.6} {:>12.6} {:>12.6}", row[0], row[1], row[2]);
            }
        }

        Commands::Pair {
            spin_up,
            spin_down,
            sigma,
            radius,
        } => {
            let config = ReductionConfig::default()
                .with_sigma(sigma)
                .with_disk_radius(radius);
            let reduction = compute_flipping_ratio(&spin_up, &spin_down, &config)?;
            match reduction.ratio() {
                Some((ratio, sigma)) => {
                    println!("{} ratio = {:.4} +- {:.4}", reduction.metadata.hkl, ratio, sigma);
                }
                None => {
                    let reason = reduction
                        .rejection()
                        .map_or("unknown", |r| r.as_str());
                    println!("{} rejected: {}", reduction.metadata.hkl, reason);
                }
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &PairOutcome) {
    match &outcome.reduction {
        Ok(reduction) => match reduction.ratio() {
            Some((ratio, sigma)) => {
                println!(
                    "{}  ratio = {:.4} +- {:.4}",
                    reduction.metadata.hkl, ratio, sigma
                );
            }
            None => {
                let reason = reduction.rejection().map_or("unknown", |r| r.as_str());
                println!("{}  rejected: {}", reduction.metadata.hkl, reason);
            }
        },
        Err(err) => {
            println!(
                "{}  failed: {}",
                outcome.pair.spin_up.display(),
                err
            );
        }
    }
}
