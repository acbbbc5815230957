use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use image::ImageReader;
use log::{info, LevelFilter};
use quadscan::detect::gray_view;
use quadscan::{DetectionReport, GroupSummary, QuadDetector, QuadDetectorParams, ScaleReport};
use serde::Serialize;

#[cfg(feature = "tracing")]
use quadscan_core::init_tracing;
#[cfg(not(feature = "tracing"))]
use quadscan_core::init_with_level;

/// Find quadrilateral marker candidates in an image and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "quadscan", version, about)]
struct Args {
    /// Input image; any format the `image` crate decodes.
    image: PathBuf,

    /// Detector parameters as JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Include per-scale statistics and duplicate groups.
    #[arg(long)]
    report: bool,

    /// off, error, warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[arg(long)]
    win_min: Option<u32>,

    #[arg(long)]
    win_max: Option<u32>,

    #[arg(long)]
    win_step: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("logger: {0}")]
    Logger(log::SetLoggerError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{path}: invalid parameters: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Detect(#[from] quadscan::QuadDetectError),
    #[error("encoding output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct CandidateOut {
    corners: [[f32; 2]; 4],
    window_size: u32,
    contour_len: usize,
}

#[derive(Debug, Serialize)]
struct Output {
    image: String,
    width: usize,
    height: usize,
    candidates: Vec<CandidateOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pooled: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scales: Option<Vec<ScaleReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<GroupSummary>>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) -> Result<(), CliError> {
    let level = LevelFilter::from_str(level).map_err(|_| CliError::LogLevel(level.to_string()))?;
    #[cfg(not(feature = "tracing"))]
    init_with_level(level).map_err(CliError::Logger)?;
    #[cfg(feature = "tracing")]
    init_tracing(false, level);
    Ok(())
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(args)))]
fn run(args: Args) -> Result<(), CliError> {
    init_logging(&args.log_level)?;

    let params = load_params(&args)?;
    let detector = QuadDetector::new(params)?;

    let img = ImageReader::open(&args.image)
        .map_err(|source| CliError::Io {
            path: args.image.clone(),
            source,
        })?
        .decode()
        .map_err(|source| CliError::Image {
            path: args.image.clone(),
            source,
        })?
        .to_luma8();

    let report = detector.detect_with_report(&gray_view(&img))?;
    info!(
        "{}: {} candidates from {} pooled",
        args.image.display(),
        report.candidates.len(),
        report.pooled
    );

    let output = build_output(&args.image, report, args.report);
    let json = serde_json::to_string_pretty(&output)?;
    match &args.out {
        Some(path) => write_file(path, &json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn load_params(args: &Args) -> Result<QuadDetectorParams, CliError> {
    let mut params = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => QuadDetectorParams::default(),
    };
    if let Some(v) = args.win_min {
        params.adaptive_thresh_win_size_min = v;
    }
    if let Some(v) = args.win_max {
        params.adaptive_thresh_win_size_max = v;
    }
    if let Some(v) = args.win_step {
        params.adaptive_thresh_win_size_step = v;
    }
    Ok(params)
}

fn build_output(image: &Path, report: DetectionReport, verbose: bool) -> Output {
    let candidates = report
        .candidates
        .iter()
        .map(|c| CandidateOut {
            corners: c.corners.map(|p| [p.x, p.y]),
            window_size: c.window_size,
            contour_len: c.perimeter(),
        })
        .collect();
    Output {
        image: image.to_string_lossy().into_owned(),
        width: report.image_width,
        height: report.image_height,
        candidates,
        pooled: verbose.then_some(report.pooled),
        scales: verbose.then_some(report.scales),
        groups: verbose.then_some(report.groups),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    info!("wrote {}", path.display());
    Ok(())
}
