use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use pitchtrack::detector::{DetectionsReader, ReplayDetector};
use pitchtrack::report::{source_id, ResultLog};
use pitchtrack::{analyze_with, Config};

/// Replays recorded ball detections of one delivery and classifies its length.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Detections file, one `<offset_ms>: <json array>` line per frame
    detections: PathBuf,

    /// JSON configuration, defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV log the result row is appended to
    #[arg(short, long, default_value = "output/analytics.csv")]
    log: PathBuf,

    /// Name identifying the delivery in the log, defaults to the detections file name
    #[arg(short, long)]
    source: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pitchtrack=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let file = std::fs::File::open(&args.detections)
        .with_context(|| format!("opening detections {}", args.detections.display()))?;
    let reader = DetectionsReader::new(std::io::BufReader::new(file));

    let mut detector = ReplayDetector::new(config.detector.clone());

    info!("processing {}", args.detections.display());

    let session = analyze_with(&config, &mut detector, reader, |frame, report, session| {
        trace!(offset = frame.offset, trail = session.trail().count(), "{}", report.summary);
    })?;

    let source = args
        .source
        .clone()
        .unwrap_or_else(|| source_id(&args.detections));
    let log = ResultLog::new(&args.log);

    if session.finish(&log, &source)? {
        info!("analytics saved to {}", log.path().display());
    } else {
        info!("no bounce found, nothing logged");
    }

    println!("{}: {}", source, session.summary());

    Ok(())
}
