use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "deckform", version, about = "Convert a slide deck onto template layouts")]
struct Cli {
    /// Template catalog JSON.
    #[arg(long)]
    template: PathBuf,

    /// Source deck JSON.
    #[arg(long)]
    target: PathBuf,

    /// Output document JSON.
    #[arg(long, default_value = "output.json")]
    output: PathBuf,

    /// Worker threads (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Failed quality checks allowed per item.
    #[arg(long, default_value_t = deckform::MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Write baseline/candidate rasters (`orig_{i}.png`, `new_{i}.png`) into this directory.
    #[arg(long = "artifacts")]
    artifact_dir: Option<PathBuf>,

    /// Write per-item results as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,

    /// Log every workflow step.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = deckform::load_template(&cli.template)?;
    let deck = deckform::load_deck(&cli.target)?;

    let kind = match cli.backend {
        BackendChoice::Cpu => deckform::BackendKind::Cpu,
    };
    let backend = deckform::create_backend(kind, &deckform::RenderSettings::default())?;

    let opts = deckform::ConvertOpts {
        threads: cli.threads,
        max_attempts: cli.max_attempts,
        max_steps: None,
        artifact_dir: cli.artifact_dir.clone(),
    };
    let session = deckform::ConvertSession::new(catalog, backend, opts)?;
    let report = session.convert(&deck).context("convert deck")?;

    deckform::save_output(&report.document, &cli.output)?;
    if let Some(path) = &cli.report {
        deckform::write_json(&report.results, path)?;
    }

    for r in &report.results {
        match (&r.failure, r.success) {
            (_, true) => eprintln!("item {}: ok (layout {})", r.index, fmt_layout(r.layout)),
            (Some(deckform::FailureReason::QualityRejected), false) => eprintln!(
                "item {}: rejected after {} attempts ({})",
                r.index,
                r.attempts,
                r.feedback.as_deref().unwrap_or("no feedback")
            ),
            (Some(reason), false) => eprintln!("item {}: failed: {reason:?}", r.index),
            (None, false) => eprintln!("item {}: failed", r.index),
        }
    }
    eprintln!(
        "{} of {} items converted",
        report.succeeded(),
        report.results.len()
    );
    eprintln!("wrote {}", cli.output.display());

    report.check().context("conversion job aborted")?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fmt_layout(layout: Option<usize>) -> String {
    layout.map_or_else(|| "-".to_string(), |l| l.to_string())
}
