use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use facesort_core::{
    scan, AutoAccept, EmbeddingClassifier, Gallery, MatchReview, ReviewAction, Router,
    RouterConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Known identity names, in the index order the gallery was built with.
const NAMES: [&str; 8] = [
    "Ashley", "Laura", "Liam", "Marisha", "Matthew", "Sam", "Talisien", "Travis",
];

const DEFAULT_MODEL_PATH: &str = "../trained_model/w600k_r50.onnx";
const DEFAULT_GALLERY_PATH: &str = "../trained_model/gallery.json";

#[derive(Parser)]
#[command(name = "facesort", about = "Sort face crops into per-identity folders")]
struct Cli {
    /// Interactive per-match review and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Recognition tolerance (reserved; the match policy uses its built-in threshold)
    #[arg(short, long, default_value_t = 0.6)]
    tolerance: f32,

    /// Substring filter on subdirectory names during the scan
    #[arg(short, long, default_value = "")]
    pattern: String,

    /// Output root directory for recognized images
    #[arg(short, long, default_value = "../ds_new")]
    out: PathBuf,

    /// Input root directory
    #[arg(short, long, default_value = "../faces/")]
    input: PathBuf,
}

/// Terminal review gate: shows the match and waits for a single key.
/// `s` skips the image, `q` stops the run, anything else keeps it.
struct TermReview {
    term: Term,
}

impl TermReview {
    fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl MatchReview for TermReview {
    fn review(&mut self, path: &Path, label: &str, confidence: i32) -> ReviewAction {
        let _ = self
            .term
            .write_line(&format!("{label}-{confidence}%  {}", path.display()));
        let _ = self
            .term
            .write_line("  [s] skip  [q] quit  [any other key] keep");
        match self.term.read_char() {
            Ok('s') => ReviewAction::Skip,
            Ok('q') => ReviewAction::Quit,
            Ok(_) => ReviewAction::Accept,
            Err(err) => {
                tracing::warn!(error = %err, "key read failed, keeping image");
                ReviewAction::Accept
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Per-image skip warnings are only surfaced in verbose runs.
    let default_filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if cli.verbose {
        println!("Verbose output.");
    }
    tracing::debug!(
        input = %cli.input.display(),
        out = %cli.out.display(),
        pattern = %cli.pattern,
        tolerance = cli.tolerance,
        "starting"
    );

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("failed to create output directory {}", cli.out.display()))?;

    let gallery = Gallery::load(DEFAULT_GALLERY_PATH).context("failed to load gallery")?;
    let classifier = EmbeddingClassifier::load(DEFAULT_MODEL_PATH, gallery)
        .context("failed to load recognition model")?;

    let candidates = scan(&cli.input, &cli.pattern)?;
    tracing::debug!(count = candidates.len(), "discovered candidates");

    let config = RouterConfig::new(
        NAMES.iter().map(|n| n.to_string()).collect(),
        cli.out.clone(),
    );
    let mut router = Router::new(classifier, config);

    let bar = ProgressBar::new(candidates.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} images ({eta})",
    )?);

    let report = if cli.verbose {
        let mut review = TermReview::new();
        router.run(&candidates, &mut review, |_| bar.inc(1))?
    } else {
        router.run(&candidates, &mut AutoAccept, |_| bar.inc(1))?
    };
    bar.finish_and_clear();

    tracing::debug!(
        processed = report.processed,
        written = report.written,
        skipped = report.skipped,
        unreadable = report.unreadable,
        quit = report.quit,
        "run finished"
    );

    Ok(())
}
