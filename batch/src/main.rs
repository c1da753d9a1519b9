use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use mmecore::BatchPolicy;
use std::path::PathBuf;
use workflow::manifest::BatchManifest;
use workflow::runner::Runner;

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Creates crash-test folders and MME files from a batch manifest")]
struct Args {
    /// Batch manifest (YAML, or JSON with a .json extension)
    #[arg(long)]
    manifest: PathBuf,
    /// Output root; overrides the manifest `root`
    #[arg(long)]
    root: Option<PathBuf>,
    /// Replacement for characters not allowed in folder names
    #[arg(long)]
    replacement: Option<String>,
    /// Stop at the first test that fails instead of continuing
    #[arg(long, default_value_t = false)]
    abort_on_error: bool,
    /// Print the folders that would be created and exit
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manifest = BatchManifest::load(&args.manifest)?;
    let root = args
        .root
        .clone()
        .or_else(|| manifest.root.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = manifest.emitter.clone();
    if let Some(replacement) = args.replacement {
        config.replacement = replacement;
    }
    if args.abort_on_error {
        config.policy = BatchPolicy::AbortOnFirstError;
    }
    config.validate().context("validating emitter settings")?;

    let batch = manifest.prepare()?;
    info!(
        "{} tests for {} under {}",
        batch.tests.len(),
        batch.info.display_name(),
        root.display()
    );
    let runner = Runner::new(config);

    if args.dry_run {
        for folder in runner.plan(&root, &batch)? {
            println!("{}", folder.path.display());
        }
        return Ok(());
    }

    let report = runner.execute(&root, &batch)?;
    for emitted in &report.emitted {
        println!("[{}] {} -> {}", emitted.index, emitted.name, emitted.mme_path.display());
    }
    for failure in &report.failures {
        eprintln!("[{}] {} failed: {}", failure.index, failure.name, failure.error);
    }
    info!("batch finished: {}", report.summary());
    if report.aborted {
        bail!(
            "batch aborted after {} of {} tests",
            report.emitted.len() + report.failures.len(),
            batch.tests.len()
        );
    }
    if !report.is_complete() {
        bail!(
            "{} of {} tests failed",
            report.failures.len(),
            batch.tests.len()
        );
    }

    Ok(())
}
