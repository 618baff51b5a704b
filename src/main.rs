use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use subgen::generator::EmitMode;
use subgen::{load_settings, Generator, RunReport};

/// Turn proxy subscriptions into per-country sing-box outbound files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file (TOML, or YAML by extension)
    #[arg(short, long, value_name = "FILE", default_value = "subgen.toml")]
    config: PathBuf,

    /// Directory the outbound files are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// How new outbounds are merged into existing files
    #[arg(long, value_enum)]
    mode: Option<EmitMode>,

    /// Only process the named subscription (repeatable)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config)
        .with_context(|| format!("cannot load settings from {}", args.config.display()))?;

    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or(settings.common.log_level.as_str()));

    if let Some(dir) = args.output_dir {
        settings.common.output_dir = dir;
    }
    if let Some(mode) = args.mode {
        settings.common.emit_mode = mode;
    }

    let mut sources = settings.subscriptions.clone();
    if !args.only.is_empty() {
        for name in &args.only {
            if !sources.iter().any(|s| &s.name == name) {
                bail!("no subscription named {}", name);
            }
        }
        sources.retain(|s| args.only.contains(&s.name));
    }

    let generator =
        Generator::from_settings(settings).context("cannot set up network clients")?;
    let report = generator.run(&sources);
    print_summary(&report);

    if !report.is_success() {
        bail!(
            "{} subscription(s) and {} write(s) failed",
            report.failures.len(),
            report.emit_errors.len()
        );
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    for sub in &report.subscriptions {
        info!(
            "{}: {} nodes ({} info entries, {} rejected)",
            sub.name, sub.nodes, sub.placeholders, sub.rejected
        );
    }
    for failure in &report.failures {
        error!("{}", failure);
    }
    for e in &report.emit_errors {
        error!("{}", e);
    }
    println!(
        "{} nodes from {} subscription(s), {} file(s) written, {} selector(s) updated",
        report.total_nodes(),
        report.subscriptions.len(),
        report.files_written.len(),
        report.selectors.len()
    );
}
