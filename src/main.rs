use std::process;

use anyhow::{ensure, Context as _};
use clap::Parser;
use colored::*;
use tracing::debug;

use rename_music::app_config;
use rename_music::cli::Cli;
use rename_music::file_proc::{self, Context};
use rename_music::logging;
use rename_music::mime::ContentProbe;
use rename_music::report::{Output, RunReport};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Cli::parse();

    logging::init(args.verbose);

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", args.path.display()))?;
    ensure!(root.is_dir(), "{} is not a directory", root.display());

    let (cfg, config_path) = app_config::load(args.config.as_deref());
    if let Some(path) = &config_path {
        if args.verbose >= 1 {
            println!("[CONFIG] Loaded configuration from: {}", path.display());
        }
    }
    debug!("configuration: {cfg:?}");

    // --force always wins; otherwise the config decides whether preview
    // mode is the default
    let dry_run = if args.force { false } else { cfg.dry_run_default };
    let recursive = args.recursive || cfg.recursive_default;

    let out = Output::new(args.verbose);
    out.info(
        0,
        &format!(
            "Starting processing: {} (recursive={recursive}) (dry-run={dry_run})",
            root.display()
        ),
    );

    let probe = ContentProbe;
    let ctx = Context {
        cfg: &cfg,
        dry_run,
        probe: &probe,
        out,
    };

    let report = file_proc::process_root(&ctx, &root, recursive);

    print_summary(&report, dry_run, args.verbose);
    Ok(())
}

fn print_summary(report: &RunReport, dry_run: bool, verbose: u8) {
    if report.total_actions() == 0 {
        println!("\nNo changes necessary.");
        return;
    }

    if dry_run {
        if verbose >= 1 {
            println!("\n--- Dry-run summary ---");
            print_counters(report);
            println!("\nConcrete actions (preview):");
            print_actions(report);
        }
        println!("\nRun with --force (or -f) to perform the above actions.");
    } else {
        println!("\n--- Execution summary ---");
        print_counters(report);
        println!("\nConcrete actions (performed):");
        print_actions(report);
        println!("\nChanges have been applied.");
    }
}

fn print_counters(report: &RunReport) {
    println!(
        "{} duplicates removed, {} album files renamed, {} sidecars renamed, {} sidecars replaced, {} sidecars deleted",
        report.removed_duplicates.to_string().red(),
        report.renames.to_string().green(),
        report.renamed_sidecars.to_string().green(),
        report.replacements.to_string().yellow(),
        report.removed_sidecars.to_string().red(),
    );
}

fn print_actions(report: &RunReport) {
    for (idx, action) in report.actions.iter().enumerate() {
        println!(" {:03}. {}", idx + 1, action.entry);
    }
}
