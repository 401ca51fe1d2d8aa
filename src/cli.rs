use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "rename-music", version)]
#[command(about = "Clean and rename music folders (audio, sidecars, PDFs, CUE/LOG)")]
pub struct Cli {
    /// Target directory (default: current folder)
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Apply changes (default: dry-run)
    #[arg(short, long)]
    pub force: bool,

    /// Increase verbosity: -v = actions & warnings, -vv = adds INFO details
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML config file (overrides defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
