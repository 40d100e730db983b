use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::Variant;

/// Colorful, file-backed task manager.
/// Data defaults to ~/.colortask or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "ct", version, about = "Organize your day colorfully")]
pub struct Cli {
    /// Directory holding tasks, preferences and config.json.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the configured variant: list | calendar.
    #[arg(long, global = true, value_enum)]
    pub variant: Option<Variant>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
