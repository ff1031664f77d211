//! Command-line interface definitions.
//!
//! ```bash
//! # Scan a photo folder (image extensions by default)
//! dupagent scan ~/Pictures
//!
//! # Every file type, hidden entries too, JSON output
//! dupagent scan ~/Downloads --all-files --include-hidden --output json
//!
//! # Move every copy to the fake trash without asking
//! dupagent scan ~/Pictures --trash-copies -y
//!
//! # Inspect and undo
//! dupagent trash list
//! dupagent trash restore photo_1714556400000.jpg
//! dupagent trash purge --all --dir /mnt/usb
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Duplicate file finder with a reversible, per-disk trash.
///
/// Files are grouped by size, confirmed by BLAKE3 content hash, and copies can
/// be moved to a `.Trash-DuplicateAgent` directory on their own disk, from
/// which they can be restored or purged later.
#[derive(Debug, Parser)]
#[command(name = "dupagent")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// Inspect and manage the fake trash
    #[command(subcommand)]
    Trash(TrashCommand),
    /// Show or persist preferences
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Include hidden files and descend into hidden directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Treat empty files as candidates
    #[arg(long)]
    pub include_empty: bool,

    /// Only consider files with this extension (repeatable, e.g. --ext jpg --ext .png)
    #[arg(long = "ext", value_name = "EXT", conflicts_with = "all_files")]
    pub extensions: Vec<String>,

    /// Consider every file regardless of extension
    #[arg(long)]
    pub all_files: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Move every copy (all files but the first of each group) to the fake trash
    #[arg(long)]
    pub trash_copies: bool,

    /// Do not ask for confirmation before trashing
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Trash subcommands.
#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// List trashed files on the disks owning DIRs (default: current and home directory)
    List {
        /// Directories whose disks are inspected
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Move files to the fake trash on their own disk
    Move {
        /// Files to trash
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Move trashed files back to their original location
    Restore(SelectArgs),
    /// Permanently delete trashed files
    Purge(SelectArgs),
}

/// Selection of trash entries for restore or purge.
#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Trash file names as shown by `trash list`
    #[arg(value_name = "TRASH_FILENAME", required_unless_present = "all")]
    pub names: Vec<String>,

    /// Select every entry
    #[arg(long, conflicts_with = "names")]
    pub all: bool,

    /// Directories whose disks are searched (repeatable)
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Config subcommands.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective preferences as TOML
    Show,
    /// Write the effective preferences to the config file
    Save,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
