//! Command dispatch for the `dupagent` binary.
//!
//! This is the presenter: it turns CLI arguments into engine and trash calls,
//! renders events and results, and maps outcomes to exit codes.

use std::collections::BTreeSet;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;

use crate::cli::{Cli, Commands, ConfigCommand, OutputFormat, ScanArgs, SelectArgs, TrashCommand};
use crate::config::Config;
use crate::duplicates::{start_scan_with_token, DuplicateGroup, ScanOutcome, ScanSummary};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::{self, CsvOutput, JsonOutput};
use crate::progress::ScanProgress;
use crate::signal::install_handler;
use crate::trash::{BatchResult, TrashEntry, TrashStore};

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error for whole-operation failures: invalid scan roots, an
/// unusable trash directory, unwritable output. Per-file failures are
/// reported through the exit code instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => run_scan(args, cli.quiet),
        Commands::Trash(command) => run_trash(command, cli.quiet),
        Commands::Config(command) => run_config(command),
    }
}

fn run_scan(args: ScanArgs, quiet: bool) -> Result<ExitCode> {
    let config = scan_config(Config::load(), &args);
    let options = config.scan_options();
    log::debug!("Scan options: {:?}", options);

    let token = install_handler().context("Failed to install Ctrl+C handler")?;
    let handle = start_scan_with_token(args.paths.clone(), options, token)?;

    let mut progress = ScanProgress::new(quiet).with_accessible(!io::stderr().is_terminal());
    let outcome = handle.wait_with(|event| progress.handle(event))?;
    progress.clear();

    let (groups, summary) = match outcome {
        ScanOutcome::Completed { groups, summary } => (groups, summary),
        ScanOutcome::Cancelled => {
            if !quiet {
                eprintln!("Scan cancelled");
            }
            return Ok(ExitCode::Interrupted);
        }
    };

    let mut exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else if summary.had_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    render_groups(&groups, &summary, args.output, exit_code)?;

    if args.trash_copies && !groups.is_empty() {
        let copies = copies_of(&groups);
        let prompt = format!("Move {} copies to the fake trash?", copies.len());
        if !args.yes && !confirm(&prompt)? {
            eprintln!("Nothing moved");
            return Ok(exit_code);
        }

        let result = TrashStore::default().move_batch(&copies)?;
        if !quiet {
            eprintln!("{}", result.summary());
        }
        exit_code = exit_code.max_severity(batch_exit_code(&result, 0));
    }

    Ok(exit_code)
}

/// Preferences with this invocation's flags applied on top.
fn scan_config(mut config: Config, args: &ScanArgs) -> Config {
    config.include_hidden |= args.include_hidden;
    config.include_empty |= args.include_empty;
    if args.all_files {
        config.extensions.clear();
    } else if !args.extensions.is_empty() {
        config.extensions.clone_from(&args.extensions);
    }
    config
}

fn copies_of(groups: &[DuplicateGroup]) -> Vec<(PathBuf, u64)> {
    groups
        .iter()
        .flat_map(|g| g.copies().iter().map(move |p| (p.clone(), g.size)))
        .collect()
}

fn render_groups(
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
    format: OutputFormat,
    exit_code: ExitCode,
) -> Result<()> {
    let stdout = io::stdout();
    let out = stdout.lock();
    match format {
        OutputFormat::Text => output::text::write_groups(groups, summary, out)?,
        OutputFormat::Json => JsonOutput::new(groups, summary, exit_code).write_to(out)?,
        OutputFormat::Csv => CsvOutput::new(groups).write_to(out)?,
    }
    Ok(())
}

fn run_trash(command: TrashCommand, quiet: bool) -> Result<ExitCode> {
    let store = TrashStore::default();

    match command {
        TrashCommand::List { dirs, output: format } => {
            let entries = store.collect_entries(&search_dirs(dirs)?);
            let stdout = io::stdout();
            let out = stdout.lock();
            match format {
                OutputFormat::Text => output::text::write_entries(&entries, out)?,
                OutputFormat::Json => output::json::write_entries(&entries, out)?,
                OutputFormat::Csv => output::csv::write_entries(&entries, out)?,
            }
            Ok(ExitCode::Success)
        }
        TrashCommand::Move { files } => {
            let sized: Vec<(PathBuf, u64)> = files
                .into_iter()
                .map(|path| {
                    let size = path.symlink_metadata().map(|m| m.len()).unwrap_or(0);
                    (path, size)
                })
                .collect();
            let result = store.move_batch(&sized)?;
            report(&result, quiet);
            Ok(batch_exit_code(&result, 0))
        }
        TrashCommand::Restore(select) => {
            let (entries, missing) = select_entries(&store, &select)?;
            let result = store.restore_batch(&entries)?;
            report(&result, quiet);
            Ok(batch_exit_code(&result, missing))
        }
        TrashCommand::Purge(select) => {
            let (entries, missing) = select_entries(&store, &select)?;
            let prompt = format!("Permanently delete {} file(s)?", entries.len());
            if !entries.is_empty() && !select.yes && !confirm(&prompt)? {
                eprintln!("Nothing purged");
                return Ok(ExitCode::Success);
            }
            let result = store.purge_batch(&entries)?;
            report(&result, quiet);
            Ok(batch_exit_code(&result, missing))
        }
    }
}

/// Directories whose mounts are inspected: the given ones, or the current
/// and home directories.
fn search_dirs(dirs: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if !dirs.is_empty() {
        return Ok(dirs);
    }
    let mut defaults = vec![std::env::current_dir().context("Cannot read current directory")?];
    if let Some(base) = BaseDirs::new() {
        defaults.push(base.home_dir().to_path_buf());
    }
    Ok(defaults)
}

/// Entries picked by name (or all), plus the number of names not found.
fn select_entries(store: &TrashStore, select: &SelectArgs) -> Result<(Vec<TrashEntry>, usize)> {
    let entries = store.collect_entries(&search_dirs(select.dirs.clone())?);
    if select.all {
        return Ok((entries, 0));
    }

    let wanted: BTreeSet<&str> = select.names.iter().map(String::as_str).collect();
    let found: BTreeSet<&str> = entries
        .iter()
        .map(|e| e.trash_filename.as_str())
        .filter(|n| wanted.contains(n))
        .collect();
    let mut missing = 0;
    for name in wanted.difference(&found) {
        eprintln!("No trash entry named {name}");
        missing += 1;
    }
    if found.is_empty() {
        bail!("None of the requested files are in the trash");
    }

    let selected = entries
        .into_iter()
        .filter(|e| wanted.contains(e.trash_filename.as_str()))
        .collect();
    Ok((selected, missing))
}

fn report<T>(result: &BatchResult<T>, quiet: bool) {
    for (path, error) in &result.failures {
        eprintln!("  {}: {}", path.display(), error);
    }
    if !quiet {
        eprintln!("{}", result.summary());
    }
}

fn batch_exit_code<T>(result: &BatchResult<T>, missing: usize) -> ExitCode {
    if result.all_succeeded() && missing == 0 {
        ExitCode::Success
    } else if result.success_count() > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::GeneralError
    }
}

fn run_config(command: ConfigCommand) -> Result<ExitCode> {
    let config = Config::load();
    match command {
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{text}");
        }
        ConfigCommand::Save => {
            let path = config.save()?;
            println!("{}", path.display());
        }
    }
    Ok(ExitCode::Success)
}

/// Ask a yes/no question on stderr. Non-interactive input is refused.
fn confirm(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!("Refusing to continue without confirmation; pass --yes");
    }
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
