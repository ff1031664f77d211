use clap::Parser;
use dupagent::cli::{Cli, Commands, TrashCommand};
use dupagent::error::ExitCode;
use dupagent::run_app;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("dupagent").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_scan_with_duplicates_exits_success() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same pixels").unwrap();
    fs::write(dir.path().join("b.jpg"), b"same pixels").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", "scan", root, "--all-files", "-o", "json"])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_without_duplicates_exits_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"one").unwrap();
    fs::write(dir.path().join("b.jpg"), b"three").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", "scan", root, "--all-files", "-o", "csv"])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_extension_flag_narrows_candidates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", "scan", root, "--ext", "jpg"])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run_app(cli(&["-q", "scan", missing.to_str().unwrap()])).unwrap_err();
    assert!(format!("{err:#}").contains("missing"));
}

#[test]
fn test_trash_restore_requires_selection() {
    assert!(Cli::try_parse_from(["dupagent", "trash", "restore"]).is_err());

    let parsed = cli(&["trash", "purge", "--all", "--dir", "/mnt/usb", "-y"]);
    let Commands::Trash(TrashCommand::Purge(select)) = parsed.command else {
        panic!("expected trash purge");
    };
    assert!(select.all);
    assert!(select.yes);
    assert_eq!(select.dirs.len(), 1);
}
