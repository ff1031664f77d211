use dupagent::duplicates::{
    start_scan, DuplicateFinder, NullSink, ScanEvent, ScanOutcome, ScanStatus,
};
use dupagent::scanner::ScanOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, Builder};

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn scan(root: &Path, options: ScanOptions) -> ScanOutcome {
    DuplicateFinder::new(options).scan(&[root.to_path_buf()], &NullSink)
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let ScanOutcome::Completed { groups, summary } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_image_scenario_one_group_of_two() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.jpg", &[b'X'; 1024]);
    let b = write(dir.path(), "b.jpg", &[b'X'; 1024]);
    write(dir.path(), "c.jpg", &[b'Y'; 1024]);

    let options = ScanOptions::default().with_extensions(["jpg"]);
    let ScanOutcome::Completed { groups, .. } = scan(dir.path(), options) else {
        panic!("scan should complete");
    };

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(groups[0].size_display(), "1.0 KB");
}

#[test]
fn test_unique_size_is_never_hashed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", &[b'X'; 1024]);
    write(dir.path(), "b.jpg", &[b'X'; 1024]);
    write(dir.path(), "lonely.jpg", &[b'X'; 999]);

    let ScanOutcome::Completed { summary, .. } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.hashed, 2);
}

#[test]
fn test_groups_are_homogeneous() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(dir.path(), &format!("x{i}.bin"), b"xxxxxxxx");
        write(dir.path(), &format!("y{i}.bin"), b"yyyyyyyy");
        write(dir.path(), &format!("nested/z{i}.bin"), b"zzzz");
    }

    let ScanOutcome::Completed { groups, .. } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };

    assert_eq!(groups.len(), 3);
    for group in &groups {
        assert!(group.files.len() >= 2);
        let first = fs::read(&group.files[0]).unwrap();
        for file in &group.files {
            assert_eq!(fs::metadata(file).unwrap().len(), group.size);
            assert_eq!(fs::read(file).unwrap(), first);
        }
    }
}

#[test]
fn test_zero_byte_files_never_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1.txt", b"");
    write(dir.path(), "empty2.txt", b"");

    let ScanOutcome::Completed { groups, summary } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);

    let keep_empty = ScanOptions::default().with_ignore_zero_byte(false);
    let ScanOutcome::Completed { groups, .. } = scan(dir.path(), keep_empty) else {
        panic!("scan should complete");
    };
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_hidden_directory_is_not_descended() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"same bytes");
    write(dir.path(), ".cache/hidden.txt", b"same bytes");

    let ScanOutcome::Completed { groups, summary } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);

    let with_hidden = ScanOptions::default().with_ignore_hidden(false);
    let ScanOutcome::Completed { groups, .. } = scan(dir.path(), with_hidden) else {
        panic!("scan should complete");
    };
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let upper = write(dir.path(), "A.JPG", b"pixels");
    let lower = write(dir.path(), "b.jpg", b"pixels");
    write(dir.path(), "c.txt", b"pixels");

    let options = ScanOptions::default().with_extensions([".Jpg"]);
    let ScanOutcome::Completed { groups, .. } = scan(dir.path(), options) else {
        panic!("scan should complete");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![upper, lower]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    let locked = write(dir.path(), "c.txt", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; the check only means something for normal users.
    if fs::read(&locked).is_ok() {
        return;
    }

    let ScanOutcome::Completed { groups, summary } = scan(dir.path(), ScanOptions::default()) else {
        panic!("scan should complete");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.had_errors());
}

#[test]
fn test_background_scan_event_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"one");
    write(dir.path(), "b.txt", b"one");
    write(dir.path(), "c.txt", b"two");

    let mut handle = start_scan(vec![dir.path().to_path_buf()], ScanOptions::default()).unwrap();
    handle.join().unwrap();
    let events: Vec<ScanEvent> = handle.events().try_iter().collect();

    assert_eq!(events.first(), Some(&ScanEvent::Status(ScanStatus::Walking)));
    assert!(matches!(events.last(), Some(ScanEvent::Finished(ScanOutcome::Completed { .. }))));

    let hashing_files: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Status(ScanStatus::HashingFile { name }) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(hashing_files, vec!["a.txt", "b.txt", "c.txt"]);

    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));
}

#[test]
fn test_no_candidates_reports_total_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"1");
    write(dir.path(), "b.txt", b"22");

    let handle = start_scan(vec![dir.path().to_path_buf()], ScanOptions::default()).unwrap();
    let mut statuses = Vec::new();
    let outcome = handle
        .wait_with(|event| {
            if let ScanEvent::Status(status) = event {
                statuses.push(status.clone());
            }
        })
        .unwrap();

    assert!(!outcome.is_cancelled());
    assert_eq!(
        statuses.last(),
        Some(&ScanStatus::NoDuplicates { total_files: 2 })
    );
}

#[test]
fn test_relative_root_yields_absolute_paths() {
    // Created under the working directory so it can be named relatively
    let dir = Builder::new().prefix("relative-root").tempdir_in(".").unwrap();
    write(dir.path(), "a.jpg", &[b'X'; 1024]);
    write(dir.path(), "b.jpg", &[b'X'; 1024]);
    let relative = PathBuf::from(dir.path().file_name().unwrap());
    assert!(relative.is_relative());

    let handle = start_scan(vec![relative.clone()], ScanOptions::default()).unwrap();
    let ScanOutcome::Completed { groups, .. } = handle.wait().unwrap() else {
        panic!("scan should complete");
    };

    let cwd = std::env::current_dir().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].files,
        vec![cwd.join(&relative).join("a.jpg"), cwd.join(&relative).join("b.jpg")]
    );
    assert!(groups[0].files.iter().all(|p| p.is_absolute()));
}
