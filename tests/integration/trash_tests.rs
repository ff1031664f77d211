use dupagent::trash::{
    FixedMountResolver, Journal, TrashError, TrashStore, APP_NAME, JOURNAL_FILE_NAME,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// A tempdir treated as its own mount, with a canonical root so that
/// recorded original paths compare equal on every platform.
fn mount() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

fn store_for(roots: &[&PathBuf]) -> TrashStore {
    let resolver = roots
        .iter()
        .fold(FixedMountResolver::new(), |r, root| r.with_root(root));
    TrashStore::with_resolver(APP_NAME, resolver)
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_move_then_restore_round_trip() {
    let (_dir, root) = mount();
    let original = root.join("photos/x.jpg");
    write(&original, b"holiday");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 7).unwrap();
    assert!(!original.exists());
    assert!(entry.trash_path().exists());
    assert_eq!(entry.trash_dir, root.join(".Trash-DuplicateAgent"));
    assert_eq!(entry.original_path, original);
    assert_eq!(store.list_entries(&root), vec![entry.clone()]);

    let restored = store.restore_entry(&entry).unwrap();
    assert_eq!(restored, original);
    assert_eq!(fs::read(&original).unwrap(), b"holiday");
    assert!(!entry.trash_path().exists());
    assert!(store.list_entries(&root).is_empty());
}

#[test]
fn test_restore_recreates_missing_parent() {
    let (_dir, root) = mount();
    let original = root.join("a/b/c/deep.txt");
    write(&original, b"deep");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 4).unwrap();
    fs::remove_dir_all(root.join("a")).unwrap();

    store.restore_entry(&entry).unwrap();
    assert_eq!(fs::read(&original).unwrap(), b"deep");
}

#[test]
fn test_restore_refuses_to_overwrite() {
    let (_dir, root) = mount();
    let original = root.join("x.txt");
    write(&original, b"old");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 3).unwrap();
    write(&original, b"new");

    let err = store.restore_entry(&entry).unwrap_err();
    assert!(matches!(err, TrashError::DestinationExists(_)));
    assert_eq!(fs::read(&original).unwrap(), b"new");
    assert!(entry.trash_path().exists());
    assert_eq!(store.list_entries(&root).len(), 1);
}

#[test]
fn test_restore_of_vanished_trash_file_keeps_journal() {
    let (_dir, root) = mount();
    let original = root.join("x.txt");
    write(&original, b"data");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 4).unwrap();
    fs::remove_file(entry.trash_path()).unwrap();

    let err = store.restore_entry(&entry).unwrap_err();
    assert!(matches!(err, TrashError::NotInTrash(_)));
    assert_eq!(store.list_entries(&root), vec![entry]);
}

#[test]
fn test_purge_is_idempotent() {
    let (_dir, root) = mount();
    let original = root.join("gone.bin");
    write(&original, b"bytes");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 5).unwrap();
    store.purge_entry(&entry).unwrap();
    assert!(!entry.trash_path().exists());
    assert!(store.list_entries(&root).is_empty());

    store.purge_entry(&entry).unwrap();
    assert!(store.list_entries(&root).is_empty());
}

#[test]
fn test_same_name_from_two_dirs_gets_distinct_trash_names() {
    let (_dir, root) = mount();
    let first = root.join("one/report.pdf");
    let second = root.join("two/report.pdf");
    write(&first, b"first");
    write(&second, b"second");
    let store = store_for(&[&root]);

    let a = store.move_to_trash(&first, 5).unwrap();
    let b = store.move_to_trash(&second, 6).unwrap();

    assert_ne!(a.trash_filename, b.trash_filename);
    assert!(a.trash_filename.starts_with("report_"));
    assert!(a.trash_filename.ends_with(".pdf"));
    assert_eq!(fs::read(a.trash_path()).unwrap(), b"first");
    assert_eq!(fs::read(b.trash_path()).unwrap(), b"second");
    assert_eq!(store.list_entries(&root).len(), 2);
}

#[test]
fn test_many_moves_never_collide() {
    let (_dir, root) = mount();
    let store = store_for(&[&root]);

    let mut names = HashSet::new();
    for i in 0..25 {
        let path = root.join(format!("d{i}/same.txt"));
        write(&path, b"x");
        let entry = store.move_to_trash(&path, 1).unwrap();
        assert!(names.insert(entry.trash_filename));
    }
    assert_eq!(store.list_entries(&root).len(), 25);
}

#[test]
fn test_each_mount_gets_its_own_trash() {
    let (_a, mount_a) = mount();
    let (_b, mount_b) = mount();
    let file_a = mount_a.join("a.txt");
    let file_b = mount_b.join("b.txt");
    write(&file_a, b"a");
    write(&file_b, b"b");
    let store = store_for(&[&mount_a, &mount_b]);

    let entry_a = store.move_to_trash(&file_a, 1).unwrap();
    let entry_b = store.move_to_trash(&file_b, 1).unwrap();

    assert_eq!(entry_a.trash_dir, store.trash_dir_for(&mount_a));
    assert_eq!(entry_b.trash_dir, store.trash_dir_for(&mount_b));
    assert!(store.journal_path_for(&mount_a).exists());
    assert!(store.journal_path_for(&mount_b).exists());
    assert_eq!(store.list_entries(&mount_a), vec![entry_a.clone()]);
    assert_eq!(store.list_entries(&mount_b), vec![entry_b.clone()]);

    let all = store.collect_entries(&[mount_a.clone(), mount_b.clone(), mount_a.clone()]);
    assert_eq!(all, vec![entry_a, entry_b]);
}

#[test]
fn test_journal_on_disk_shape() {
    let (_dir, root) = mount();
    let original = root.join("kb.dat");
    write(&original, &[0u8; 1024]);
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 1024).unwrap();

    let raw = fs::read_to_string(store.journal_path_for(&root)).unwrap();
    assert!(raw.contains("\n    {"), "journal should use a 4-space indent");

    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["trash_filename"], entry.trash_filename.as_str());
    assert_eq!(record["original_path"], original.to_str().unwrap());
    assert_eq!(record["size"], "1.0 KB");
    assert_eq!(record["size_bytes"], 1024);
    assert!(record["trash_dir"].is_string());
    assert!(entry.deleted_at().is_some());
}

#[test]
fn test_fresh_trash_has_empty_journal() {
    let (_dir, root) = mount();
    let original = root.join("only.txt");
    write(&original, b"1");
    let store = store_for(&[&root]);

    let entry = store.move_to_trash(&original, 1).unwrap();
    store.purge_entry(&entry).unwrap();

    let raw = fs::read_to_string(store.journal_path_for(&root)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[test]
fn test_corrupt_journal_lists_empty_and_recovers() {
    let (_dir, root) = mount();
    let store = store_for(&[&root]);
    let journal_path = store.journal_path_for(&root);
    write(&journal_path, b"{ not json");

    assert!(store.list_entries(&root).is_empty());
    assert!(Journal::read(&journal_path).is_err());

    let original = root.join("after.txt");
    write(&original, b"z");
    store.move_to_trash(&original, 1).unwrap();
    assert_eq!(store.list_entries(&root).len(), 1);
}

#[test]
fn test_missing_trash_dir_field_is_filled_on_load() {
    let (_dir, root) = mount();
    let store = store_for(&[&root]);
    let journal_path = store.journal_path_for(&root);
    let record = serde_json::json!([{
        "trash_filename": "old_1.txt",
        "original_path": root.join("old.txt"),
        "deletion_date": "2024-01-02 03:04:05",
        "size": "3.0 B",
        "size_bytes": 3
    }]);
    write(&journal_path, record.to_string().as_bytes());

    let entries = store.list_entries(&root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].trash_dir, store.trash_dir_for(&root));
    assert_eq!(journal_path.file_name().unwrap(), JOURNAL_FILE_NAME);
}

#[test]
fn test_move_missing_file_fails_without_side_effects() {
    let (_dir, root) = mount();
    let store = store_for(&[&root]);

    let err = store.move_to_trash(&root.join("nope.txt"), 0).unwrap_err();
    assert!(matches!(err, TrashError::NotFound(_)));
    assert!(!store.trash_dir_for(&root).exists());
}

#[test]
fn test_batches_report_partial_failure() {
    let (_dir, root) = mount();
    let present = root.join("here.txt");
    write(&present, b"ok");
    let store = store_for(&[&root]);

    let moved = store
        .move_batch(&[(present.clone(), 2), (root.join("missing.txt"), 0)])
        .unwrap();
    assert_eq!(moved.success_count(), 1);
    assert_eq!(moved.failure_count(), 1);
    assert!(moved.is_partial());
    assert_eq!(moved.summary(), "Moved 1 file(s), 1 failed");

    let restored = store.restore_batch(&moved.successes).unwrap();
    assert!(restored.all_succeeded());
    assert!(present.exists());

    assert!(matches!(
        store.purge_batch(&[]),
        Err(TrashError::EmptySelection)
    ));
}
