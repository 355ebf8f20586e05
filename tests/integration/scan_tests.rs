use dupescan::duplicates::{
    DuplicateFinder, FinderConfig, FinderError, GroupKind, KeyScope, ScanOptions, ScanStatus,
};
use dupescan::scanner::{EntryKind, Fingerprinter};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn scan(root: &Path, options: &ScanOptions) -> dupescan::duplicates::ScanResult {
    DuplicateFinder::with_defaults().scan(root, options).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let result = scan(dir.path(), &ScanOptions::default());

    assert!(result.groups.is_empty());
    assert!(result.scanned_items.is_empty());
    assert!(result.failed_items.is_empty());
    assert_eq!(result.summary.status, ScanStatus::Complete);
}

#[test]
fn test_identical_bytes_grouped_by_fingerprint() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"identical bytes");
    write(&dir.path().join("b.txt"), b"identical bytes");

    let options = ScanOptions::files_only().with_content(true);
    let result = scan(dir.path(), &options);

    let expected = Fingerprinter::default()
        .fingerprint(&dir.path().join("a.txt"))
        .unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].key.to_string_lossy(), expected.as_str());
    assert_eq!(
        result.groups[0].paths(),
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );
}

#[test]
fn test_excluded_extension_never_scanned() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("report.txt"), b"text");
    write(&dir.path().join("report.png"), b"png");

    let options = ScanOptions::default().with_exclude_extensions([".png"]);
    let result = scan(dir.path(), &options);

    assert_eq!(
        result.scanned_items,
        vec![format!("File: {}", dir.path().join("report.txt").display())]
    );
    assert!(result.groups.is_empty());
}

#[test]
fn test_exclusion_is_case_insensitive_and_absolute() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/photo.JPG"), b"same");
    write(&dir.path().join("b/photo.JPG"), b"same");
    write(&dir.path().join("c/photo.jpg"), b"same");

    let options = ScanOptions::files_only()
        .with_content(true)
        .with_exclude_extensions(["jpg"]);
    let result = scan(dir.path(), &options);

    assert!(result.scanned_items.is_empty());
    assert!(result.groups.is_empty());
    assert_eq!(result.summary.fingerprinted, 0);
}

#[test]
fn test_depth_pruning_is_strict() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a/b/c/d")).unwrap();
    write(&root.join("a/b/deep.txt"), b"x");

    let options = ScanOptions::default().with_max_depth(Some(1));
    let result = scan(root, &options);

    assert_eq!(
        result.scanned_items,
        vec![
            format!("Directory: {}", root.join("a").display()),
            format!("Directory: {}", root.join("a/b").display()),
        ]
    );
    assert!(!result.scanned_items.iter().any(|i| i.contains("deep.txt")));
}

#[test]
fn test_depth_zero_lists_only_root() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top.txt"), b"x");
    write(&dir.path().join("sub/inner.txt"), b"x");

    let result = scan(dir.path(), &ScanOptions::default().with_max_depth(Some(0)));

    assert_eq!(result.scanned_items.len(), 2);
    assert!(!result.scanned_items.iter().any(|i| i.contains("inner.txt")));
}

#[test]
fn test_directories_grouped_by_name_regardless_of_contents() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x/temp/one.txt"), b"1");
    write(&dir.path().join("y/z/temp/two.txt"), b"2");

    let result = scan(dir.path(), &ScanOptions::dirs_only());

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.key.to_string_lossy(), "temp");
    assert_eq!(group.kind(), GroupKind::Directory);
    assert_eq!(
        group.paths(),
        vec![dir.path().join("x/temp"), dir.path().join("y/z/temp")]
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_failed_item_not_grouped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.bin"), b"dup");
    write(&dir.path().join("b.bin"), b"dup");
    // Listed by the walk but cannot be opened
    let locked = dir.path().join("locked.bin");
    std::os::unix::fs::symlink(dir.path().join("missing-target"), &locked).unwrap();

    let options = ScanOptions::files_only().with_content(true);
    let result = scan(dir.path(), &options);

    let locked_lines: Vec<_> = result
        .failed_items
        .iter()
        .filter(|item| item.ends_with(&locked.display().to_string()))
        .collect();
    assert_eq!(locked_lines.len(), 1);
    assert!(result
        .groups
        .iter()
        .all(|g| g.entries.iter().all(|e| e.path != locked)));

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert_eq!(result.summary.fingerprinted, 2);
}

#[cfg(unix)]
#[test]
fn test_permission_denied_file_is_failed_item() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked.bin");
    write(&locked, b"secret");
    write(&dir.path().join("other.bin"), b"secret");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still read the file
    if File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let options = ScanOptions::files_only().with_content(true);
    let result = scan(dir.path(), &options);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(
        result.failed_items,
        vec![format!("File permission denied: {}", locked.display())]
    );
    assert!(result.groups.is_empty());
    assert_eq!(result.summary.status, ScanStatus::Complete);
}

#[test]
fn test_name_mode_ignores_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("one/notes.md"), b"first draft");
    write(&dir.path().join("two/notes.md"), b"something else entirely");

    let result = scan(dir.path(), &ScanOptions::files_only());

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].key.to_string_lossy(), "notes.md");
    assert_eq!(result.groups[0].len(), 2);
}

#[test]
fn test_content_mode_ignores_names() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("one/notes.md"), b"first draft");
    write(&dir.path().join("two/notes.md"), b"second draft");
    write(&dir.path().join("three/copy.bak"), b"first draft");

    let options = ScanOptions::files_only().with_content(true);
    let result = scan(dir.path(), &options);

    assert_eq!(result.groups.len(), 1);
    let names: Vec<_> = result.groups[0]
        .entries
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(names, vec!["notes.md", "copy.bak"]);
}

#[test]
fn test_content_mode_still_groups_directories_by_name() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/cache/x"), b"1");
    write(&dir.path().join("b/cache/y"), b"2");

    let options = ScanOptions::default().with_content(true);
    let result = scan(dir.path(), &options);

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].key.to_string_lossy(), "cache");
    assert_eq!(result.groups[0].kind(), GroupKind::Directory);
}

#[test]
fn test_per_kind_scope_keeps_file_and_directory_apart() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/temp"), b"file");
    fs::create_dir_all(dir.path().join("b/temp")).unwrap();

    let result = scan(dir.path(), &ScanOptions::default());
    assert!(result.groups.iter().all(|g| g.key.to_string_lossy() != "temp"));
}

#[test]
fn test_shared_scope_reports_mixed_group() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/temp"), b"file");
    fs::create_dir_all(dir.path().join("b/temp")).unwrap();

    let options = ScanOptions::default().with_key_scope(KeyScope::Shared);
    let result = scan(dir.path(), &options);

    let group = result.group("temp").unwrap();
    assert_eq!(group.kind(), GroupKind::Mixed);
    let kinds: Vec<_> = group.entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EntryKind::File, EntryKind::Directory]);
}

#[test]
fn test_no_entry_in_two_groups() {
    let dir = tempdir().unwrap();
    for sub in ["a", "b", "c"] {
        write(&dir.path().join(sub).join("same.txt"), b"same");
        write(&dir.path().join(sub).join(format!("{sub}.txt")), b"same");
    }

    let options = ScanOptions::default().with_content(true);
    let result = scan(dir.path(), &options);

    let mut seen: Vec<PathBuf> = result.groups.iter().flat_map(|g| g.paths()).collect();
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
    assert!(result.groups.iter().all(|g| g.len() >= 2));
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        write(
            &dir.path().join(format!("d{}/f{}.txt", i % 3, i)),
            format!("{}", i % 4).as_bytes(),
        );
    }

    for options in [
        ScanOptions::default(),
        ScanOptions::default().with_content(true),
    ] {
        let first = scan(dir.path(), &options);
        let second = scan(dir.path(), &options);
        assert_eq!(first.groups, second.groups);
        assert_eq!(first.scanned_items, second.scanned_items);
    }
}

#[cfg(unix)]
fn locked_subdir(root: &Path) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let locked = root.join("locked");
    write(&locked.join("hidden.txt"), b"x");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Running with privileges that ignore permissions
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return None;
    }
    Some(locked)
}

#[cfg(unix)]
fn unlock(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_skipped_and_scan_continues() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/dup.txt"), b"1");
    write(&dir.path().join("z/dup.txt"), b"2");
    let Some(locked) = locked_subdir(dir.path()) else {
        return;
    };

    let result = scan(dir.path(), &ScanOptions::files_only());
    unlock(&locked);

    assert_eq!(result.summary.status, ScanStatus::Incomplete);
    assert_eq!(
        result.failed_items,
        vec![format!("Directory permission denied: {}", locked.display())]
    );
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].key.to_string_lossy(), "dup.txt");
}

#[cfg(unix)]
#[test]
fn test_strict_mode_aborts_on_unreadable_directory() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/dup.txt"), b"1");
    let Some(locked) = locked_subdir(dir.path()) else {
        return;
    };

    let finder = DuplicateFinder::new(FinderConfig::default().with_strict(true));
    let err = finder
        .scan(dir.path(), &ScanOptions::default())
        .unwrap_err();
    unlock(&locked);

    assert!(matches!(err, FinderError::Traversal(_)));
}

#[cfg(target_os = "linux")]
#[test]
fn test_overlong_directory_skipped_and_scan_continues() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/dup.txt"), b"1");
    write(&dir.path().join("z/dup.txt"), b"2");
    crate::overlong_chain(dir.path(), "m");

    let result = scan(dir.path(), &ScanOptions::files_only());

    assert_eq!(result.summary.status, ScanStatus::Incomplete);
    assert_eq!(result.failed_items.len(), 1);
    assert!(result.failed_items[0].starts_with("Directory read failed: "));
    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].paths(),
        vec![dir.path().join("a/dup.txt"), dir.path().join("z/dup.txt")]
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_strict_mode_aborts_on_overlong_directory() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/dup.txt"), b"1");
    crate::overlong_chain(dir.path(), "m");

    let finder = DuplicateFinder::new(FinderConfig::default().with_strict(true));
    let err = finder
        .scan(dir.path(), &ScanOptions::default())
        .unwrap_err();

    assert!(matches!(err, FinderError::Traversal(_)));
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_items_in_discovery_order() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a_link.bin");
    let last = dir.path().join("z_link.bin");
    std::os::unix::fs::symlink(dir.path().join("gone"), &first).unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone"), &last).unwrap();
    crate::overlong_chain(dir.path(), "m");

    let options = ScanOptions::files_only().with_content(true);
    let result = scan(dir.path(), &options);

    assert_eq!(result.failed_items.len(), 3);
    assert_eq!(
        result.failed_items[0],
        format!("File not found: {}", first.display())
    );
    assert!(result.failed_items[1].starts_with("Directory read failed: "));
    assert_eq!(
        result.failed_items[2],
        format!("File not found: {}", last.display())
    );
    assert_eq!(result.summary.status, ScanStatus::Incomplete);
}

#[cfg(unix)]
fn non_utf8(dir: &Path, raw: &[u8]) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;

    let path = dir.join(std::ffi::OsStr::from_bytes(raw));
    fs::create_dir_all(dir).unwrap();
    // Some filesystems only accept UTF-8 names
    fs::write(&path, raw).ok().map(|()| path)
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_compared_byte_for_byte() {
    let dir = tempdir().unwrap();
    let Some(ff) = non_utf8(dir.path(), b"\xff.txt") else {
        return;
    };
    non_utf8(dir.path(), b"\xfe.txt").unwrap();

    let result = scan(dir.path(), &ScanOptions::files_only());
    assert!(result.groups.is_empty(), "{:?}", result.groups);

    let copy = non_utf8(&dir.path().join("sub"), b"\xff.txt").unwrap();
    let result = scan(dir.path(), &ScanOptions::files_only());
    assert_eq!(result.groups.len(), 1);
    // "sub" sorts before the 0xFE/0xFF bytes
    assert_eq!(result.groups[0].paths(), vec![copy, ff]);
    assert_eq!(result.groups[0].key.to_string_lossy(), "\u{FFFD}.txt");
}

#[test]
fn test_invalid_options_rejected_before_scan() {
    let dir = tempdir().unwrap();
    let options = ScanOptions::dirs_only().with_content(true);

    let err = DuplicateFinder::with_defaults()
        .scan(dir.path(), &options)
        .unwrap_err();
    assert!(matches!(err, FinderError::Config(_)));
}
