use duplicate_cleaner::actions::{clean_paths, DeleteError};
use duplicate_cleaner::duplicates::DuplicateFinder;
use duplicate_cleaner::output::{read_delete_lists, save_list};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_clean_k_existing_paths() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..5)
        .map(|i| {
            let p = dir.path().join(format!("f{i}"));
            fs::write(&p, b"bytes").unwrap();
            p
        })
        .collect();

    let outcome = clean_paths(&paths, None);

    assert_eq!(outcome.succeeded, 5);
    assert!(outcome.failures.is_empty());
    assert!(paths.iter().all(|p| !p.exists()));
}

#[test]
fn test_clean_one_nonexistent_among_existing() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..3 {
        let p = dir.path().join(format!("f{i}"));
        fs::write(&p, b"bytes").unwrap();
        paths.push(p);
    }
    let ghost = dir.path().join("ghost");
    paths.insert(1, ghost.clone());

    let outcome = clean_paths(&paths, None);

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, ghost);
    assert!(matches!(outcome.failures[0].error, DeleteError::NotFound(_)));
}

#[test]
fn test_clean_empty_list_touches_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep"), b"bytes").unwrap();

    let outcome = clean_paths(&[], None);

    assert_eq!(outcome.succeeded, 0);
    assert!(outcome.all_succeeded());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_detect_edit_clean_workflow() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    fs::create_dir_all(root.join("backup")).unwrap();
    let original = root.join("photo.jpg");
    let copy = root.join("backup/photo.jpg");
    let other = root.join("notes.txt");
    fs::write(&original, b"jpeg bytes here").unwrap();
    fs::write(&copy, b"jpeg bytes here").unwrap();
    fs::write(&other, b"unrelated file!").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[root.clone()])
        .unwrap();
    let list = dir.path().join("list.txt");
    save_list(&list, &groups, None).unwrap();

    // The user keeps the original by deleting its line
    let original_line = format!("{}\t", original.display());
    let edited: String = fs::read_to_string(&list)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with(&original_line))
        .map(|line| format!("{line}\n"))
        .collect();
    fs::write(&list, edited).unwrap();

    let paths = read_delete_lists(&[list]).unwrap();
    assert_eq!(paths, vec![copy.clone()]);

    let outcome = clean_paths(&paths, None);

    assert_eq!(outcome.succeeded, 1);
    assert!(original.exists());
    assert!(!copy.exists());
    assert!(other.exists());
}

#[cfg(unix)]
#[test]
fn test_clean_permission_denied_continues() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked_dir = dir.path().join("locked");
    fs::create_dir(&locked_dir).unwrap();
    let protected = locked_dir.join("a");
    fs::write(&protected, b"x").unwrap();
    let free = dir.path().join("b");
    fs::write(&free, b"x").unwrap();

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();
    let outcome = clean_paths(&[protected.clone(), free.clone()], None);
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!free.exists());
    // Root ignores directory permissions
    if protected.exists() {
        assert_eq!(outcome.succeeded, 1);
        assert!(matches!(
            outcome.failures[0].error,
            DeleteError::PermissionDenied(_)
        ));
    } else {
        assert_eq!(outcome.succeeded, 2);
    }
}
