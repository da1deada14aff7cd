use duplicate_cleaner::duplicates::{DuplicateFinder, DuplicateGroups, FinderConfig};
use duplicate_cleaner::scanner::HashAlgorithm;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn group_sets(groups: &DuplicateGroups) -> HashSet<Vec<PathBuf>> {
    groups
        .iter()
        .map(|(_, files)| {
            let mut paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
            paths.sort();
            paths
        })
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"content a");
    write_file(&dir.path().join("b.txt"), b"content bb");
    write_file(&dir.path().join("c.txt"), b"content c");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    // a and c share a size, so they are hashed, but the digests differ
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 2);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_four_file_scenario() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("left/A");
    let b = dir.path().join("right/B");
    write_file(&a, &[b'x'; 10]);
    write_file(&b, &[b'x'; 10]);
    write_file(&dir.path().join("left/C"), &[b'y'; 10]);
    write_file(&dir.path().join("right/D"), &[b'z'; 20]);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(group_sets(&groups), HashSet::from([expected]));
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_scan_groups_have_valid_records() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(&dir.path().join(format!("d{}/f{i}", i % 2)), format!("c{}", i % 3).as_bytes());
    }
    write_file(&dir.path().join("empty1"), b"");
    write_file(&dir.path().join("empty2"), b"");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 3);
    let mut seen = HashSet::new();
    for (hash, files) in groups.iter() {
        assert!(files.len() >= 2);
        for file in files {
            assert!(file.size > 0);
            assert_eq!(file.hash.as_deref(), Some(hash));
            assert!(seen.insert(file.path.clone()), "record in two groups");
        }
    }
}

#[test]
fn test_scan_skips_version_control_dirs() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("src/a.rs"), b"fn main() {}");
    write_file(&dir.path().join(".git/objects/a"), b"fn main() {}");
    write_file(&dir.path().join(".SVN/pristine/a"), b"fn main() {}");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(groups.is_empty());
}

#[test]
fn test_scan_every_algorithm_agrees_on_groups() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"same same");
    write_file(&dir.path().join("b"), b"same same");
    write_file(&dir.path().join("c"), b"diff diff");

    let baseline = group_sets(
        &DuplicateFinder::with_defaults()
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap()
            .0,
    );

    for algorithm in HashAlgorithm::ALL {
        let finder = DuplicateFinder::new(FinderConfig::default().with_algorithm(algorithm));
        let (groups, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(group_sets(&groups), baseline, "{algorithm}");
        for (hash, _) in groups.iter() {
            assert_eq!(hash.len(), algorithm.hex_len());
        }
    }
}

#[test]
fn test_scan_overlapping_roots_lists_file_twice() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    write_file(&sub.join("only.txt"), b"lonely");

    // The same file reached through two roots looks like two identical files
    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf(), sub.clone()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
}

#[test]
fn test_scan_relative_root_yields_absolute_paths() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"dup");
    write_file(&dir.path().join("b"), b"dup");

    let cwd = std::env::current_dir().unwrap();
    let relative = pathdiff(dir.path(), &cwd);

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[relative])
        .unwrap();

    assert!(groups.paths().iter().all(|p| p.is_absolute()));
}

/// Relative path from `base` to `path`, both absolute.
fn pathdiff(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return path.iter().collect();
    }
    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component);
    }
    out
}
