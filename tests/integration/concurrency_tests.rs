use duplicate_cleaner::duplicates::{DuplicateFinder, DuplicateGroups, FinderConfig};
use duplicate_cleaner::progress::ProgressCallback;
use duplicate_cleaner::scanner::{hash_records, FileRecord, HashAlgorithm, HasherConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

fn populated_tree() -> TempDir {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let sub = dir.path().join(format!("d{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        // 8 distinct contents, several sizes
        let content = "x".repeat(1 + i % 8);
        fs::write(sub.join(format!("f{i}")), content).unwrap();
    }
    dir
}

fn as_sets(groups: &DuplicateGroups) -> BTreeMap<String, BTreeSet<PathBuf>> {
    groups
        .iter()
        .map(|(hash, files)| {
            (
                hash.to_string(),
                files.iter().map(|f| f.path.clone()).collect(),
            )
        })
        .collect()
}

#[test]
fn test_same_groups_for_one_and_eight_workers() {
    let dir = populated_tree();
    let roots = vec![dir.path().to_path_buf()];

    for algorithm in HashAlgorithm::ALL {
        let run = |n| {
            let config = FinderConfig::default()
                .with_io_threads(n)
                .with_algorithm(algorithm);
            as_sets(&DuplicateFinder::new(config).find_duplicates(&roots).unwrap().0)
        };

        let serial = run(1);
        assert_eq!(serial.len(), 8);
        assert_eq!(serial, run(8));
    }
}

#[test]
fn test_hash_is_stable_across_runs() {
    let dir = populated_tree();
    let roots = vec![dir.path().to_path_buf()];
    let finder = DuplicateFinder::with_defaults();

    let first = as_sets(&finder.find_duplicates(&roots).unwrap().0);
    let second = as_sets(&finder.find_duplicates(&roots).unwrap().0);

    assert_eq!(first, second);
}

/// Counts hashing callbacks.
struct Tally {
    hashed: AtomicUsize,
    reported: AtomicUsize,
    highest: Mutex<usize>,
}

impl ProgressCallback for Tally {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, current: usize, _path: &str) {
        self.reported.fetch_add(1, Ordering::SeqCst);
        let mut highest = self.highest.lock().unwrap();
        *highest = (*highest).max(current);
    }

    fn on_item_completed(&self, _bytes: u64) {
        self.hashed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_hash_records_reports_every_file_once() {
    let dir = populated_tree();
    let mut records: Vec<FileRecord> = fs::read_dir(dir.path().join("d0"))
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let size = fs::metadata(&path).unwrap().len();
            FileRecord::new(path, size)
        })
        .collect();
    records.push(FileRecord::new(dir.path().join("missing"), 3));
    let total = records.len();

    let sink = Arc::new(Tally {
        hashed: AtomicUsize::new(0),
        reported: AtomicUsize::new(0),
        highest: Mutex::new(0),
    });
    let config = HasherConfig::default()
        .with_io_threads(3)
        .with_progress_callback(sink.clone());

    let stats = hash_records(&mut records, &config).unwrap();

    assert_eq!(stats.hashed_files, total - 1);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(sink.reported.load(Ordering::SeqCst), total);
    assert_eq!(sink.hashed.load(Ordering::SeqCst), total - 1);
    assert_eq!(*sink.highest.lock().unwrap(), total);
    assert_eq!(records.iter().filter(|r| r.hash.is_none()).count(), 1);
}
