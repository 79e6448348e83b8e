//! Property tests for snapshot determinism
//!
//! For any generated file tree, building the snapshot twice must yield
//! byte-identical output, and every captured file must be attributable.

use proptest::prelude::*;
use remedy_snapshot::SnapshotBuilder;
use std::fs;

fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}\\.(py|ts|tsx|txt)"
}

fn file_contents() -> impl Strategy<Value = String> {
    "[ -~\\n]{0,200}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn rebuild_is_byte_identical(
        files in proptest::collection::btree_map(file_name(), file_contents(), 1..8)
    ) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in &files {
            fs::write(dir.path().join(name), contents).unwrap();
        }

        let builder = SnapshotBuilder::new(dir.path());
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();

        prop_assert_eq!(first.text(), second.text());
        prop_assert_eq!(first.file_count(), files.len());
    }

    #[test]
    fn every_captured_file_is_attributable(
        files in proptest::collection::btree_map(file_name(), file_contents(), 1..8)
    ) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in &files {
            fs::write(dir.path().join(name), contents).unwrap();
        }

        let snapshot = SnapshotBuilder::new(dir.path()).build().unwrap();
        for name in files.keys() {
            prop_assert!(snapshot.contains_file(name));
        }
    }
}
