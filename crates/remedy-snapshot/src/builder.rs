//! Snapshot builder
//!
//! Walks the target tree, reads every text-bearing file that survives the
//! ignore rules, and concatenates them into one framed blob. File ordering
//! is lexicographic by relative path, so an unchanged tree always yields a
//! byte-identical blob.

use crate::error::SnapshotError;
use crate::snapshot::CodebaseSnapshot;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into
const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".idea",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".venv",
    ".vscode",
    "__pycache__",
    "build",
    "dist",
    "node_modules",
    "target",
    "venv",
];

/// File names never captured
const DEFAULT_IGNORED_FILES: &[&str] = &[
    ".gitignore",
    "Cargo.lock",
    "LICENSE",
    "Pipfile.lock",
    "db.sqlite3",
    "license",
    "package-lock.json",
    "poetry.lock",
    "uv.lock",
    "yarn.lock",
];

/// Builds a [`CodebaseSnapshot`] from a target source tree
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    root: PathBuf,
    ignored_dirs: BTreeSet<String>,
    ignored_files: BTreeSet<String>,
}

impl SnapshotBuilder {
    /// Create a builder for the given target root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(ToString::to_string).collect(),
            ignored_files: DEFAULT_IGNORED_FILES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Also ignore a directory name
    #[must_use]
    pub fn with_ignored_dir(mut self, name: impl Into<String>) -> Self {
        self.ignored_dirs.insert(name.into());
        self
    }

    /// Also ignore a file name
    ///
    /// Run artifacts (the persisted snapshot, the report) must be registered
    /// here so a rerun does not capture its own output.
    #[must_use]
    pub fn with_ignored_file(mut self, name: impl Into<String>) -> Self {
        self.ignored_files.insert(name.into());
        self
    }

    /// Target root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and build the snapshot
    ///
    /// # Errors
    /// - `SnapshotError::RootNotFound` if the root is not a directory
    /// - `SnapshotError::NoReadableFiles` if nothing survived the walk
    /// - `SnapshotError::Walk` if the traversal itself failed
    ///
    /// Per-file read failures (binary content, permissions) are logged and
    /// the file is skipped; they never abort the build.
    pub fn build(&self) -> Result<CodebaseSnapshot, SnapshotError> {
        if !self.root.is_dir() {
            return Err(SnapshotError::RootNotFound(self.root.clone()));
        }

        let paths = self.collect_paths()?;

        let mut text = String::new();
        let mut file_count = 0usize;

        for relative in &paths {
            let full = self.root.join(relative);
            match std::fs::read(&full) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(contents) => {
                        text.push_str(&CodebaseSnapshot::frame_file(relative, &contents));
                        file_count += 1;
                        tracing::debug!(file = %relative, "captured");
                    }
                    Err(_) => {
                        tracing::warn!(file = %relative, "skipped binary file");
                    }
                },
                Err(e) => {
                    tracing::warn!(file = %relative, error = %e, "skipped unreadable file");
                }
            }
        }

        if file_count == 0 {
            return Err(SnapshotError::NoReadableFiles(self.root.clone()));
        }

        tracing::info!(
            files = file_count,
            chars = text.chars().count(),
            root = %self.root.display(),
            "snapshot built"
        );

        Ok(CodebaseSnapshot::from_framed_text(text, file_count))
    }

    /// Collect candidate relative paths in lexicographic order
    fn collect_paths(&self) -> Result<Vec<String>, SnapshotError> {
        let mut paths = Vec::new();

        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                // Never filter the root itself, whatever it is named.
                entry.depth() == 0 || !self.ignored_dirs.contains(name.as_ref())
            } else {
                true
            }
        });

        for entry in walker {
            let entry = entry.map_err(|e| SnapshotError::Walk {
                path: self.root.clone(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.ignored_files.contains(name.as_ref()) || name.starts_with(".env") {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            paths.push(relative);
        }

        // Lexicographic by full relative path keeps reruns byte-identical.
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
    }

    #[test]
    fn build_orders_files_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta.py", b"z = 1\n");
        write(dir.path(), "alpha.py", b"a = 1\n");
        write(dir.path(), "backend/views.py", b"view\n");

        let snapshot = SnapshotBuilder::new(dir.path()).build().unwrap();

        let alpha = snapshot.text().find("File: alpha.py").unwrap();
        let backend = snapshot.text().find("File: backend/views.py").unwrap();
        let zeta = snapshot.text().find("File: zeta.py").unwrap();
        assert!(alpha < backend && backend < zeta);
        assert_eq!(snapshot.file_count(), 3);
    }

    #[test]
    fn build_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/one.ts", b"const one = 1;\n");
        write(dir.path(), "b/two.ts", b"const two = 2;\n");

        let builder = SnapshotBuilder::new(dir.path());
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();

        assert_eq!(first.text(), second.text());
    }

    #[test]
    fn ignored_dirs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/app.py", b"app\n");
        write(dir.path(), "node_modules/pkg/index.js", b"junk\n");
        write(dir.path(), "__pycache__/app.pyc", b"cache\n");

        let snapshot = SnapshotBuilder::new(dir.path()).build().unwrap();

        assert!(snapshot.contains_file("src/app.py"));
        assert!(!snapshot.text().contains("node_modules"));
        assert!(!snapshot.text().contains("__pycache__"));
        assert_eq!(snapshot.file_count(), 1);
    }

    #[test]
    fn ignored_and_env_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", b"app\n");
        write(dir.path(), "package-lock.json", b"{}\n");
        write(dir.path(), ".env", b"SECRET=1\n");
        write(dir.path(), ".env.local", b"SECRET=2\n");

        let snapshot = SnapshotBuilder::new(dir.path()).build().unwrap();

        assert_eq!(snapshot.file_count(), 1);
        assert!(!snapshot.text().contains("SECRET"));
    }

    #[test]
    fn binary_files_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", b"app\n");
        write(dir.path(), "logo.png", &[0x89, 0x50, 0x4e, 0x47, 0x00, 0xff]);

        let snapshot = SnapshotBuilder::new(dir.path()).build().unwrap();

        assert_eq!(snapshot.file_count(), 1);
        assert!(!snapshot.contains_file("logo.png"));
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = SnapshotBuilder::new("/definitely/not/here").build().unwrap_err();
        assert!(matches!(err, SnapshotError::RootNotFound(_)));
    }

    #[test]
    fn tree_without_readable_files_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "blob.bin", &[0x00, 0x01, 0xfe]);

        let err = SnapshotBuilder::new(dir.path()).build().unwrap_err();
        assert!(matches!(err, SnapshotError::NoReadableFiles(_)));
    }

    #[test]
    fn extra_ignored_file_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", b"app\n");
        write(dir.path(), "remediation_report.txt", b"old report\n");

        let snapshot = SnapshotBuilder::new(dir.path())
            .with_ignored_file("remediation_report.txt")
            .build()
            .unwrap();

        assert_eq!(snapshot.file_count(), 1);
        assert!(!snapshot.text().contains("old report"));
    }
}
