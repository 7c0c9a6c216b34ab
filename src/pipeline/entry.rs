//! Synthetic entry modules
//!
//! Every package gets a one-line source file that requires it, plus one
//! aggregate file requiring all of them. The file names are derived from a
//! sanitized id so build artifacts of different entries can never collide.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::infra::FileSystem;

use super::config::IsolationMode;
use super::error::MaterializeError;
use super::gate::Gate;

/// Name of the aggregate entry
pub const AGGREGATE_NAME: &str = "_all";

/// Label shown for the aggregate entry in reports
pub const AGGREGATE_LABEL: &str = "All";

/// Whether an entry probes one package or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    /// One package
    Single,
    /// Every package at once
    Aggregate,
}

/// One unit of work: a source file and the artifacts it will produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Single package or aggregate
    pub kind: EntryKind,
    /// Package name, or [`AGGREGATE_NAME`]
    pub name: String,
    /// Filesystem-safe id derived from `name`
    pub id: String,
    /// Synthesized source file
    pub input_path: PathBuf,
    /// Build artifact
    pub output_path: PathBuf,
    /// Compressed build artifact
    pub output_compressed_path: PathBuf,
}

impl Entry {
    /// Whether this is the all-packages entry
    pub fn is_aggregate(&self) -> bool {
        self.kind == EntryKind::Aggregate
    }

    /// Name shown in reports
    pub fn display_name(&self) -> &str {
        if self.is_aggregate() {
            AGGREGATE_LABEL
        } else {
            &self.name
        }
    }

    /// Isolation the build command should apply to this entry
    pub fn isolation(&self) -> IsolationMode {
        match self.kind {
            EntryKind::Single => IsolationMode::TargetOnly,
            EntryKind::Aggregate => IsolationMode::BundleAll,
        }
    }
}

/// Turn a package name into a filesystem-safe id.
///
/// `/` becomes `--`; anything outside `[A-Za-z0-9._@-]` becomes `_`.
///
/// # Examples
///
/// ```
/// use bundle_sizer::pipeline::entry::sanitize_id;
///
/// assert_eq!(sanitize_id("date-fns/format"), "date-fns--format");
/// assert_eq!(sanitize_id("@scope/pkg"), "@scope--pkg");
/// ```
pub fn sanitize_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            '/' => id.push_str("--"),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '-') => id.push(c),
            _ => id.push('_'),
        }
    }
    id
}

/// Source line requiring one package
///
/// # Examples
///
/// ```
/// use bundle_sizer::pipeline::entry::entry_source;
///
/// assert_eq!(entry_source("react"), "console.log(require('react'));");
/// ```
pub fn entry_source(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("console.log(require('{}'));", escaped)
}

/// Source requiring every package, one line each
pub fn aggregate_source(packages: &[String]) -> String {
    packages
        .iter()
        .map(|name| entry_source(name))
        .collect::<Vec<_>>()
        .join("\n")
}

struct PendingEntry {
    entry: Entry,
    source: String,
}

/// Writes entry sources into the output directory
pub struct EntryMaterializer<FS: FileSystem> {
    out_dir: PathBuf,
    extension: String,
    fs: FS,
}

impl<FS: FileSystem> EntryMaterializer<FS> {
    /// Create a materializer writing `<id>.<extension>` files into `out_dir`
    pub fn new(out_dir: impl Into<PathBuf>, extension: impl Into<String>, fs: FS) -> Self {
        Self {
            out_dir: out_dir.into(),
            extension: extension.into(),
            fs,
        }
    }

    /// Output directory
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Describe the entry for `name` without touching the filesystem
    pub fn describe(&self, kind: EntryKind, name: &str) -> Entry {
        let id = sanitize_id(name);
        let ext = &self.extension;
        Entry {
            kind,
            name: name.to_string(),
            input_path: self.out_dir.join(format!("{id}.{ext}")),
            output_path: self.out_dir.join(format!("{id}.bundle.{ext}")),
            output_compressed_path: self.out_dir.join(format!("{id}.bundle.{ext}.gz")),
            id,
        }
    }

    /// Create the output directory; an existing directory is fine
    pub fn prepare_dir(&self) -> Result<(), MaterializeError> {
        self.fs
            .create_dir_all(&self.out_dir)
            .map_err(|source| MaterializeError::CreateDir {
                path: self.out_dir.clone(),
                source,
            })
    }

    /// Write one entry source and return its descriptor
    pub fn materialize(
        &self,
        kind: EntryKind,
        name: &str,
        source: &str,
    ) -> Result<Entry, MaterializeError> {
        let entry = self.describe(kind, name);
        self.write(&entry, source)?;
        Ok(entry)
    }

    /// Write every package entry plus the aggregate entry.
    ///
    /// Writes fan out on the current rayon pool, each holding an `io_gate`
    /// slot. Returns once every write has finished or with the first failure.
    /// Entries come back in package order with the aggregate last.
    pub fn materialize_all(
        &self,
        packages: &[String],
        io_gate: &Gate,
    ) -> Result<Vec<Entry>, MaterializeError> {
        if packages.is_empty() {
            return Err(MaterializeError::NoPackages);
        }

        let pending = self.plan(packages)?;
        self.prepare_dir()?;

        pending
            .par_iter()
            .map(|p| {
                let _permit = io_gate.acquire();
                self.write(&p.entry, &p.source)?;
                Ok(p.entry.clone())
            })
            .collect()
    }

    /// Describe all entries and reject id collisions before anything is written
    fn plan(&self, packages: &[String]) -> Result<Vec<PendingEntry>, MaterializeError> {
        let mut pending: Vec<PendingEntry> = packages
            .iter()
            .map(|name| PendingEntry {
                entry: self.describe(EntryKind::Single, name),
                source: entry_source(name),
            })
            .collect();
        pending.push(PendingEntry {
            entry: self.describe(EntryKind::Aggregate, AGGREGATE_NAME),
            source: aggregate_source(packages),
        });

        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(pending.len());
        for p in &pending {
            if let Some(first) = seen.insert(&p.entry.id, &p.entry.name) {
                return Err(MaterializeError::DuplicateId {
                    id: p.entry.id.clone(),
                    first: first.to_string(),
                    second: p.entry.name.clone(),
                });
            }
        }

        Ok(pending)
    }

    fn write(&self, entry: &Entry, source: &str) -> Result<(), MaterializeError> {
        log::debug!("writing {}", entry.input_path.display());
        self.fs
            .write(&entry.input_path, source.as_bytes())
            .map_err(|source| MaterializeError::Write {
                path: entry.input_path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RealFileSystem;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::io;
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use tempfile::TempDir;

    // Mock FileSystem that records writes and can fail on demand
    #[derive(Clone, Default)]
    struct MockFileSystem {
        writes: Arc<Mutex<Vec<PathBuf>>>,
        fail_create_dir: bool,
        fail_write_containing: Option<String>,
    }

    impl FileSystem for MockFileSystem {
        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            if self.fail_create_dir {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            Ok(())
        }

        fn metadata(&self, _path: &Path) -> io::Result<std::fs::Metadata> {
            unimplemented!("metadata not needed for these tests")
        }

        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            unimplemented!("read_to_string not needed for these tests")
        }

        fn write(&self, path: &Path, _contents: &[u8]) -> io::Result<()> {
            if let Some(ref needle) = self.fail_write_containing {
                if path.to_string_lossy().contains(needle.as_str()) {
                    return Err(io::Error::other("disk full"));
                }
            }
            self.writes.lock().push(path.to_path_buf());
            Ok(())
        }
    }

    fn io_gate() -> Gate {
        Gate::new("io", NonZeroUsize::new(4).unwrap())
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_id_replaces_slashes_and_unsafe_chars() {
        assert_eq!(sanitize_id("react"), "react");
        assert_eq!(
            sanitize_id("react-select/lib/Async"),
            "react-select--lib--Async"
        );
        assert_eq!(sanitize_id("bricks.js"), "bricks.js");
        assert_eq!(sanitize_id("a b:c"), "a_b_c");
        assert_eq!(sanitize_id("a\\b"), "a_b");
    }

    #[test]
    fn test_entry_source_escapes_quotes() {
        assert_eq!(entry_source("it's"), "console.log(require('it\\'s'));");
    }

    #[test]
    fn test_aggregate_source_joins_every_package() {
        let source = aggregate_source(&names(&["a", "b/c"]));
        assert_eq!(
            source,
            "console.log(require('a'));\nconsole.log(require('b/c'));"
        );
    }

    #[test]
    fn test_describe_derives_paths_from_id() {
        let materializer = EntryMaterializer::new("/out", "js", MockFileSystem::default());
        let entry = materializer.describe(EntryKind::Single, "date-fns/format");

        assert_eq!(entry.id, "date-fns--format");
        assert_eq!(entry.input_path, PathBuf::from("/out/date-fns--format.js"));
        assert_eq!(
            entry.output_path,
            PathBuf::from("/out/date-fns--format.bundle.js")
        );
        assert_eq!(
            entry.output_compressed_path,
            PathBuf::from("/out/date-fns--format.bundle.js.gz")
        );
        assert_eq!(entry.isolation(), IsolationMode::TargetOnly);
    }

    #[test]
    fn test_aggregate_entry_is_flagged() {
        let materializer = EntryMaterializer::new("/out", "mjs", MockFileSystem::default());
        let entry = materializer.describe(EntryKind::Aggregate, AGGREGATE_NAME);

        assert!(entry.is_aggregate());
        assert_eq!(entry.display_name(), "All");
        assert_eq!(entry.isolation(), IsolationMode::BundleAll);
        assert_eq!(entry.input_path, PathBuf::from("/out/_all.mjs"));
    }

    #[test]
    fn test_materialize_all_produces_n_plus_one_entries() {
        let fs = MockFileSystem::default();
        let materializer = EntryMaterializer::new("/out", "js", fs.clone());

        let entries = materializer
            .materialize_all(&names(&["a", "b", "c/d"]), &io_gate())
            .unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c/d", AGGREGATE_NAME]
        );
        assert_eq!(
            entries.iter().filter(|e| e.is_aggregate()).count(),
            1,
            "exactly one aggregate entry"
        );
        assert_eq!(fs.writes.lock().len(), 4);
    }

    #[test]
    fn test_materialize_all_rejects_empty_list() {
        let materializer = EntryMaterializer::new("/out", "js", MockFileSystem::default());
        let err = materializer.materialize_all(&[], &io_gate()).unwrap_err();
        assert!(matches!(err, MaterializeError::NoPackages));
    }

    #[test]
    fn test_materialize_all_rejects_colliding_ids_before_writing() {
        let fs = MockFileSystem::default();
        let materializer = EntryMaterializer::new("/out", "js", fs.clone());

        let err = materializer
            .materialize_all(&names(&["a/b", "a--b"]), &io_gate())
            .unwrap_err();

        match err {
            MaterializeError::DuplicateId { id, first, second } => {
                assert_eq!(id, "a--b");
                assert_eq!(first, "a/b");
                assert_eq!(second, "a--b");
            }
            other => panic!("expected DuplicateId, got {other:?}"),
        }
        assert!(fs.writes.lock().is_empty());
    }

    #[test]
    fn test_package_named_like_aggregate_collides() {
        let materializer = EntryMaterializer::new("/out", "js", MockFileSystem::default());
        let err = materializer
            .materialize_all(&names(&["_all"]), &io_gate())
            .unwrap_err();
        assert!(matches!(err, MaterializeError::DuplicateId { .. }));
    }

    #[test]
    fn test_create_dir_failure_aborts_before_writes() {
        let fs = MockFileSystem {
            fail_create_dir: true,
            ..Default::default()
        };
        let materializer = EntryMaterializer::new("/out", "js", fs.clone());

        let err = materializer
            .materialize_all(&names(&["a"]), &io_gate())
            .unwrap_err();

        assert!(matches!(err, MaterializeError::CreateDir { .. }));
        assert!(fs.writes.lock().is_empty());
    }

    #[test]
    fn test_write_failure_surfaces() {
        let fs = MockFileSystem {
            fail_write_containing: Some("broken".to_string()),
            ..Default::default()
        };
        let materializer = EntryMaterializer::new("/out", "js", fs);

        let err = materializer
            .materialize_all(&names(&["ok", "broken", "fine"]), &io_gate())
            .unwrap_err();

        match err {
            MaterializeError::Write { path, .. } => {
                assert!(path.ends_with("broken.js"));
            }
            other => panic!("expected Write error, got {other:?}"),
        }
    }

    #[test]
    fn test_materialize_writes_real_files() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("dist");
        let materializer = EntryMaterializer::new(&out_dir, "js", RealFileSystem);

        let entries = materializer
            .materialize_all(&names(&["react", "date-fns/format"]), &io_gate())
            .unwrap();

        let aggregate = entries.last().unwrap();
        let contents = std::fs::read_to_string(&aggregate.input_path).unwrap();
        assert_eq!(
            contents,
            "console.log(require('react'));\nconsole.log(require('date-fns/format'));"
        );
        let single = std::fs::read_to_string(out_dir.join("date-fns--format.js")).unwrap();
        assert_eq!(single, "console.log(require('date-fns/format'));");
    }

    #[test]
    fn test_existing_output_directory_is_reused() {
        let temp_dir = TempDir::new().unwrap();
        let materializer = EntryMaterializer::new(temp_dir.path(), "js", RealFileSystem);

        materializer.prepare_dir().unwrap();
        let entry = materializer
            .materialize(EntryKind::Single, "react", "console.log(require('react'));")
            .unwrap();
        assert!(entry.input_path.is_file());
    }

    proptest! {
        /// Property: sanitizing is idempotent and never yields path separators
        #[test]
        fn prop_sanitize_id_is_idempotent_and_safe(name in "[ -~]{1,40}") {
            let id = sanitize_id(&name);
            prop_assert_eq!(sanitize_id(&id), id.clone());
            prop_assert!(!id.contains('/'));
            prop_assert!(!id.contains('\\'));
            prop_assert_eq!(sanitize_id(&name), id);
        }

        /// Property: N distinct npm-style names produce N+1 entries with unique ids
        #[test]
        fn prop_entries_have_unique_ids(
            list in proptest::collection::hash_set("[a-z][a-z0-9]{0,6}(/[a-z][a-z0-9]{0,6})?", 1..20)
        ) {
            let packages: Vec<String> = list.into_iter().collect();
            let materializer = EntryMaterializer::new("/out", "js", MockFileSystem::default());
            let entries = materializer.materialize_all(&packages, &io_gate()).unwrap();

            prop_assert_eq!(entries.len(), packages.len() + 1);
            let ids: HashSet<_> = entries.iter().map(|e| e.id.clone()).collect();
            prop_assert_eq!(ids.len(), entries.len());
        }
    }
}
