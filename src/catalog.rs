use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::image_extension;
use crate::error::{Error, Result};

/// Naming filter for snapshot files: a fixed file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotPattern {
    extension: String,
}

impl SnapshotPattern {
    pub fn extension(ext: &str) -> Self {
        Self {
            extension: ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.extension
    }

    /// Case-sensitive, like a shell glob on a POSIX filesystem.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e == self.extension)
    }
}

impl Default for SnapshotPattern {
    fn default() -> Self {
        Self::extension("csv")
    }
}

impl fmt::Display for SnapshotPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*.{}", self.extension)
    }
}

/// One frame on disk. Read-only to us.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path with the same stem and the image format's extension.
    pub fn image_path(&self, format: ImageFormat) -> PathBuf {
        let ext = image_extension(format).unwrap_or("png");
        self.path.with_extension(ext)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Non-empty set of snapshots found in one directory.
#[derive(Clone, Debug)]
pub struct Catalog {
    dir: PathBuf,
    snapshots: Vec<Snapshot>,
}

impl Catalog {
    /// Lists the regular files directly inside `dir` that match `pattern`.
    ///
    /// Fails with `DirectoryNotFound` if `dir` is missing or not a directory and
    /// with `EmptyBatch` if nothing matches. Paths come back sorted, though
    /// nothing downstream depends on the order.
    pub fn scan<P: AsRef<Path>>(dir: P, pattern: &SnapshotPattern) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut snapshots = vec![];
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry?;
            if entry.file_type().is_file() && pattern.matches(entry.path()) {
                snapshots.push(Snapshot::new(entry.path()));
            }
        }
        snapshots.sort();

        if snapshots.is_empty() {
            return Err(Error::EmptyBatch {
                dir: dir.to_path_buf(),
                pattern: pattern.to_string(),
            });
        }
        debug!(dir = %dir.display(), count = snapshots.len(), "scanned snapshot directory");

        Self::from_snapshots(dir, snapshots)
    }

    /// Fails with `OutputCollision` if two snapshots differ only in their
    /// extension, since their images would land on the same path.
    pub fn from_snapshots<P: AsRef<Path>>(dir: P, snapshots: Vec<Snapshot>) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(Error::EmptyBatch {
                dir: dir.as_ref().to_path_buf(),
                pattern: String::new(),
            });
        }
        check_distinct_stems(&snapshots)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            snapshots,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

fn check_distinct_stems(snapshots: &[Snapshot]) -> Result<()> {
    let mut stems: HashMap<PathBuf, &Snapshot> = HashMap::new();
    for s in snapshots {
        let stem = s.path().with_extension("");
        if let Some(first) = stems.insert(stem.clone(), s) {
            return Err(Error::OutputCollision {
                first: first.path().to_path_buf(),
                second: s.path().to_path_buf(),
                stem,
            });
        }
    }
    Ok(())
}
