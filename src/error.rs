use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a batch. The first one observed wins.
#[derive(Debug, Error)]
pub enum Error {
    #[error("snapshot directory not found or not accessible: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("no snapshot files matching '{pattern}' in {}", .dir.display())]
    EmptyBatch { dir: PathBuf, pattern: String },

    #[error("snapshot {} contains no values", .path.display())]
    EmptySnapshot { path: PathBuf },

    #[error("{}:{line}: not a decimal value: {content:?}", .path.display())]
    MalformedValue {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("snapshot {} has {actual} values, expected {expected}", .path.display())]
    ShapeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error(
        "snapshots {} and {} share the stem {} and would render to the same image",
        .first.display(),
        .second.display(),
        .stem.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        stem: PathBuf,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("worker panicked while processing {task}")]
    WorkerPanicked { task: String },

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stable name of the condition, used in log fields and exit reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound { .. } => "DirectoryNotFound",
            Self::EmptyBatch { .. } => "EmptyBatch",
            Self::EmptySnapshot { .. } => "EmptySnapshot",
            Self::MalformedValue { .. } => "MalformedValue",
            Self::ShapeMismatch { .. } => "ShapeMismatch",
            Self::OutputCollision { .. } => "OutputCollision",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Io { .. } => "Io",
            Self::Image { .. } => "Image",
            Self::WorkerPanicked { .. } => "WorkerPanicked",
            Self::Walk(_) => "Walk",
        }
    }
}

#[test]
fn test_shape_mismatch_message() {
    let e = Error::ShapeMismatch {
        path: PathBuf::from("frames/a.csv"),
        expected: 4,
        actual: 3,
    };
    assert_eq!(e.kind(), "ShapeMismatch");
    assert_eq!(
        e.to_string(),
        "snapshot frames/a.csv has 3 values, expected 4"
    );
}

#[test]
fn test_malformed_value_names_line() {
    let e = Error::MalformedValue {
        path: PathBuf::from("a.csv"),
        line: 7,
        content: "abc".to_string(),
    };
    assert_eq!(e.to_string(), "a.csv:7: not a decimal value: \"abc\"");
}
