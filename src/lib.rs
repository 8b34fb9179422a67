//! Render a directory of scalar-field snapshots into colour-mapped images that
//! all share one colour scale.

pub mod bench;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod painter;
pub mod parser;
pub mod pipeline;
pub mod reducer;
pub mod renderer;
pub mod threads;

pub use catalog::{Catalog, Snapshot, SnapshotPattern};
pub use config::{ColormapKind, Origin, RenderConfig};
pub use error::{Error, Result};
pub use grid::Grid;
pub use pipeline::{render_frames, BatchReport, Pipeline};
pub use reducer::NormalizationBound;
pub use renderer::Renderer;
