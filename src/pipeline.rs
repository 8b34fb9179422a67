//! Two-pass batch coordinator.
//!
//! Pass 1 reduces every snapshot to its maximum and folds those into one
//! [`NormalizationBound`]. Pass 2 renders every snapshot through that bound.
//! `Executor::map` only returns once all of its tasks are done, so the bound
//! exists as a plain value before any render task is queued.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, info_span};

use crate::catalog::{Catalog, Snapshot};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::reducer::{local_max, reduce_bound, NormalizationBound};
use crate::renderer::Renderer;
use crate::threads::{AnyExecutor, Executor};

/// What a finished batch produced.
#[derive(Clone, Debug)]
pub struct BatchReport {
    pub bound: NormalizationBound,
    pub frames: usize,
    pub images: Vec<PathBuf>,
    pub reduce_time: Duration,
    pub render_time: Duration,
}

pub struct Pipeline<E> {
    executor: E,
    renderer: Arc<Renderer>,
}

impl Pipeline<AnyExecutor> {
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            AnyExecutor::with_threads(config.threads),
            Renderer::from_config(config),
        ))
    }
}

impl<E: Executor> Pipeline<E> {
    pub fn new(executor: E, renderer: Renderer) -> Self {
        Self {
            executor,
            renderer: Arc::new(renderer),
        }
    }

    /// Pass 1: the batch-wide maximum.
    pub fn reduce(&self, catalog: &Catalog) -> Result<NormalizationBound> {
        let _span = info_span!("reduce", frames = catalog.len()).entered();
        let maxima = self
            .executor
            .map(catalog.snapshots().to_vec(), |s: Snapshot| local_max(s.path()))?;
        reduce_bound(maxima).ok_or_else(|| Error::EmptyBatch {
            dir: catalog.dir().to_path_buf(),
            pattern: String::new(),
        })
    }

    /// Pass 2: one image per snapshot, all through the same `bound`.
    pub fn render(&self, catalog: &Catalog, bound: NormalizationBound) -> Result<Vec<PathBuf>> {
        let _span = info_span!("render", frames = catalog.len(), %bound).entered();
        let renderer = self.renderer.clone();
        self.executor
            .map(catalog.snapshots().to_vec(), move |s: Snapshot| {
                renderer.render(&s, bound)
            })
    }

    pub fn run(&self, catalog: &Catalog) -> Result<BatchReport> {
        let start = Instant::now();
        let bound = self.reduce(catalog)?;
        let reduce_time = start.elapsed();
        info!(%bound, frames = catalog.len(), ?reduce_time, "normalization bound computed");

        let start = Instant::now();
        let images = self.render(catalog, bound)?;
        let render_time = start.elapsed();
        info!(images = images.len(), ?render_time, "frames rendered");

        Ok(BatchReport {
            bound,
            frames: catalog.len(),
            images,
            reduce_time,
            render_time,
        })
    }
}

/// Scans `config.input_dir` and renders every matching snapshot.
pub fn render_frames(config: &RenderConfig) -> Result<BatchReport> {
    let pipeline = Pipeline::from_config(config)?;
    let catalog = Catalog::scan(&config.input_dir, &config.pattern)?;
    info!(
        dir = %config.input_dir.display(),
        pattern = %config.pattern,
        frames = catalog.len(),
        workers = pipeline.executor.size(),
        "starting batch"
    );
    pipeline.run(&catalog)
}
