use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::ValueReader;

/// The shared colour-scale maximum for a whole batch.
///
/// Only obtainable from [`reduce_bound`] or [`NormalizationBound::new`], never
/// negative, and `Copy`, so every render task gets its own value instead of
/// reading shared state.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct NormalizationBound(f64);

impl NormalizationBound {
    pub fn new(max: f64) -> Self {
        Self(if max > 0.0 { max } else { 0.0 })
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Maps `value` into `[0, 1]`. A zero bound maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.0 == 0.0 {
            return 0.0;
        }
        (value / self.0).clamp(0.0, 1.0)
    }
}

impl fmt::Display for NormalizationBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest value in one snapshot. Streams the file.
pub fn local_max<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let mut max: Option<f64> = None;
    for value in ValueReader::open(path)? {
        let value = value?;
        max = Some(max.map_or(value, |m| m.max(value)));
    }
    max.ok_or_else(|| Error::EmptySnapshot {
        path: path.to_path_buf(),
    })
}

/// Folds per-snapshot maxima into the batch bound.
///
/// `None` for an empty input: there is no bound for zero frames.
pub fn reduce_bound<I>(local_maxima: I) -> Option<NormalizationBound>
where
    I: IntoIterator<Item = f64>,
{
    local_maxima
        .into_iter()
        .reduce(f64::max)
        .map(NormalizationBound::new)
}
