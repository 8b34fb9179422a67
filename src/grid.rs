use std::path::Path;

use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};

/// A snapshot reshaped to `width` rows by `height` columns, row-major.
///
/// Flat index `k` lands at `(k / height, k % height)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cells: Array2<f64>,
}

impl Grid {
    pub fn from_values(values: Vec<f64>, width: usize, height: usize) -> Result<Self> {
        Self::from_snapshot_values(Path::new(""), values, width, height)
    }

    /// Same as `from_values`, but a shape error names `path`.
    pub fn from_snapshot_values(
        path: &Path,
        values: Vec<f64>,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let expected = width * height;
        let actual = values.len();
        if actual != expected {
            return Err(Error::ShapeMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        let cells = Array2::from_shape_vec((width, height), values).map_err(|_| {
            Error::ShapeMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            }
        })?;
        Ok(Self { cells })
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[[row, col]]
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.cells.row(row)
    }

    pub fn cells(&self) -> &Array2<f64> {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_2x2() {
        let g = Grid::from_values(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(g.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(g.row(1).to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_row_major_law() {
        let (width, height) = (3, 5);
        let values: Vec<f64> = (0..width * height).map(|k| k as f64).collect();
        let g = Grid::from_values(values, width, height).unwrap();
        assert_eq!(g.rows(), width);
        assert_eq!(g.cols(), height);
        for r in 0..width {
            for c in 0..height {
                assert_eq!(g.get(r, c), (r * height + c) as f64);
            }
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Grid::from_snapshot_values(Path::new("f.csv"), vec![1.0, 2.0, 3.0], 2, 2)
            .unwrap_err();
        match err {
            Error::ShapeMismatch {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, Path::new("f.csv"));
                assert_eq!((expected, actual), (4, 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
