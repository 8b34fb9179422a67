use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use tracing::debug;

use crate::catalog::Snapshot;
use crate::config::{ColormapKind, Origin, RenderConfig};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::painter::{ColorScale, GridPainter, Painter};
use crate::parser::read_values;
use crate::reducer::NormalizationBound;

/// Turns one snapshot into one image next to it.
pub struct Renderer {
    width: usize,
    height: usize,
    scale: Box<dyn ColorScale>,
    origin: Origin,
    cell_size: u32,
    format: ImageFormat,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale: ColormapKind::Viridis.scale(),
            origin: Origin::Lower,
            cell_size: 1,
            format: ImageFormat::Png,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            scale: config.colormap.scale(),
            origin: config.origin,
            cell_size: config.cell_size,
            format: config.image_format,
        }
    }

    pub fn colormap(mut self, colormap: ColormapKind) -> Self {
        self.scale = colormap.scale();
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Reads and reshapes a snapshot, failing on a wrong value count.
    pub fn load(&self, snapshot: &Snapshot) -> Result<Grid> {
        let values = read_values(snapshot.path())?;
        Grid::from_snapshot_values(snapshot.path(), values, self.width, self.height)
    }

    /// Fails with `InvalidConfig` if the image would exceed `u32` pixels on
    /// a side.
    pub fn paint(&self, grid: &Grid, bound: NormalizationBound) -> Result<RgbImage> {
        GridPainter::new(self.scale.as_ref(), bound)
            .origin(self.origin)
            .cell_size(self.cell_size)
            .paint(grid)
    }

    /// Renders `snapshot` with the batch bound and returns the image path.
    ///
    /// Nothing is written unless the whole grid is valid, and the image
    /// replaces any previous one in a single rename.
    pub fn render(&self, snapshot: &Snapshot, bound: NormalizationBound) -> Result<PathBuf> {
        let target = snapshot.image_path(self.format);
        if target == snapshot.path() {
            return Err(Error::InvalidConfig(format!(
                "image for {} would overwrite the snapshot itself",
                snapshot
            )));
        }
        let grid = self.load(snapshot)?;
        let img = self.paint(&grid, bound)?;
        self.write_image(&img, &target)?;
        debug!(snapshot = %snapshot, image = %target.display(), "rendered frame");
        Ok(target)
    }

    fn write_image(&self, img: &RgbImage, target: &Path) -> Result<()> {
        let mut tmp_name = target.as_os_str().to_owned();
        tmp_name.push(".partial");
        let tmp = PathBuf::from(tmp_name);

        if let Err(source) = img.save_with_format(&tmp, self.format) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Image {
                path: target.to_path_buf(),
                source,
            });
        }
        fs::rename(&tmp, target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::io(target, e)
        })
    }
}
