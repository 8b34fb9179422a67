use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::ImageFormat;

use crate::catalog::SnapshotPattern;
use crate::error::{Error, Result};
use crate::painter::{ColorScale, Greyscale, Rainbow, Viridis};

/// Which image row grid row 0 lands on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 at the bottom, like a pseudo-colour mesh plot.
    Lower,
    /// Row 0 at the top, like a matrix printout.
    Upper,
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            _ => Err(Error::InvalidConfig(format!("unknown origin '{}'", s))),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColormapKind {
    Viridis,
    Greyscale,
    Rainbow,
}

impl ColormapKind {
    pub fn scale(&self) -> Box<dyn ColorScale> {
        match self {
            Self::Viridis => Box::new(Viridis),
            Self::Greyscale => Box::new(Greyscale),
            Self::Rainbow => Box::new(Rainbow),
        }
    }
}

impl FromStr for ColormapKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "greyscale" | "grayscale" | "grey" | "gray" => Ok(Self::Greyscale),
            "rainbow" => Ok(Self::Rainbow),
            _ => Err(Error::InvalidConfig(format!("unknown colormap '{}'", s))),
        }
    }
}

/// File extension for the lossless RGB formats frames can be written as.
pub fn image_extension(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Bmp => Some("bmp"),
        ImageFormat::Tiff => Some("tiff"),
        ImageFormat::Pnm => Some("ppm"),
        _ => None,
    }
}

/// Everything one batch run needs. Built by the CLI or directly by callers.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub input_dir: PathBuf,
    pub width: usize,
    pub height: usize,
    /// Worker count. 0 runs every task inline on the calling thread.
    pub threads: usize,
    pub pattern: SnapshotPattern,
    pub image_format: ImageFormat,
    pub colormap: ColormapKind,
    pub origin: Origin,
    /// Edge length in pixels of the square block painted per grid cell.
    pub cell_size: u32,
}

impl RenderConfig {
    pub fn new<P: AsRef<Path>>(input_dir: P, width: usize, height: usize) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            width,
            height,
            threads: num_cpus::get(),
            pattern: SnapshotPattern::default(),
            image_format: ImageFormat::Png,
            colormap: ColormapKind::Viridis,
            origin: Origin::Lower,
            cell_size: 1,
        }
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn pattern(mut self, pattern: SnapshotPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    pub fn colormap(mut self, colormap: ColormapKind) -> Self {
        self.colormap = colormap;
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

    /// Number of values every snapshot must hold.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.cell_size == 0 {
            return Err(Error::InvalidConfig("cell size must be positive".into()));
        }
        let too_large = |n: usize| {
            (n as u64)
                .checked_mul(self.cell_size as u64)
                .map_or(true, |px| px > u32::MAX as u64)
        };
        if too_large(self.width) || too_large(self.height) {
            return Err(Error::InvalidConfig(format!(
                "image of {}x{} cells at cell size {} is too large",
                self.height, self.width, self.cell_size
            )));
        }
        let image_ext = image_extension(self.image_format).ok_or_else(|| {
            Error::InvalidConfig(format!("unsupported image format {:?}", self.image_format))
        })?;
        if self.pattern.suffix().eq_ignore_ascii_case(image_ext) {
            return Err(Error::InvalidConfig(format!(
                "snapshot extension '{}' would be overwritten by the rendered images",
                self.pattern.suffix()
            )));
        }
        Ok(())
    }
}
