use image::{Rgb, RgbImage};
use lazy_static::lazy_static;

use crate::config::Origin;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::reducer::NormalizationBound;

/// Maps a normalized value in `[0, 1]` to a colour.
pub trait ColorScale: Send + Sync {
    fn color(&self, t: f64) -> Rgb<u8>;
}

fn mix(a: u8, b: u8, frac: f64) -> u8 {
    let af = a as f64;
    let bf = b as f64;
    let m = af * (1.0 - frac) + bf * frac;
    f64::round(m) as u8
}

fn mix_rgb(a: [u8; 3], b: [u8; 3], frac: f64) -> Rgb<u8> {
    Rgb([
        mix(a[0], b[0], frac),
        mix(a[1], b[1], frac),
        mix(a[2], b[2], frac),
    ])
}

/// Piecewise-linear lookup over evenly spaced anchor colours.
fn interpolate(anchors: &[[u8; 3]], t: f64) -> Rgb<u8> {
    let segments = anchors.len() - 1;
    let pos = t.clamp(0.0, 1.0) * segments as f64;
    let n = (pos.floor() as usize).min(segments - 1);
    mix_rgb(anchors[n], anchors[n + 1], pos - n as f64)
}

const VIRIDIS_ANCHORS: [[u8; 3]; 9] = [
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xfd, 0xe7, 0x25],
];

const LUT_SIZE: usize = 256;

lazy_static! {
    static ref VIRIDIS_LUT: Vec<Rgb<u8>> = (0..LUT_SIZE)
        .map(|i| interpolate(&VIRIDIS_ANCHORS, i as f64 / (LUT_SIZE - 1) as f64))
        .collect();
}

/// Perceptually uniform dark-violet to yellow map. Lightness rises with `t`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Viridis;

impl ColorScale for Viridis {
    fn color(&self, t: f64) -> Rgb<u8> {
        let i = (t.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f64).round() as usize;
        VIRIDIS_LUT[i]
    }
}

/// Black at 0, white at 1.
#[derive(Copy, Clone, Debug, Default)]
pub struct Greyscale;

impl ColorScale for Greyscale {
    fn color(&self, t: f64) -> Rgb<u8> {
        let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb([v, v, v])
    }
}

const RAINBOW_ANCHORS: [[u8; 3]; 10] = [
    [0xbe, 0x0a, 0xff],
    [0x58, 0x0a, 0xff],
    [0x14, 0x7d, 0xf5],
    [0x0a, 0xef, 0xff],
    [0x0a, 0xff, 0x99],
    [0xa1, 0xff, 0x0a],
    [0xde, 0xff, 0x0a],
    [0xff, 0xd3, 0x00],
    [0xff, 0x87, 0x00],
    [0xff, 0x00, 0x00],
];

/// Violet through red. Not perceptually ordered, but easy on the eye for
/// spotting fronts.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rainbow;

impl ColorScale for Rainbow {
    fn color(&self, t: f64) -> Rgb<u8> {
        interpolate(&RAINBOW_ANCHORS, t)
    }
}

pub trait Painter {
    fn paint(&self, grid: &Grid) -> Result<RgbImage>;
}

/// Paints grid cells through one shared bound and colour scale.
pub struct GridPainter<'a> {
    scale: &'a dyn ColorScale,
    bound: NormalizationBound,
    origin: Origin,
    cell_size: u32,
}

impl<'a> GridPainter<'a> {
    pub fn new(scale: &'a dyn ColorScale, bound: NormalizationBound) -> Self {
        Self {
            scale,
            bound,
            origin: Origin::Lower,
            cell_size: 1,
        }
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    pub fn cell_color(&self, value: f64) -> Rgb<u8> {
        self.scale.color(self.bound.normalize(value))
    }

    /// Pixel `(width, height)` of the image for `grid`, or `None` if either
    /// side does not fit in a `u32`.
    pub fn image_size(&self, grid: &Grid) -> Option<(u32, u32)> {
        let rows = u32::try_from(grid.rows()).ok()?;
        let cols = u32::try_from(grid.cols()).ok()?;
        Some((
            cols.checked_mul(self.cell_size)?,
            rows.checked_mul(self.cell_size)?,
        ))
    }
}

impl Painter for GridPainter<'_> {
    fn paint(&self, grid: &Grid) -> Result<RgbImage> {
        let (w, h) = self.image_size(grid).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "image of {}x{} cells at cell size {} is too large",
                grid.rows(),
                grid.cols(),
                self.cell_size
            ))
        })?;
        let rows = grid.rows() as u32;
        let cols = grid.cols() as u32;
        let cell = self.cell_size;

        let mut img = RgbImage::new(w, h);
        for row in 0..rows {
            let y0 = match self.origin {
                Origin::Upper => row * cell,
                Origin::Lower => (rows - 1 - row) * cell,
            };
            for col in 0..cols {
                let color = self.cell_color(grid.get(row as usize, col as usize));
                let x0 = col * cell;
                for y in y0..y0 + cell {
                    for x in x0..x0 + cell {
                        img.put_pixel(x, y, color);
                    }
                }
            }
        }
        Ok(img)
    }
}
