//! Value-to-color and value-to-size mapping.
//!
//! Particles are colored by their normalized value. A [`ColorMapper`] turns a
//! z-score and a [`PaletteMode`] into a [`ColorToken`]. The provided
//! [`PaletteColorMapper`] builds one lookup table per palette on first use and
//! keeps it for the lifetime of the mapper.
//!
//! # Usage
//!
//! ```ignore
//! let colors = PaletteColorMapper::default();
//! let up = colors.map(2.5, PaletteMode::Expression);   // red-ish
//! let down = colors.map(-2.5, PaletteMode::Expression); // blue-ish
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Linear RGB color, each channel in `[0, 1]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct ColorToken {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorToken {
    /// Neutral gray used when a value cannot be mapped.
    pub const FALLBACK: ColorToken = ColorToken {
        r: 0.6,
        g: 0.6,
        b: 0.6,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Perceptual lightness approximation (Rec. 709 luma).
    pub fn luma(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl From<Vec3> for ColorToken {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<ColorToken> for Vec3 {
    fn from(c: ColorToken) -> Self {
        Vec3::new(c.r, c.g, c.b)
    }
}

/// Palette selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaletteMode {
    /// Diverging blue-white-red: down-regulated cold, up-regulated warm.
    #[default]
    Expression,
    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,
    /// Magma - perceptually uniform (black to yellow through red).
    Magma,
    /// Plasma - perceptually uniform (purple to yellow through pink).
    Plasma,
    /// Grayscale - black to white.
    Grayscale,
}

impl PaletteMode {
    /// Every palette, in menu order.
    pub const ALL: [PaletteMode; 5] = [
        PaletteMode::Expression,
        PaletteMode::Viridis,
        PaletteMode::Magma,
        PaletteMode::Plasma,
        PaletteMode::Grayscale,
    ];

    /// The five color stops of this palette, low to high.
    pub fn stops(&self) -> [Vec3; 5] {
        match self {
            PaletteMode::Expression => [
                Vec3::new(0.019, 0.188, 0.380), // Deep blue
                Vec3::new(0.263, 0.576, 0.765), // Blue
                Vec3::new(0.969, 0.969, 0.969), // Near white
                Vec3::new(0.839, 0.376, 0.302), // Red
                Vec3::new(0.404, 0.0, 0.051),   // Deep red
            ],
            PaletteMode::Viridis => [
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.458),
                Vec3::new(0.127, 0.566, 0.551),
                Vec3::new(0.369, 0.789, 0.383),
                Vec3::new(0.993, 0.906, 0.144),
            ],
            PaletteMode::Magma => [
                Vec3::new(0.001, 0.0, 0.014),
                Vec3::new(0.329, 0.071, 0.435),
                Vec3::new(0.716, 0.215, 0.475),
                Vec3::new(0.994, 0.541, 0.380),
                Vec3::new(0.987, 0.991, 0.749),
            ],
            PaletteMode::Plasma => [
                Vec3::new(0.050, 0.030, 0.528),
                Vec3::new(0.494, 0.012, 0.658),
                Vec3::new(0.798, 0.280, 0.470),
                Vec3::new(0.973, 0.580, 0.254),
                Vec3::new(0.940, 0.975, 0.131),
            ],
            PaletteMode::Grayscale => [
                Vec3::new(0.1, 0.1, 0.1),
                Vec3::new(0.3, 0.3, 0.3),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(0.95, 0.95, 0.95),
            ],
        }
    }
}

/// Deterministic mapping from a normalized value to a color.
pub trait ColorMapper {
    /// Color for z-score `normalized` under `palette`.
    ///
    /// Non-finite input must yield a fallback color, never panic.
    fn map(&self, normalized: f32, palette: PaletteMode) -> ColorToken;
}

/// Number of entries in a built color scale.
const SCALE_RESOLUTION: usize = 64;

/// Sampled color ramp for one palette.
#[derive(Debug, Clone)]
pub struct ColorScale {
    lut: Vec<ColorToken>,
}

impl ColorScale {
    /// Build a lookup table by linearly blending the palette stops.
    pub fn build(palette: PaletteMode) -> Self {
        let stops = palette.stops();
        let segments = (stops.len() - 1) as f32;
        let lut = (0..SCALE_RESOLUTION)
            .map(|i| {
                let t = i as f32 / (SCALE_RESOLUTION - 1) as f32;
                let scaled = t * segments;
                let idx = (scaled.floor() as usize).min(stops.len() - 2);
                let local = scaled - idx as f32;
                ColorToken::from(stops[idx].lerp(stops[idx + 1], local))
            })
            .collect();
        Self { lut }
    }

    /// Color at position `t` in `[0, 1]` (clamped).
    pub fn sample(&self, t: f32) -> ColorToken {
        let t = t.clamp(0.0, 1.0);
        let idx = (t * (self.lut.len() - 1) as f32).round() as usize;
        self.lut[idx.min(self.lut.len() - 1)]
    }
}

/// Palette-based [`ColorMapper`] with a per-instance scale cache.
///
/// Z-scores are clamped to `[-clamp, clamp]` before lookup so outliers do
/// not wash out the rest of the dataset.
#[derive(Debug)]
pub struct PaletteColorMapper {
    clamp: f32,
    cache: RefCell<HashMap<PaletteMode, ColorScale>>,
}

impl Default for PaletteColorMapper {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl PaletteColorMapper {
    /// Create a mapper clamping z-scores to `[-clamp, clamp]`.
    pub fn new(clamp: f32) -> Self {
        Self {
            clamp: if clamp > 0.0 { clamp } else { 3.0 },
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of palettes built so far.
    pub fn cached_scales(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl ColorMapper for PaletteColorMapper {
    fn map(&self, normalized: f32, palette: PaletteMode) -> ColorToken {
        if !normalized.is_finite() {
            return ColorToken::FALLBACK;
        }
        let t = (normalized.clamp(-self.clamp, self.clamp) + self.clamp) / (2.0 * self.clamp);
        let mut cache = self.cache.borrow_mut();
        cache
            .entry(palette)
            .or_insert_with(|| ColorScale::build(palette))
            .sample(t)
    }
}

/// Maps a normalized value onto a disc radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeMapping {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Z-scores beyond `±clamp` map to the extremes.
    pub clamp: f32,
}

impl Default for SizeMapping {
    fn default() -> Self {
        Self {
            min_radius: 4.0,
            max_radius: 20.0,
            clamp: 3.0,
        }
    }
}

impl SizeMapping {
    /// Radius for z-score `normalized`; non-finite input maps to the midpoint.
    pub fn radius(&self, normalized: f32) -> f32 {
        let clamp = self.clamp.max(f32::EPSILON);
        let t = if normalized.is_finite() {
            (normalized.clamp(-clamp, clamp) + clamp) / (2.0 * clamp)
        } else {
            0.5
        };
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}
