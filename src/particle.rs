//! Shared particle and geometry types.
//!
//! Both the free-running [`ForceField`](crate::ForceField) and the
//! timeline-driven [`AnimationDriver`](crate::AnimationDriver) place their
//! particles inside a fixed rectangular area described by [`Bounds`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::color::ColorToken;

/// One entity rendered as a disc.
///
/// Identity is the entity id; the owning engine never changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Entity id this particle represents.
    pub id: String,
    /// Center in simulation-area coordinates.
    pub position: Vec2,
    /// Displacement per tick.
    pub velocity: Vec2,
    /// Disc radius.
    pub radius: f32,
    /// Fill color.
    pub color: ColorToken,
    /// Z-score of the entity's value.
    pub normalized_value: f32,
}

impl Particle {
    /// Whether `point` lies within `radius + tolerance` of the center.
    #[inline]
    pub fn contains(&self, point: Vec2, tolerance: f32) -> bool {
        self.position.distance(point) <= self.radius + tolerance
    }
}

/// The simulation area: a `size.x` by `size.y` rectangle with its origin at
/// the top-left corner and an inner margin particles are kept out of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    /// Width and height.
    pub size: Vec2,
    /// Distance from each edge that particles may not enter.
    pub margin: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            size: Vec2::new(800.0, 600.0),
            margin: 40.0,
        }
    }
}

impl Bounds {
    /// Create bounds of the given size and margin.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            margin,
        }
    }

    /// Center of the area.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Allowed range for the center of a disc of `radius` on each axis.
    ///
    /// When the area is too small for the disc the range collapses onto
    /// the area's center.
    pub fn containment(&self, radius: f32) -> (Vec2, Vec2) {
        let lo = Vec2::splat(self.margin + radius);
        let hi = self.size - Vec2::splat(self.margin + radius);
        let center = self.center();
        let lo = Vec2::new(
            if lo.x > hi.x { center.x } else { lo.x },
            if lo.y > hi.y { center.y } else { lo.y },
        );
        let hi = hi.max(lo);
        (lo, hi)
    }

    /// Clamp a disc center into the containment range.
    #[inline]
    pub fn clamp(&self, position: Vec2, radius: f32) -> Vec2 {
        let (lo, hi) = self.containment(radius);
        position.clamp(lo, hi)
    }

    /// Position `index` of `count` evenly spaced on a ring around the center.
    ///
    /// `fraction` scales the ring radius relative to the shorter side.
    pub fn ring_position(&self, index: usize, count: usize, fraction: f32) -> Vec2 {
        let ring = self.size.min_element() * fraction;
        let angle = if count == 0 {
            0.0
        } else {
            index as f32 / count as f32 * TAU
        };
        self.center() + Vec2::new(angle.cos(), angle.sin()) * ring
    }
}

/// First particle within `radius + tolerance` of `point`, in iteration order.
pub fn pick<'a, I>(particles: I, point: Vec2, tolerance: f32) -> Option<&'a Particle>
where
    I: IntoIterator<Item = &'a Particle>,
{
    particles.into_iter().find(|p| p.contains(point, tolerance))
}
