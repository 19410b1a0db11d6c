//! Bounded motion trails.
//!
//! Stores the recent position history of one particle, newest first, with an
//! opacity that fades linearly towards the oldest entry.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::collections::VecDeque;

/// Default number of positions kept per particle.
pub const DEFAULT_TRAIL_CAPACITY: usize = 8;

/// One remembered position.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TrailPoint {
    pub position: Vec2,
    /// 1.0 at the head, decaying linearly with distance from it.
    pub alpha: f32,
}

/// Fixed-capacity ring of recent positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY)
    }
}

impl Trail {
    /// Create an empty trail holding at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `position` as the newest point, evicting the oldest past capacity.
    pub fn push(&mut self, position: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(TrailPoint {
            position,
            alpha: 1.0,
        });
        self.points.truncate(self.capacity);

        let capacity = self.capacity as f32;
        for (age, point) in self.points.iter_mut().enumerate() {
            point.alpha = 1.0 - age as f32 / capacity;
        }
    }

    /// Points from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// The newest point.
    pub fn head(&self) -> Option<&TrailPoint> {
        self.points.front()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}
