//! Discrete-to-continuous timeline sampling.
//!
//! [`TimelineSampler`] turns a [`Timeline`] and a frame rate into a finite
//! sequence of [`AnimationFrame`]s. Sampling is a pure function of its
//! inputs: frames are computed on demand, nothing is cached between calls,
//! and calling [`sample`](TimelineSampler::sample) again restarts from the
//! first frame.
//!
//! # Frame timing
//!
//! A sample of `n = ceil(duration * fps)` frames places frame `k` at
//! `k / n * duration` seconds, so the first frame sits on the start of the
//! timeline. Frames past the last timestamp, and always the final frame of
//! the sample, are terminal: the last time point's raw entities with
//! `progress == 1`.

use std::collections::HashMap;

use crate::easing::Easing;
use crate::entity::Entity;
use crate::error::ValidationError;
use crate::timeline::{AnimationFrame, Timeline, TimePoint};

/// Samples timelines at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSampler {
    fps: f64,
    easing: Easing,
}

impl TimelineSampler {
    /// Create a sampler producing `fps` frames per second of playback.
    pub fn new(fps: f64) -> Result<Self, ValidationError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ValidationError::InvalidFrameRate(fps));
        }
        Ok(Self {
            fps,
            easing: Easing::Linear,
        })
    }

    /// Use `easing` to reshape interpolation inside each segment.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Easing applied to segment progress.
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Number of frames in a sample of `timeline`.
    pub fn frame_count(&self, timeline: &Timeline) -> usize {
        let frames = (timeline.total_duration_seconds() * self.fps).ceil();
        if frames.is_finite() && frames > 0.0 {
            frames as usize
        } else {
            0
        }
    }

    /// Playback time of frame `index`.
    pub fn frame_time(&self, timeline: &Timeline, index: usize) -> f64 {
        let count = self.frame_count(timeline);
        let duration = timeline.total_duration_seconds();
        if count == 0 {
            duration
        } else {
            index.min(count - 1) as f64 / count as f64 * duration
        }
    }

    /// Compute frame `index` (clamped to the last frame).
    pub fn frame_at<'a>(&self, timeline: &'a Timeline, index: usize) -> AnimationFrame<'a> {
        let count = self.frame_count(timeline);
        let index = index.min(count.saturating_sub(1));
        let time = self.frame_time(timeline, index);
        let points = timeline.time_points();
        let last = timeline.last();

        if index + 1 >= count || points.len() == 1 || time > last.timestamp {
            return terminal(index, time, last);
        }

        // First segment whose end is at or after `time`; times before the
        // first timestamp hold the first segment at progress 0.
        let segment = points
            .windows(2)
            .position(|pair| time <= pair[1].timestamp)
            .unwrap_or(points.len() - 2);
        let start = &points[segment];
        let end = &points[segment + 1];

        let span = end.timestamp - start.timestamp;
        let progress = if span > 0.0 {
            ((time - start.timestamp) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        AnimationFrame {
            index,
            time,
            reference: start,
            progress,
            entities: lerp_entities(&start.entities, &end.entities, self.easing.apply(progress)),
        }
    }

    /// Lazily sample every frame of `timeline`.
    pub fn sample<'a>(&self, timeline: &'a Timeline) -> Frames<'a> {
        Frames {
            sampler: *self,
            timeline,
            next: 0,
            count: self.frame_count(timeline),
        }
    }
}

fn terminal(index: usize, time: f64, last: &TimePoint) -> AnimationFrame<'_> {
    AnimationFrame {
        index,
        time,
        reference: last,
        progress: 1.0,
        entities: last.entities.clone(),
    }
}

/// Iterator over the frames of one sample.
///
/// Cloning it yields an independent cursor over the same frames.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    sampler: TimelineSampler,
    timeline: &'a Timeline,
    next: usize,
    count: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = AnimationFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let frame = self.sampler.frame_at(self.timeline, self.next);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Interpolate two entity sets at parameter `t`.
///
/// The result holds the union of ids: `a`'s ids in `a`'s order, then ids only
/// present in `b`. Ids on both sides blend linearly; ids on one side only pass
/// through unchanged. Descriptions prefer the earlier side.
pub fn lerp_entities(a: &[Entity], b: &[Entity], t: f64) -> Vec<Entity> {
    let later: HashMap<&str, &Entity> = b.iter().map(|e| (e.id.as_str(), e)).collect();
    let earlier: HashMap<&str, &Entity> = a.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut out = Vec::with_capacity(a.len().max(b.len()));
    for from in a {
        match later.get(from.id.as_str()) {
            Some(to) => out.push(Entity {
                id: from.id.clone(),
                value: from.value + (to.value - from.value) * t,
                description: from.description.clone().or_else(|| to.description.clone()),
            }),
            None => out.push(from.clone()),
        }
    }
    out.extend(
        b.iter()
            .filter(|e| !earlier.contains_key(e.id.as_str()))
            .cloned(),
    );
    out
}
