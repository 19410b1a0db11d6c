//! Timelines of labeled expression snapshots.
//!
//! A [`Timeline`] is validated once, at construction, and its time points are
//! kept in ascending timestamp order from then on. Deserializing a timeline
//! goes through the same validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::entity::Entity;
use crate::error::{ConfigError, ValidationError};

/// A labeled, timestamped snapshot of entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub id: String,
    pub label: String,
    /// Position on the timeline, in seconds.
    pub timestamp: f64,
    pub entities: Vec<Entity>,
}

impl TimePoint {
    /// Create a time point; entities are kept in the given order.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        timestamp: f64,
        entities: Vec<Entity>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            timestamp,
            entities,
        }
    }
}

/// An ordered sequence of time points plus a playback duration.
///
/// Invariants, established by [`Timeline::new`]:
/// - at least one time point
/// - finite timestamps, unique time point ids
/// - time points sorted by ascending timestamp (ties keep input order)
/// - finite, non-negative duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeline", into = "RawTimeline")]
pub struct Timeline {
    title: String,
    description: String,
    time_points: Vec<TimePoint>,
    total_duration_seconds: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeline {
    title: String,
    #[serde(default)]
    description: String,
    time_points: Vec<TimePoint>,
    total_duration_seconds: f64,
}

impl TryFrom<RawTimeline> for Timeline {
    type Error = ValidationError;

    fn try_from(raw: RawTimeline) -> Result<Self, Self::Error> {
        Timeline::new(
            raw.title,
            raw.description,
            raw.time_points,
            raw.total_duration_seconds,
        )
    }
}

impl From<Timeline> for RawTimeline {
    fn from(t: Timeline) -> Self {
        Self {
            title: t.title,
            description: t.description,
            time_points: t.time_points,
            total_duration_seconds: t.total_duration_seconds,
        }
    }
}

impl Timeline {
    /// Validate and build a timeline. Time points may arrive in any order.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        mut time_points: Vec<TimePoint>,
        total_duration_seconds: f64,
    ) -> Result<Self, ValidationError> {
        if time_points.is_empty() {
            return Err(ValidationError::EmptyTimeline);
        }
        if !total_duration_seconds.is_finite() || total_duration_seconds < 0.0 {
            return Err(ValidationError::InvalidDuration(total_duration_seconds));
        }

        let mut seen = HashSet::with_capacity(time_points.len());
        for tp in &time_points {
            if !tp.timestamp.is_finite() {
                return Err(ValidationError::NonFiniteTimestamp { id: tp.id.clone() });
            }
            if !seen.insert(tp.id.as_str()) {
                return Err(ValidationError::DuplicateTimePoint { id: tp.id.clone() });
            }
        }

        time_points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Ok(Self {
            title: title.into(),
            description: description.into(),
            time_points,
            total_duration_seconds,
        })
    }

    /// Load and validate a timeline from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let timeline = serde_json::from_str(&json)?;
        Ok(timeline)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Time points in ascending timestamp order.
    pub fn time_points(&self) -> &[TimePoint] {
        &self.time_points
    }

    /// Playback duration in seconds.
    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    /// The time point with the latest timestamp.
    pub fn last(&self) -> &TimePoint {
        // Non-empty by construction.
        &self.time_points[self.time_points.len() - 1]
    }

    /// Every distinct entity id across all time points, in first-seen order.
    pub fn distinct_entity_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.time_points
            .iter()
            .flat_map(|tp| tp.entities.iter())
            .map(|e| e.id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// First occurrence of entity `id`, scanning time points in order.
    pub fn first_entity(&self, id: &str) -> Option<&Entity> {
        self.time_points
            .iter()
            .flat_map(|tp| tp.entities.iter())
            .find(|e| e.id == id)
    }
}

/// One sampled, possibly interpolated, snapshot of a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame<'a> {
    /// Frame number within its sample.
    pub index: usize,
    /// Playback time in seconds.
    pub time: f64,
    /// Start of the bracketing segment, or the last time point for terminal frames.
    pub reference: &'a TimePoint,
    /// Raw progress through the bracketing segment, in `[0, 1]`.
    pub progress: f64,
    /// One entry per distinct id across the bracketing time points.
    pub entities: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(id: &str, ts: f64, genes: &[(&str, f64)]) -> TimePoint {
        TimePoint::new(
            id,
            id.to_uppercase(),
            ts,
            genes.iter().map(|&(g, v)| Entity::new(g, v)).collect(),
        )
    }

    #[test]
    fn test_sorts_by_timestamp() {
        let t = Timeline::new(
            "t",
            "",
            vec![tp("c", 20.0, &[]), tp("a", 0.0, &[]), tp("b", 10.0, &[])],
            20.0,
        )
        .unwrap();
        let ids: Vec<&str> = t.time_points().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(t.last().id, "c");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            Timeline::new("t", "", vec![], 1.0),
            Err(ValidationError::EmptyTimeline)
        );
    }

    #[test]
    fn test_rejects_non_finite_timestamp() {
        let err = Timeline::new("t", "", vec![tp("a", f64::NAN, &[])], 1.0).unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteTimestamp { id: "a".into() });
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err =
            Timeline::new("t", "", vec![tp("a", 0.0, &[]), tp("a", 1.0, &[])], 1.0).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateTimePoint { id: "a".into() });
    }

    #[test]
    fn test_rejects_bad_duration() {
        let err = Timeline::new("t", "", vec![tp("a", 0.0, &[])], -1.0).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDuration(-1.0));
    }

    #[test]
    fn test_distinct_ids_first_seen_order() {
        let t = Timeline::new(
            "t",
            "",
            vec![
                tp("b", 5.0, &[("Y", 1.0), ("Z", 2.0)]),
                tp("a", 0.0, &[("X", 1.0), ("Y", 2.0)]),
            ],
            5.0,
        )
        .unwrap();
        assert_eq!(t.distinct_entity_ids(), vec!["X", "Y", "Z"]);
        assert_eq!(t.first_entity("Y").map(|e| e.value), Some(2.0));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "title": "Heat shock",
            "timePoints": [
                { "id": "t1", "label": "1h", "timestamp": 1.0, "entities": [{ "id": "HSPA1A", "value": 3.0 }] },
                { "id": "t0", "label": "0h", "timestamp": 0.0, "entities": [] }
            ],
            "totalDurationSeconds": 4.0
        }"#;
        let t: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(t.time_points()[0].id, "t0");
        assert_eq!(t.description(), "");

        let empty = r#"{ "title": "x", "timePoints": [], "totalDurationSeconds": 1.0 }"#;
        let err = serde_json::from_str::<Timeline>(empty).unwrap_err();
        assert!(err.to_string().contains("no time points"));
    }
}
