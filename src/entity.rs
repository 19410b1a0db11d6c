//! Measured entities (genes) and dataset normalization.
//!
//! An [`Entity`] is one named measurement as delivered by the ingestion layer.
//! Engines never mutate input entities; they derive [`NormalizedEntity`]
//! values from them once per dataset.
//!
//! # Example
//!
//! ```ignore
//! use genefield::entity::{normalize, Entity};
//!
//! let genes = vec![Entity::new("TP53", 4.2), Entity::new("MYC", 9.8)];
//! let normalized = normalize(&genes);
//! assert_eq!(normalized.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// A named numeric measurement, e.g. a gene and its expression level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier (gene symbol).
    pub id: String,
    /// Raw measured value.
    pub value: f64,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity {
    /// Create an entity without a description.
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An entity plus its position within the dataset it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntity {
    /// The source entity, unchanged.
    pub entity: Entity,
    /// Z-score against the dataset mean and standard deviation.
    pub normalized: f64,
    /// Min-max rescaled value in `[0, 1]`.
    pub percentile: f64,
}

impl NormalizedEntity {
    /// Identifier of the underlying entity.
    #[inline]
    pub fn id(&self) -> &str {
        &self.entity.id
    }
}

/// Population statistics of a dataset.
///
/// Degenerate datasets (one element, zero variance) fall back to
/// `std = 1.0` so z-scores stay finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), or 1.0 when degenerate.
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Number of values.
    pub count: usize,
}

impl Stats {
    /// Compute statistics over a set of values.
    ///
    /// An empty input yields `mean = 0`, `std = 1`, `min = max = 0`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        let count = values.len();
        if count == 0 {
            return Self {
                mean: 0.0,
                std: 1.0,
                min: 0.0,
                max: 0.0,
                count,
            };
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let std = if count > 1 {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let std = if std > 0.0 && std.is_finite() {
            std
        } else {
            log::debug!("degenerate dataset of {count} value(s), using std = 1");
            1.0
        };

        Self {
            mean,
            std,
            min,
            max,
            count,
        }
    }

    /// Statistics over the values of a set of entities.
    pub fn of(entities: &[Entity]) -> Self {
        Self::from_values(entities.iter().map(|e| e.value))
    }

    /// Z-score of `value`.
    #[inline]
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    /// Min-max rescaling of `value` into `[0, 1]`; 0.5 for a flat range.
    #[inline]
    pub fn rescale(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range > f64::EPSILON {
            ((value - self.min) / range).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Normalize a dataset once: z-score and percentile for every entity.
pub fn normalize(entities: &[Entity]) -> Vec<NormalizedEntity> {
    let stats = Stats::of(entities);
    entities
        .iter()
        .map(|e| NormalizedEntity {
            entity: e.clone(),
            normalized: stats.z_score(e.value),
            percentile: stats.rescale(e.value),
        })
        .collect()
}
