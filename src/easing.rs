//! Easing curves for interpolation.
//!
//! An easing reshapes the interpolation parameter `t` inside a segment. It
//! never changes how many frames are sampled or when they occur.

use serde::{Deserialize, Serialize};

/// Reparameterization of `t` over `[0, 1]`.
///
/// Every curve maps 0 to 0 and 1 to 1 and stays inside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// `t` unchanged.
    #[default]
    Linear,
    /// Accelerate through the first half, decelerate through the second.
    QuadInOut,
    /// Decelerate towards the end.
    QuadOut,
    /// Settle into the end value with three decaying bounces.
    Bounce,
}

impl Easing {
    /// Apply the curve to `t` (clamped into `[0, 1]`).
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Bounce => bounce_out(t),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}
