//! # genefield - Gene Expression Particle Field
//!
//! Visualizes gene-expression datasets as self-organizing particle fields and
//! morphs timelines of expression snapshots into smooth animations.
//!
//! genefield owns the dynamics (forces, sampling, smoothing, trails) and
//! leaves drawing to the host: each engine hands out a read-only
//! [`Snapshot`] per tick and answers hit-tests for pointer coordinates.
//!
//! ## Quick Start
//!
//! ```ignore
//! use genefield::prelude::*;
//!
//! let timeline = Timeline::load("heat_shock.json")?;
//! let pathways = PathwayTable::load("pathways.json")?;
//!
//! let mut driver = AnimationDriver::new(
//!     timeline,
//!     Bounds::new(800.0, 600.0, 40.0),
//!     AnimationConfig::default(),
//!     pathways,
//!     PaletteColorMapper::default(),
//! )?;
//! driver.play();
//!
//! let mut clock = FrameClock::new(driver.config().fps);
//! loop {
//!     for _ in 0..clock.update() {
//!         driver.tick();
//!     }
//!     draw(&driver.snapshot());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Force field
//!
//! [`ForceField`] is the free-running "art" view: every gene is a disc,
//! crowded discs repel, discs sharing a pathway attract weakly and are joined
//! by fading connectors. Motion decays to rest when nothing pushes.
//!
//! ### Timelines
//!
//! A [`Timeline`] is an ordered set of labeled [`TimePoint`] snapshots.
//! [`TimelineSampler`] turns it into a finite, restartable sequence of
//! [`AnimationFrame`]s at a fixed frame rate, linearly interpolating (with an
//! optional [`Easing`]) between bracketing snapshots.
//!
//! ### Animation
//!
//! [`AnimationDriver`] consumes one frame per tick and eases a population of
//! [`AnimatedParticle`]s towards each frame's values, nudging related genes
//! towards each other and recording short motion [`Trail`]s.
//!
//! ## Collaborators
//!
//! | Seam | Trait | Provided |
//! |------|-------|----------|
//! | Relatedness | [`RelatednessOracle`] | [`PathwayTable`], [`Unrelated`], closures |
//! | Coloring | [`ColorMapper`] | [`PaletteColorMapper`] |
//!
//! ## Logging
//!
//! genefield logs through the [`log`] facade and never installs a logger.

pub mod clock;
pub mod color;
pub mod config;
pub mod driver;
pub mod easing;
pub mod entity;
pub mod error;
pub mod force;
pub mod oracle;
pub mod particle;
pub mod sampler;
pub mod snapshot;
pub mod timeline;
pub mod trail;

pub use bytemuck;
pub use clock::FrameClock;
pub use color::{ColorMapper, ColorScale, ColorToken, PaletteColorMapper, PaletteMode, SizeMapping};
pub use config::EngineConfig;
pub use driver::{AnimatedParticle, AnimationConfig, AnimationDriver, PlaybackState};
pub use easing::Easing;
pub use entity::{normalize, Entity, NormalizedEntity, Stats};
pub use error::{ConfigError, ValidationError};
pub use force::{Connector, ForceConfig, ForceField};
pub use glam::Vec2;
pub use oracle::{PathwayTable, RelatednessOracle, Unrelated};
pub use particle::{Bounds, Particle};
pub use sampler::{lerp_entities, Frames, TimelineSampler};
pub use snapshot::{ConnectorVertex, ParticleInstance, Snapshot, TrailVertex};
pub use timeline::{AnimationFrame, TimePoint, Timeline};
pub use trail::{Trail, TrailPoint};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use genefield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::FrameClock;
    pub use crate::color::{ColorMapper, PaletteColorMapper, PaletteMode};
    pub use crate::config::EngineConfig;
    pub use crate::driver::{AnimationConfig, AnimationDriver, PlaybackState};
    pub use crate::easing::Easing;
    pub use crate::entity::{normalize, Entity};
    pub use crate::force::{ForceConfig, ForceField};
    pub use crate::oracle::{PathwayTable, RelatednessOracle, Unrelated};
    pub use crate::particle::Bounds;
    pub use crate::sampler::TimelineSampler;
    pub use crate::snapshot::Snapshot;
    pub use crate::timeline::{TimePoint, Timeline};
    pub use crate::Vec2;
}
