//! Read-only view of a particle population for the presentation layer.
//!
//! A [`Snapshot`] is an owned copy of everything needed to draw one tick:
//! per-particle instances, trail vertices and connector line segments. The
//! vertex types are `#[repr(C)]` and [`Pod`], so each list can be uploaded to
//! a vertex buffer as-is via [`bytemuck::cast_slice`].
//!
//! ```ignore
//! let snapshot = driver.snapshot();
//! queue.write_buffer(&instance_buffer, 0, snapshot.instance_bytes());
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Serialize;

use crate::color::{ColorMapper, ColorToken};
use crate::driver::AnimationDriver;
use crate::force::ForceField;
use crate::oracle::RelatednessOracle;
use crate::particle::Particle;

/// One disc to draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    pub position: Vec2,
    pub radius: f32,
    pub color: ColorToken,
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position,
            radius: p.radius,
            color: p.color,
        }
    }
}

/// One point of a fading trail, tinted with its particle's color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct TrailVertex {
    pub position: Vec2,
    pub alpha: f32,
    pub color: ColorToken,
}

/// One end of a connector line; connectors come in consecutive pairs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct ConnectorVertex {
    pub position: Vec2,
    pub opacity: f32,
}

/// Owned, immutable copy of a population's drawable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    ids: Vec<String>,
    instances: Vec<ParticleInstance>,
    /// Start offset of each particle's trail in `trails`, plus a final end offset.
    trail_offsets: Vec<u32>,
    trails: Vec<TrailVertex>,
    connectors: Vec<ConnectorVertex>,
}

impl Snapshot {
    /// Entity ids, parallel to [`instances`](Self::instances).
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// All trail vertices, newest first within each particle.
    pub fn trails(&self) -> &[TrailVertex] {
        &self.trails
    }

    /// Trail vertices of particle `index`.
    pub fn trail_of(&self, index: usize) -> &[TrailVertex] {
        match (self.trail_offsets.get(index), self.trail_offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => &self.trails[start as usize..end as usize],
            _ => &[],
        }
    }

    /// Connector line segments as vertex pairs.
    pub fn connectors(&self) -> &[ConnectorVertex] {
        &self.connectors
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance data as raw bytes.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Trail vertex data as raw bytes.
    pub fn trail_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.trails)
    }

    /// Connector vertex data as raw bytes.
    pub fn connector_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.connectors)
    }
}

impl<O, C> ForceField<O, C>
where
    O: RelatednessOracle,
    C: ColorMapper,
{
    /// Copy the drawable state after the most recent step.
    pub fn snapshot(&self) -> Snapshot {
        let particles = self.particles();
        let connectors = self
            .connectors()
            .iter()
            .flat_map(|c| {
                [
                    ConnectorVertex {
                        position: particles[c.a].position,
                        opacity: c.opacity,
                    },
                    ConnectorVertex {
                        position: particles[c.b].position,
                        opacity: c.opacity,
                    },
                ]
            })
            .collect();

        Snapshot {
            ids: particles.iter().map(|p| p.id.clone()).collect(),
            instances: particles.iter().map(ParticleInstance::from).collect(),
            trail_offsets: vec![0; particles.len() + 1],
            trails: Vec::new(),
            connectors,
        }
    }
}

impl<O, C> AnimationDriver<O, C>
where
    O: RelatednessOracle,
    C: ColorMapper,
{
    /// Copy the drawable state after the most recent tick.
    pub fn snapshot(&self) -> Snapshot {
        let particles = self.particles();
        let mut trail_offsets = Vec::with_capacity(particles.len() + 1);
        let mut trails = Vec::new();

        for p in particles {
            trail_offsets.push(trails.len() as u32);
            trails.extend(p.trail.iter().map(|t| TrailVertex {
                position: t.position,
                alpha: t.alpha,
                color: p.particle.color,
            }));
        }
        trail_offsets.push(trails.len() as u32);

        Snapshot {
            ids: particles.iter().map(|p| p.particle.id.clone()).collect(),
            instances: particles
                .iter()
                .map(|p| ParticleInstance::from(&p.particle))
                .collect(),
            trail_offsets,
            trails,
            connectors: Vec::new(),
        }
    }
}
