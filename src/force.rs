//! Free-running, pathway-biased particle field.
//!
//! Every entity becomes a disc. Each [`step`](ForceField::step) applies three
//! things, in order:
//!
//! 1. **Containment** - discs leaving the inner margin bounce back, losing energy.
//! 2. **Pairwise forces** - every pair repels when crowded; pairs the
//!    [`RelatednessOracle`] reports as related also attract weakly at mid range
//!    and are recorded as [`Connector`]s for the presentation layer.
//! 3. **Integration** - `position += velocity`, then velocity is damped so
//!    motion decays to rest when nothing pushes.
//!
//! The force model is a visual heuristic, not an N-body solver. Attraction is
//! kept two to three orders of magnitude weaker than peak repulsion so related
//! discs drift together without collapsing through each other.
//!
//! # Example
//!
//! ```ignore
//! let mut field = ForceField::new(
//!     Bounds::new(800.0, 600.0, 40.0),
//!     ForceConfig::default(),
//!     pathways,
//!     PaletteColorMapper::default(),
//! );
//! field.update(&normalize(&genes));
//! loop {
//!     field.step();
//!     draw(field.snapshot());
//! }
//! ```

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::{ColorMapper, PaletteMode};
use crate::entity::NormalizedEntity;
use crate::oracle::RelatednessOracle;
use crate::particle::{pick, Bounds, Particle};

/// Tuning constants for the force field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Smallest disc radius.
    pub min_radius: f32,
    /// Largest disc radius.
    pub max_radius: f32,
    /// Pairs closer than this always repel.
    pub min_separation: f32,
    /// Extra clearance added to the sum of radii for repulsion and attraction.
    pub repulsion_margin: f32,
    /// Repulsion scale; the force is `strength * (threshold - d) / d`.
    pub repulsion_strength: f32,
    /// Attraction scale; the force is `strength * max_attraction_distance / d`.
    pub attraction_strength: f32,
    /// Related pairs farther apart than this do not attract.
    pub max_attraction_distance: f32,
    /// Velocity multiplier applied every tick (< 1).
    pub damping: f32,
    /// Fraction of speed kept when bouncing off the margin.
    pub wall_restitution: f32,
    /// Initial velocity components are drawn from `[-initial_speed, initial_speed]`.
    pub initial_speed: f32,
    /// Extra distance beyond the radius that still counts as a hit.
    pub pick_tolerance: f32,
    /// Radius of the initial placement ring as a fraction of the shorter side.
    pub layout_fraction: f32,
    /// Opacity of a connector between touching related discs.
    pub connector_opacity: f32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            min_radius: 6.0,
            max_radius: 28.0,
            min_separation: 60.0,
            repulsion_margin: 10.0,
            repulsion_strength: 0.05,
            attraction_strength: 0.001,
            max_attraction_distance: 300.0,
            damping: 0.95,
            wall_restitution: 0.8,
            initial_speed: 0.5,
            pick_tolerance: 4.0,
            layout_fraction: 0.35,
            connector_opacity: 0.6,
            seed: None,
        }
    }
}

/// A line to draw between two attracting related particles.
///
/// `a` and `b` index into [`ForceField::particles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    /// Lower particle index of the pair.
    pub a: usize,
    /// Higher particle index of the pair.
    pub b: usize,
    /// Fades linearly to zero at the maximum attraction distance.
    pub opacity: f32,
}

/// Particle population driven by repulsion, pathway attraction and containment.
pub struct ForceField<O, C> {
    bounds: Bounds,
    config: ForceConfig,
    palette: PaletteMode,
    oracle: O,
    colors: C,
    particles: Vec<Particle>,
    connectors: Vec<Connector>,
    rng: SmallRng,
}

impl<O, C> ForceField<O, C>
where
    O: RelatednessOracle,
    C: ColorMapper,
{
    /// Create an empty field over `bounds`.
    pub fn new(bounds: Bounds, config: ForceConfig, oracle: O, colors: C) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            bounds,
            config,
            palette: PaletteMode::default(),
            oracle,
            colors,
            particles: Vec::new(),
            connectors: Vec::new(),
            rng,
        }
    }

    /// Set the palette used for particle colors.
    pub fn with_palette(mut self, palette: PaletteMode) -> Self {
        self.palette = palette;
        self
    }

    /// Reconcile the population with `entities`.
    ///
    /// If the ids match the current population exactly (same ids, same
    /// order), only color and normalized value are refreshed and motion is
    /// untouched. Otherwise the population is rebuilt on a ring.
    pub fn update(&mut self, entities: &[NormalizedEntity]) {
        let same_ids = self.particles.len() == entities.len()
            && self
                .particles
                .iter()
                .zip(entities)
                .all(|(p, e)| p.id == e.entity.id);

        if same_ids {
            let palette = self.palette;
            for (particle, entity) in self.particles.iter_mut().zip(entities) {
                particle.normalized_value = entity.normalized as f32;
                particle.color = self.colors.map(particle.normalized_value, palette);
            }
            return;
        }

        self.rebuild(entities);
    }

    fn rebuild(&mut self, entities: &[NormalizedEntity]) {
        log::debug!(
            "rebuilding force field population: {} -> {} particles",
            self.particles.len(),
            entities.len()
        );

        let (lo, hi) = entities
            .iter()
            .map(|e| e.normalized)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let range = hi - lo;

        let count = entities.len();
        let cfg = &self.config;
        let speed = cfg.initial_speed.abs();
        let mut particles = Vec::with_capacity(count);

        for (index, entity) in entities.iter().enumerate() {
            let ratio = if range.is_finite() && range > f64::EPSILON {
                ((entity.normalized - lo) / range) as f32
            } else {
                0.5
            };
            let radius = cfg
                .min_radius
                .max(cfg.min_radius + ratio * (cfg.max_radius - cfg.min_radius));

            let velocity = if speed > 0.0 {
                Vec2::new(
                    self.rng.gen_range(-speed..=speed),
                    self.rng.gen_range(-speed..=speed),
                )
            } else {
                Vec2::ZERO
            };

            let ring = self.bounds.ring_position(index, count, cfg.layout_fraction);
            let normalized_value = entity.normalized as f32;

            particles.push(Particle {
                id: entity.entity.id.clone(),
                position: self.bounds.clamp(ring, radius),
                velocity,
                radius,
                color: self.colors.map(normalized_value, self.palette),
                normalized_value,
            });
        }

        self.particles = particles;
        self.connectors.clear();
    }

    /// Advance the simulation by one tick.
    ///
    /// A no-op on an empty population.
    pub fn step(&mut self) {
        self.connectors.clear();
        if self.particles.is_empty() {
            return;
        }

        let restitution = self.config.wall_restitution;
        for particle in &mut self.particles {
            contain(particle, &self.bounds, restitution);
        }

        self.apply_pair_forces();

        let damping = self.config.damping;
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.velocity *= damping;
        }
    }

    fn apply_pair_forces(&mut self) {
        let cfg = &self.config;
        let count = self.particles.len();

        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.particles.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                let delta = a.position - b.position;
                let raw = delta.length();
                let distance = raw.max(1.0);
                // Direction from b towards a; coincident pairs get a fixed
                // per-pair direction so they still separate.
                let dir = if raw > f32::EPSILON {
                    delta / raw
                } else {
                    Vec2::from_angle((i * 31 + j * 17) as f32)
                };

                let contact = a.radius + b.radius + cfg.repulsion_margin;
                let threshold = cfg.min_separation.max(contact);

                if distance < threshold {
                    let magnitude = cfg.repulsion_strength * (threshold - distance) / distance;
                    a.velocity += dir * magnitude;
                    b.velocity -= dir * magnitude;
                }

                if distance > contact
                    && distance < cfg.max_attraction_distance
                    && self.oracle.are_related(&a.id, &b.id)
                {
                    let magnitude =
                        cfg.attraction_strength * cfg.max_attraction_distance / distance;
                    a.velocity -= dir * magnitude;
                    b.velocity += dir * magnitude;

                    self.connectors.push(Connector {
                        a: i,
                        b: j,
                        opacity: cfg.connector_opacity
                            * (1.0 - distance / cfg.max_attraction_distance),
                    });
                }
            }
        }

        log::trace!(
            "force step: {} particles, {} connectors",
            count,
            self.connectors.len()
        );
    }

    /// First particle within `radius + pick_tolerance` of `(x, y)`.
    pub fn find_at(&self, x: f32, y: f32) -> Option<&Particle> {
        pick(&self.particles, Vec2::new(x, y), self.config.pick_tolerance)
    }

    /// Move particle `id` to `position` (clamped into bounds) and stop it.
    ///
    /// Returns `false` if no particle has that id.
    pub fn place(&mut self, id: &str, position: Vec2) -> bool {
        match self.particles.iter_mut().find(|p| p.id == id) {
            Some(particle) => {
                particle.position = self.bounds.clamp(position, particle.radius);
                particle.velocity = Vec2::ZERO;
                true
            }
            None => false,
        }
    }

    /// Recolor every particle with a different palette.
    pub fn set_palette(&mut self, palette: PaletteMode) {
        self.palette = palette;
        for particle in &mut self.particles {
            particle.color = self.colors.map(particle.normalized_value, palette);
        }
    }

    /// Current palette.
    pub fn palette(&self) -> PaletteMode {
        self.palette
    }

    /// Current population, in stable order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Connectors produced by the most recent step.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Simulation area.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Tuning constants.
    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Reflect and damp velocity on any axis where the disc left the margin.
fn contain(particle: &mut Particle, bounds: &Bounds, restitution: f32) {
    let (lo, hi) = bounds.containment(particle.radius);
    reflect_axis(&mut particle.position.x, &mut particle.velocity.x, lo.x, hi.x, restitution);
    reflect_axis(&mut particle.position.y, &mut particle.velocity.y, lo.y, hi.y, restitution);
}

#[inline]
fn reflect_axis(position: &mut f32, velocity: &mut f32, lo: f32, hi: f32, restitution: f32) {
    if *position < lo || *position > hi {
        *velocity *= -restitution;
        *position = position.clamp(lo, hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PaletteColorMapper;
    use crate::entity::{normalize, Entity};
    use crate::oracle::Unrelated;

    fn field<O: RelatednessOracle>(oracle: O) -> ForceField<O, PaletteColorMapper> {
        let config = ForceConfig {
            seed: Some(7),
            ..ForceConfig::default()
        };
        ForceField::new(
            Bounds::new(800.0, 800.0, 40.0),
            config,
            oracle,
            PaletteColorMapper::default(),
        )
    }

    fn genes(values: &[(&str, f64)]) -> Vec<NormalizedEntity> {
        let raw: Vec<Entity> = values.iter().map(|&(id, v)| Entity::new(id, v)).collect();
        normalize(&raw)
    }

    #[test]
    fn test_empty_population_is_inert() {
        let mut f = field(Unrelated);
        f.update(&[]);
        f.step();
        assert!(f.is_empty());
        assert!(f.connectors().is_empty());
        assert!(f.find_at(400.0, 400.0).is_none());
    }

    #[test]
    fn test_rebuild_places_on_ring_inside_bounds() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)]));

        let center = f.bounds().center();
        for p in f.particles() {
            let (lo, hi) = f.bounds().containment(p.radius);
            assert!(p.position.cmpge(lo).all() && p.position.cmple(hi).all());
            assert!((p.position.distance(center) - 800.0 * 0.35).abs() < 1e-2);
            assert!(p.velocity.x.abs() <= 0.5 && p.velocity.y.abs() <= 0.5);
        }
    }

    #[test]
    fn test_radius_follows_value() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("low", 0.0), ("mid", 5.0), ("high", 10.0)]));
        let r: Vec<f32> = f.particles().iter().map(|p| p.radius).collect();
        assert_eq!(r[0], 6.0);
        assert!((r[1] - 17.0).abs() < 1e-4);
        assert!((r[2] - 28.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_values_use_mid_radius() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("a", 2.0), ("b", 2.0)]));
        for p in f.particles() {
            assert!((p.radius - 17.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_same_ids_preserve_motion() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 5.0), ("C", 9.0)]));
        for _ in 0..10 {
            f.step();
        }
        let before: Vec<(Vec2, Vec2)> =
            f.particles().iter().map(|p| (p.position, p.velocity)).collect();
        let color_before = f.particles()[0].color;

        f.update(&genes(&[("A", 9.0), ("B", 5.0), ("C", 1.0)]));
        let after: Vec<(Vec2, Vec2)> =
            f.particles().iter().map(|p| (p.position, p.velocity)).collect();

        assert_eq!(before, after);
        assert_ne!(f.particles()[0].color, color_before);
        assert!(f.particles()[0].normalized_value > 0.0);
    }

    #[test]
    fn test_changed_ids_rebuild() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 2.0)]));
        f.update(&genes(&[("B", 2.0), ("A", 1.0)]));
        let ids: Vec<&str> = f.particles().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_boundary_reflects_and_damps() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0)]));
        f.place("A", Vec2::new(400.0, 400.0));
        f.particles[0].position = Vec2::new(-50.0, 400.0);
        f.particles[0].velocity = Vec2::new(-10.0, 0.0);

        f.step();
        let p = &f.particles()[0];
        let (lo, _) = f.bounds().containment(p.radius);
        // Clamped to lo, reflected to +8, integrated, then damped.
        assert!((p.position.x - (lo.x + 8.0)).abs() < 1e-4);
        assert!((p.velocity.x - 8.0 * 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_velocity_decays_without_forces() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0)]));
        f.place("A", Vec2::new(400.0, 400.0));
        f.particles[0].velocity = Vec2::new(1.0, 0.0);
        for _ in 0..200 {
            f.step();
        }
        assert!(f.particles()[0].velocity.length() < 1e-3);
    }

    #[test]
    fn test_crowded_pair_separates() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 1.0)]));
        f.place("A", Vec2::new(400.0, 400.0));
        f.place("B", Vec2::new(410.0, 400.0));
        for _ in 0..50 {
            f.step();
        }
        let d = f.particles()[0].position.distance(f.particles()[1].position);
        assert!(d > 10.0);
    }

    #[test]
    fn test_coincident_pair_separates() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 1.0)]));
        f.place("A", Vec2::new(400.0, 400.0));
        f.place("B", Vec2::new(400.0, 400.0));
        f.step();
        let d = f.particles()[0].position.distance(f.particles()[1].position);
        assert!(d > 0.0 && d.is_finite());
    }

    #[test]
    fn test_related_pair_emits_connector() {
        let mut f = field(|a: &str, b: &str| a != b);
        f.update(&genes(&[("A", 1.0), ("B", 1.0)]));
        f.place("A", Vec2::new(300.0, 400.0));
        f.place("B", Vec2::new(450.0, 400.0));
        f.step();

        assert_eq!(f.connectors().len(), 1);
        let c = f.connectors()[0];
        assert_eq!((c.a, c.b), (0, 1));
        assert!(c.opacity > 0.0 && c.opacity < 0.6);
    }

    #[test]
    fn test_place_unknown_id() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0)]));
        assert!(!f.place("Z", Vec2::ZERO));
    }

    #[test]
    fn test_find_at() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 2.0)]));
        f.place("A", Vec2::new(200.0, 200.0));
        f.place("B", Vec2::new(600.0, 600.0));

        let r = f.particles()[0].radius;
        assert_eq!(f.find_at(200.0 + r + 3.0, 200.0).map(|p| p.id.as_str()), Some("A"));
        assert_eq!(f.find_at(600.0, 600.0).map(|p| p.id.as_str()), Some("B"));
        assert!(f.find_at(400.0, 400.0).is_none());
    }

    #[test]
    fn test_set_palette_recolors_in_place() {
        let mut f = field(Unrelated);
        f.update(&genes(&[("A", 1.0), ("B", 9.0)]));
        let positions: Vec<Vec2> = f.particles().iter().map(|p| p.position).collect();
        let before = f.particles()[1].color;

        f.set_palette(PaletteMode::Grayscale);
        assert_ne!(f.particles()[1].color, before);
        assert_eq!(
            positions,
            f.particles().iter().map(|p| p.position).collect::<Vec<_>>()
        );
    }
}
