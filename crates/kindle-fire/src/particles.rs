//! Static per-particle attribute tables.
//!
//! Four vertices per particle (one quad), each carrying the particle's shared
//! lifetime, spawn offset and velocity plus its own corner and texture
//! coordinate. Tables are built once and uploaded as-is.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::error::ParticleError;

pub const VERTICES_PER_PARTICLE: usize = 4;
pub const INDICES_PER_PARTICLE: usize = 6;

/// 16-bit indices address at most 65536 vertices.
pub const MAX_PARTICLES: usize = (u16::MAX as usize + 1) / VERTICES_PER_PARTICLE;

/// Lifetimes are floored here so the per-vertex modulo never divides by zero.
pub const MIN_LIFETIME: f32 = 0.001;

const CORNERS: [[f32; 2]; VERTICES_PER_PARTICLE] =
    [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

const TEX_COORDS: [[f32; 2]; VERTICES_PER_PARTICLE] =
    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

const QUAD_INDICES: [u16; INDICES_PER_PARTICLE] = [0, 1, 2, 0, 2, 3];

/// Parameters controlling how particles are scattered around a flame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnParams {
    pub count: usize,
    /// Lifetimes are drawn uniformly from `[0, max_lifetime)` seconds.
    pub max_lifetime: f32,
    /// Width of the spawn region before per-axis squashing.
    pub spawn_diameter: f32,
    pub up_speed: f32,
    pub side_speed: f32,
    /// Fixed seed for reproducible flames; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            count: 1000,
            max_lifetime: 8.0,
            spawn_diameter: 0.5,
            up_speed: 0.1,
            side_speed: 0.02,
            seed: None,
        }
    }
}

impl SpawnParams {
    pub fn validate(&self) -> Result<(), ParticleError> {
        if self.count == 0 {
            return Err(ParticleError::Empty);
        }
        if self.count > MAX_PARTICLES {
            return Err(ParticleError::TooManyParticles {
                requested: self.count,
                max: MAX_PARTICLES,
            });
        }

        let checks = [
            ("max_lifetime", self.max_lifetime, true),
            ("spawn_diameter", self.spawn_diameter, false),
            ("up_speed", self.up_speed, false),
            ("side_speed", self.side_speed, false),
        ];
        for (name, value, positive) in checks {
            let bad = !value.is_finite() || value < 0.0 || (positive && value <= 0.0);
            if bad {
                return Err(ParticleError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// RNG for table generation: seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// The shared state of one particle, before expansion to quad vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParticleSeed {
    pub lifetime: f32,
    pub center_offset: [f32; 3],
    pub velocity: [f32; 3],
}

impl ParticleSeed {
    /// Draws one particle.
    ///
    /// Start offsets are squashed (x and z by 3, y by 10) into a flat disc and
    /// lifted by half the x distance so the base curves upward at the edges.
    /// Side velocities point back toward the flame axis.
    pub fn spawn<R: Rng + ?Sized>(params: &SpawnParams, rng: &mut R) -> Self {
        let lifetime = (params.max_lifetime * rng.r#gen::<f32>()).max(MIN_LIFETIME);

        let diameter = params.spawn_diameter;
        let half = diameter / 2.0;
        let mut spread = || diameter * rng.r#gen::<f32>() - half;

        let x = spread() / 3.0;
        let y = spread() / 10.0;
        let z = spread() / 3.0;

        let up = params.up_speed * rng.r#gen::<f32>();
        let mut side_x = params.side_speed * rng.r#gen::<f32>();
        if x > 0.0 {
            side_x = -side_x;
        }
        let mut side_z = params.side_speed * rng.r#gen::<f32>();
        if z > 0.0 {
            side_z = -side_z;
        }

        Self {
            lifetime,
            center_offset: [x, y + (x / 2.0).abs(), z],
            velocity: [side_x, up, side_z],
        }
    }
}

/// Flat attribute arrays ready for upload as vertex buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleTable {
    pub lifetimes: Vec<f32>,
    pub corners: Vec<[f32; 2]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub center_offsets: Vec<[f32; 3]>,
    pub velocities: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

impl ParticleTable {
    /// Generates `params.count` particles from `rng`.
    ///
    /// The same RNG state always yields the same table.
    pub fn generate<R: Rng + ?Sized>(params: &SpawnParams, rng: &mut R) -> Result<Self, ParticleError> {
        params.validate()?;

        let mut table = Self::with_capacity(params.count);
        for _ in 0..params.count {
            table.push(ParticleSeed::spawn(params, rng));
        }

        log::debug!(
            "generated {} particles ({} vertices, {} indices)",
            table.particle_count(),
            table.vertex_count(),
            table.index_count()
        );
        Ok(table)
    }

    /// Generates with the RNG described by `params` (seeded or entropy).
    pub fn from_params(params: &SpawnParams) -> Result<Self, ParticleError> {
        let mut rng = params.rng();
        Self::generate(params, &mut rng)
    }

    fn with_capacity(particles: usize) -> Self {
        let v = particles * VERTICES_PER_PARTICLE;
        Self {
            lifetimes: Vec::with_capacity(v),
            corners: Vec::with_capacity(v),
            tex_coords: Vec::with_capacity(v),
            center_offsets: Vec::with_capacity(v),
            velocities: Vec::with_capacity(v),
            indices: Vec::with_capacity(particles * INDICES_PER_PARTICLE),
        }
    }

    fn push(&mut self, seed: ParticleSeed) {
        // Callers keep the vertex count within u16 range via `validate`.
        let base = self.vertex_count() as u16;

        for (corner, uv) in CORNERS.iter().zip(TEX_COORDS.iter()) {
            self.lifetimes.push(seed.lifetime);
            self.corners.push(*corner);
            self.tex_coords.push(*uv);
            self.center_offsets.push(seed.center_offset);
            self.velocities.push(seed.velocity);
        }

        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    pub fn particle_count(&self) -> usize {
        self.lifetimes.len() / VERTICES_PER_PARTICLE
    }

    pub fn vertex_count(&self) -> usize {
        self.lifetimes.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Shared state of particle `i`, read back from its first vertex.
    pub fn particle(&self, i: usize) -> Option<ParticleSeed> {
        let v = i.checked_mul(VERTICES_PER_PARTICLE)?;
        Some(ParticleSeed {
            lifetime: *self.lifetimes.get(v)?,
            center_offset: *self.center_offsets.get(v)?,
            velocity: *self.velocities.get(v)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize) -> ParticleTable {
        let params = SpawnParams {
            count,
            seed: Some(7),
            ..SpawnParams::default()
        };
        ParticleTable::from_params(&params).unwrap()
    }

    // ── lengths ───────────────────────────────────────────────────────────

    #[test]
    fn buffers_have_expected_lengths() {
        let t = seeded(1000);
        assert_eq!(t.particle_count(), 1000);
        assert_eq!(t.lifetimes.len(), 4000);
        assert_eq!(t.corners.len(), 4000);
        assert_eq!(t.tex_coords.len(), 4000);
        assert_eq!(t.center_offsets.len(), 4000);
        assert_eq!(t.velocities.len(), 4000);
        assert_eq!(t.index_count(), 6000);
    }

    #[test]
    fn indices_form_two_triangles_per_quad() {
        let t = seeded(3);
        assert_eq!(&t.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&t.indices[12..], &[8, 9, 10, 8, 10, 11]);
        assert!(t.indices.iter().all(|&i| (i as usize) < t.vertex_count()));
    }

    #[test]
    fn largest_table_fits_u16_indices() {
        let t = seeded(MAX_PARTICLES);
        assert_eq!(t.indices.iter().copied().max(), Some(u16::MAX));
    }

    // ── per-particle sharing ──────────────────────────────────────────────

    #[test]
    fn quad_vertices_share_particle_state() {
        let t = seeded(50);
        for p in 0..50 {
            let v = p * 4;
            for k in 1..4 {
                assert_eq!(t.lifetimes[v], t.lifetimes[v + k]);
                assert_eq!(t.center_offsets[v], t.center_offsets[v + k]);
                assert_eq!(t.velocities[v], t.velocities[v + k]);
            }
            assert_eq!(&t.corners[v..v + 4], &CORNERS);
            assert_eq!(&t.tex_coords[v..v + 4], &TEX_COORDS);
        }
    }

    // ── value ranges ──────────────────────────────────────────────────────

    #[test]
    fn values_stay_in_spawn_ranges() {
        let t = seeded(2000);
        for p in 0..t.particle_count() {
            let s = t.particle(p).unwrap();
            assert!(s.lifetime >= MIN_LIFETIME && s.lifetime < 8.0);

            let [x, y, z] = s.center_offset;
            assert!(x.abs() <= 0.25 / 3.0 + 1e-6);
            assert!(z.abs() <= 0.25 / 3.0 + 1e-6);
            assert!(y >= -0.025 - 1e-6 && y <= 0.025 + x.abs() / 2.0 + 1e-6);

            let [vx, vy, vz] = s.velocity;
            assert!((0.0..0.1).contains(&vy));
            assert!(vx.abs() < 0.02 && vz.abs() < 0.02);
        }
    }

    #[test]
    fn side_velocity_points_toward_axis() {
        let t = seeded(500);
        for p in 0..t.particle_count() {
            let s = t.particle(p).unwrap();
            if s.center_offset[0] > 0.0 {
                assert!(s.velocity[0] <= 0.0);
            } else {
                assert!(s.velocity[0] >= 0.0);
            }
            if s.center_offset[2] > 0.0 {
                assert!(s.velocity[2] <= 0.0);
            }
        }
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn same_seed_same_table() {
        assert_eq!(seeded(100), seeded(100));
    }

    #[test]
    fn different_seeds_differ() {
        let a = seeded(100);
        let b = ParticleTable::from_params(&SpawnParams {
            count: 100,
            seed: Some(8),
            ..SpawnParams::default()
        })
        .unwrap();
        assert_ne!(a.lifetimes, b.lifetimes);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn zero_particles_rejected() {
        let params = SpawnParams { count: 0, ..SpawnParams::default() };
        assert_eq!(ParticleTable::from_params(&params), Err(ParticleError::Empty));
    }

    #[test]
    fn too_many_particles_rejected() {
        let params = SpawnParams {
            count: MAX_PARTICLES + 1,
            ..SpawnParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParticleError::TooManyParticles { max: MAX_PARTICLES, .. })
        ));
    }

    #[test]
    fn non_positive_lifetime_rejected() {
        let params = SpawnParams { max_lifetime: 0.0, ..SpawnParams::default() };
        assert!(matches!(
            params.validate(),
            Err(ParticleError::InvalidParameter { name: "max_lifetime", .. })
        ));
    }

    #[test]
    fn nan_speed_rejected() {
        let params = SpawnParams { up_speed: f32::NAN, ..SpawnParams::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn missing_particle_is_none() {
        assert!(seeded(2).particle(2).is_none());
    }
}
