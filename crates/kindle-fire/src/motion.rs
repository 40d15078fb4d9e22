//! CPU reference for the per-vertex particle formulas.
//!
//! `shaders/fire.wgsl` evaluates exactly this arithmetic on the GPU; keeping a
//! CPU copy makes the life cycle testable without a device.

use glam::{Mat4, Vec2, Vec3};

use crate::atlas;

/// Fade starts above 1 so a particle stays fully opaque for the first 30% of its life.
pub const LIFE_FADE_BIAS: f32 = 1.3;

/// Quad half-extent at full fade, in world units.
pub const DEFAULT_SIZE_SCALE: f32 = 0.05;

/// Seconds into the particle's current loop (GLSL-style `mod`, result in `[0, lifetime)`).
#[inline]
pub fn particle_time(time: f32, lifetime: f32) -> f32 {
    time - lifetime * (time / lifetime).floor()
}

/// Fraction of the current loop that has elapsed, clamped to `[0, 1]`.
#[inline]
pub fn life_fraction(local: f32, lifetime: f32) -> f32 {
    (local / lifetime).clamp(0.0, 1.0)
}

/// Opacity multiplier: 1 early in life, falling linearly to 0 at the end.
#[inline]
pub fn life_fade(local: f32, lifetime: f32) -> f32 {
    (LIFE_FADE_BIAS - local / lifetime).clamp(0.0, 1.0)
}

/// Quad half-extent; shrinks quadratically with the fade.
#[inline]
pub fn quad_size(fade: f32, scale: f32) -> f32 {
    fade * fade * scale
}

/// World-space particle center at `local` seconds into its loop.
#[inline]
pub fn particle_center(
    fire_pos: Vec3,
    offset: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    local: f32,
) -> Vec3 {
    fire_pos + offset + velocity * local + 0.5 * acceleration * local * local
}

/// Camera right and up vectors in world space, read from the view matrix rows.
#[inline]
pub fn camera_basis(view: &Mat4) -> (Vec3, Vec3) {
    (view.row(0).truncate(), view.row(1).truncate())
}

/// World-space displacement of a quad corner from the particle center.
///
/// Billboarded quads span the camera's right/up plane; otherwise they stay in
/// the world XY plane and turn edge-on as the camera orbits.
#[inline]
pub fn corner_offset(corner: Vec2, size: f32, view: &Mat4, billboard: bool) -> Vec3 {
    if billboard {
        let (right, up) = camera_basis(view);
        right * corner.x * size + up * corner.y * size
    } else {
        (corner * size).extend(0.0)
    }
}

/// Per-vertex attributes, as uploaded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexInput {
    pub lifetime: f32,
    pub corner: Vec2,
    pub center_offset: Vec3,
    pub velocity: Vec3,
}

/// Per-draw values shared by every vertex of one flame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlameParams {
    pub time: f32,
    pub fire_pos: Vec3,
    pub acceleration: Vec3,
    pub size_scale: f32,
    pub billboard: bool,
    pub atlas_animation: bool,
}

/// What the vertex stage produces for one vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexSample {
    pub world: Vec3,
    pub fade: f32,
    pub size: f32,
    /// Atlas frame the fragment stage samples.
    pub frame: u32,
}

impl VertexSample {
    pub fn evaluate(input: &VertexInput, flame: &FlameParams, view: &Mat4) -> Self {
        let local = particle_time(flame.time, input.lifetime);
        let fade = life_fade(local, input.lifetime);
        let size = quad_size(fade, flame.size_scale);

        let center = particle_center(
            flame.fire_pos,
            input.center_offset,
            input.velocity,
            flame.acceleration,
            local,
        );
        let world = center + corner_offset(input.corner, size, view, flame.billboard);

        let frame = if flame.atlas_animation {
            atlas::atlas_frame(life_fraction(local, input.lifetime))
        } else {
            0
        };

        Self { world, fade, size, frame }
    }
}
