use std::f32::consts::PI;

use glam::{Mat3, Mat4, Vec3};

/// Pointer pixels per radian of rotation.
pub const DRAG_PIXELS_PER_RADIAN: f32 = 50.0;

/// Pitch limit; keeps the camera from flipping over the poles.
pub const MAX_PITCH: f32 = PI / 2.5;

pub const FOV_Y: f32 = PI / 3.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;

/// Camera orbiting `target`, driven by pointer drags.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Pitch in radians; positive tilts the camera upward.
    pub x_rotation: f32,
    /// Yaw in radians about world +Y.
    pub y_rotation: f32,
    pub target: Vec3,
    /// Unrotated eye position.
    pub start: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub const DEFAULT_START: Vec3 = Vec3::new(0.0, 0.25, 1.0);

    pub fn new(target: Vec3) -> Self {
        Self {
            x_rotation: 0.0,
            y_rotation: 0.0,
            target,
            start: Self::DEFAULT_START,
        }
    }

    /// Applies a pointer drag of `(dx, dy)` logical pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.x_rotation += dy / DRAG_PIXELS_PER_RADIAN;
        self.y_rotation -= dx / DRAG_PIXELS_PER_RADIAN;
        self.x_rotation = self.x_rotation.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn eye(&self) -> Vec3 {
        Mat3::from_rotation_y(self.y_rotation) * Mat3::from_rotation_x(-self.x_rotation) * self.start
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Perspective projection for a `width / height` aspect ratio.
    ///
    /// Non-positive or non-finite aspects fall back to square.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(FOV_Y, aspect, Z_NEAR, Z_FAR)
    }

    /// Back to the initial orientation; `target` is kept.
    pub fn reset(&mut self) {
        self.x_rotation = 0.0;
        self.y_rotation = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    // ── dragging ──────────────────────────────────────────────────────────

    #[test]
    fn drag_maps_pixels_to_radians() {
        let mut c = OrbitCamera::default();
        c.drag(50.0, 25.0);
        assert!((c.y_rotation + 1.0).abs() < EPS);
        assert!((c.x_rotation - 0.5).abs() < EPS);
    }

    #[test]
    fn pitch_is_clamped_both_ways() {
        let mut c = OrbitCamera::default();
        c.drag(0.0, 10_000.0);
        assert_eq!(c.x_rotation, MAX_PITCH);
        c.drag(0.0, -20_000.0);
        assert_eq!(c.x_rotation, -MAX_PITCH);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut c = OrbitCamera::default();
        c.drag(-1000.0, 0.0);
        assert!((c.y_rotation - 20.0).abs() < EPS);
    }

    #[test]
    fn non_finite_drag_is_ignored() {
        let mut c = OrbitCamera::default();
        c.drag(f32::NAN, 1.0);
        assert_eq!(c, OrbitCamera::default());
    }

    // ── eye / view ────────────────────────────────────────────────────────

    #[test]
    fn unrotated_eye_is_start() {
        let c = OrbitCamera::default();
        assert!(c.eye().abs_diff_eq(Vec3::new(0.0, 0.25, 1.0), EPS));
    }

    #[test]
    fn eye_keeps_distance_from_origin() {
        let mut c = OrbitCamera::default();
        c.drag(37.0, -12.0);
        assert!((c.eye().length() - OrbitCamera::DEFAULT_START.length()).abs() < EPS);
    }

    #[test]
    fn quarter_yaw_moves_eye_to_positive_x() {
        let mut c = OrbitCamera::default();
        c.y_rotation = PI / 2.0;
        assert!(c.eye().abs_diff_eq(Vec3::new(1.0, 0.25, 0.0), EPS));
    }

    #[test]
    fn positive_pitch_raises_eye() {
        let mut c = OrbitCamera::default();
        c.drag(0.0, 20.0);
        assert!(c.eye().y > OrbitCamera::DEFAULT_START.y);
    }

    #[test]
    fn view_maps_target_onto_negative_z_axis() {
        let mut c = OrbitCamera::new(Vec3::new(0.5, 0.0, 0.0));
        c.drag(40.0, 10.0);
        let t = c.view().transform_point3(c.target);
        assert!(t.x.abs() < EPS && t.y.abs() < EPS);
        assert!(t.z < 0.0);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_uses_aspect() {
        let c = OrbitCamera::default();
        let square = c.projection(1.0);
        let wide = c.projection(2.0);
        assert!((square.x_axis.x - 2.0 * wide.x_axis.x).abs() < EPS);
        assert_eq!(square.y_axis.y, wide.y_axis.y);
    }

    #[test]
    fn bad_aspect_falls_back_to_square() {
        let c = OrbitCamera::default();
        assert_eq!(c.projection(0.0), c.projection(1.0));
        assert_eq!(c.projection(f32::INFINITY), c.projection(1.0));
    }

    #[test]
    fn reset_restores_orientation() {
        let mut c = OrbitCamera::new(Vec3::X);
        c.drag(10.0, 10.0);
        c.reset();
        assert_eq!(c, OrbitCamera::new(Vec3::X));
    }
}
