use glam::Vec3;
use serde::Deserialize;

/// One flame: the shared particle table drawn at `position`, tinted by `color`.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flame {
    pub position: [f32; 3],
    /// Straight RGBA multiplier. Components above 1 are allowed and saturate
    /// that channel under additive blending.
    pub color: [f32; 4],
}

impl Flame {
    pub const RED: Flame = Flame {
        position: [0.0, 0.0, 0.0],
        color: [0.8, 0.25, 0.25, 1.0],
    };

    pub const PURPLE: Flame = Flame {
        position: [0.5, 0.0, 0.0],
        color: [0.25, 0.25, 8.25, 1.0],
    };

    /// Red flame at the origin and a purple one half a unit to its right.
    pub fn default_pair() -> Vec<Flame> {
        vec![Self::RED, Self::PURPLE]
    }

    #[inline]
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Point the camera orbits: the first flame, or the origin when there is none.
pub fn focus_point(flames: &[Flame]) -> Vec3 {
    flames.first().map(Flame::position_vec).unwrap_or(Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pair_is_red_then_purple() {
        let pair = Flame::default_pair();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].color, [0.8, 0.25, 0.25, 1.0]);
        assert_eq!(pair[1].position, [0.5, 0.0, 0.0]);
    }

    #[test]
    fn focus_is_first_flame() {
        let flames = [Flame::PURPLE, Flame::RED];
        assert_eq!(focus_point(&flames), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(focus_point(&[]), Vec3::ZERO);
    }
}
