use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::Deserialize;

/// Incremental versions of the effect, each adding one capability.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Flat quads facing +Z, fixed camera, single atlas frame.
    Basic,
    Billboard,
    Camera,
    Atlas,
    /// Everything, plus upward acceleration.
    #[default]
    Accelerated,
}

/// What a stage turns on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Features {
    pub billboarding: bool,
    pub camera_control: bool,
    pub atlas_animation: bool,
    pub acceleration: bool,
}

impl Features {
    /// Upward acceleration for the shader; zero unless the stage enables it.
    pub fn acceleration_vector(&self, strength: f32) -> Vec3 {
        if self.acceleration && strength.is_finite() {
            Vec3::new(0.0, strength, 0.0)
        } else {
            Vec3::ZERO
        }
    }
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Basic,
        Stage::Billboard,
        Stage::Camera,
        Stage::Atlas,
        Stage::Accelerated,
    ];

    pub fn features(self) -> Features {
        let rank = self as u8;
        Features {
            billboarding: rank >= Stage::Billboard as u8,
            camera_control: rank >= Stage::Camera as u8,
            atlas_animation: rank >= Stage::Atlas as u8,
            acceleration: rank >= Stage::Accelerated as u8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Basic => "basic",
            Stage::Billboard => "billboard",
            Stage::Camera => "camera",
            Stage::Atlas => "atlas",
            Stage::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|st| st.name() == lower)
            .ok_or_else(|| {
                let names: Vec<_> = Stage::ALL.iter().map(|st| st.name()).collect();
                format!("unknown stage '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── features ──────────────────────────────────────────────────────────

    #[test]
    fn basic_has_nothing() {
        assert_eq!(Stage::Basic.features(), Features::default());
    }

    #[test]
    fn each_stage_adds_one_feature() {
        let count = |f: Features| {
            [f.billboarding, f.camera_control, f.atlas_animation, f.acceleration]
                .into_iter()
                .filter(|b| *b)
                .count()
        };
        for (i, st) in Stage::ALL.into_iter().enumerate() {
            assert_eq!(count(st.features()), i, "{st}");
        }
    }

    #[test]
    fn atlas_stage_has_no_acceleration() {
        let f = Stage::Atlas.features();
        assert!(f.atlas_animation && f.camera_control && f.billboarding);
        assert!(!f.acceleration);
    }

    #[test]
    fn acceleration_vector_only_when_enabled() {
        assert_eq!(
            Stage::Accelerated.features().acceleration_vector(0.01),
            Vec3::new(0.0, 0.01, 0.0)
        );
        assert_eq!(Stage::Atlas.features().acceleration_vector(0.01), Vec3::ZERO);
        assert_eq!(
            Stage::Accelerated.features().acceleration_vector(f32::NAN),
            Vec3::ZERO
        );
    }

    // ── names ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Camera".parse::<Stage>(), Ok(Stage::Camera));
        assert_eq!(" atlas ".parse::<Stage>(), Ok(Stage::Atlas));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "smoke".parse::<Stage>().unwrap_err();
        assert!(err.contains("smoke"));
        assert!(err.contains("accelerated"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for st in Stage::ALL {
            assert_eq!(st.to_string().parse::<Stage>(), Ok(st));
        }
    }

    #[test]
    fn default_is_full_effect() {
        assert_eq!(Stage::default(), Stage::Accelerated);
    }
}
