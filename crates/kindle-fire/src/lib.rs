//! Particle fire effect.
//!
//! Particles are generated once into static attribute tables. Every frame the
//! GPU evaluates each particle's position, size, opacity and sprite frame
//! from a single "current time" value, so nothing on the CPU side is mutated
//! after upload.

pub mod atlas;
pub mod camera;
pub mod clock;
pub mod flame;
pub mod motion;
pub mod particles;
pub mod renderer;
pub mod stage;

mod error;

pub use atlas::AtlasImage;
pub use camera::OrbitCamera;
pub use clock::SimClock;
pub use error::ParticleError;
pub use flame::Flame;
pub use particles::{ParticleTable, SpawnParams};
pub use renderer::{FireFrame, FireRenderer};
pub use stage::{Features, Stage};
