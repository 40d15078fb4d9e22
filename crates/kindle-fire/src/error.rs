use std::fmt;

/// Reasons a particle table cannot be generated.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleError {
    /// Zero particles requested.
    Empty,
    /// More particles than 16-bit indices can address.
    TooManyParticles { requested: usize, max: usize },
    /// A spawn parameter is negative, zero where it must not be, or not finite.
    InvalidParameter { name: &'static str, value: f32 },
}

impl fmt::Display for ParticleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleError::Empty => write!(f, "particle count must be at least 1"),
            ParticleError::TooManyParticles { requested, max } => write!(
                f,
                "{requested} particles requested but at most {max} fit in 16-bit indices"
            ),
            ParticleError::InvalidParameter { name, value } => {
                write!(f, "invalid spawn parameter `{name}`: {value}")
            }
        }
    }
}

impl std::error::Error for ParticleError {}
