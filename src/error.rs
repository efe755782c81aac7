//! Errors raised by the atmosphere and lunar models.

/// Possible atmosphere model errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AtmosphereError {
    /// The requested sky condition is not one of the configured ones
    InvalidCondition {
        /// The rejected condition name
        name: String,
        /// Every configured condition name, sorted
        valid: Vec<String>,
    },
    /// One or more moon phases are outside of [0, 1]
    InvalidPhase {
        /// The offending phase values
        values: Vec<f64>,
    },
    /// An array is not aligned with the model's wavelength grid
    ConfigurationMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected number of wavelength samples
        expected: usize,
        /// Actual number of samples
        found: usize,
    },
    /// Two tables were sampled on different wavelength grids (values or
    /// units)
    GridMismatch {
        /// The table whose grid differs from the model's
        what: &'static str,
    },
    /// A wavelength grid is empty
    EmptyGrid,
    /// A wavelength grid is not strictly increasing
    UnsortedGrid {
        /// Index of the first sample that is not larger than its predecessor
        index: usize,
    },
    /// A lunar model is configured but no moon spectrum was supplied
    MissingMoonSpectrum,
    /// Array-shaped inputs can't be broadcast together
    IncompatibleShapes,
    /// The scattered moonlight brightness is not positive, so it has no
    /// magnitude
    UndefinedBrightness {
        /// Number of elements where the brightness was out of domain
        count: usize,
    },
}

impl std::fmt::Display for AtmosphereError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtmosphereError::InvalidCondition { name, valid } => {
                write!(
                    f,
                    "invalid condition '{name}', pick one of {{{}}}",
                    valid.join(", ")
                )
            }
            AtmosphereError::InvalidPhase { values } => {
                write!(f, "invalid moon phase {values:?}, expected 0-1")
            }
            AtmosphereError::ConfigurationMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{what} has {found} samples but the wavelength grid has {expected}"
            ),
            AtmosphereError::GridMismatch { what } => {
                write!(f, "{what} is not sampled on the model's wavelength grid")
            }
            AtmosphereError::EmptyGrid => write!(f, "wavelength grid is empty"),
            AtmosphereError::UnsortedGrid { index } => {
                write!(
                    f,
                    "wavelength grid is not strictly increasing at index {index}"
                )
            }
            AtmosphereError::MissingMoonSpectrum => {
                write!(f, "moon is configured without a moon spectrum")
            }
            AtmosphereError::IncompatibleShapes => {
                write!(f, "input arrays can't be broadcast to a common shape")
            }
            AtmosphereError::UndefinedBrightness { count } => write!(
                f,
                "scattered moon brightness is not positive for {count} element(s)"
            ),
        }
    }
}

impl std::error::Error for AtmosphereError {}
