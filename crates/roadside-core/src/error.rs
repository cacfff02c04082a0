use thiserror::Error;

/// Errors that can occur in roadside core operations.
///
/// Classification and matching never fail; these only cover parsing
/// external text and validating coordinates at the boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// A category name did not match any known category.
    #[error("unknown issue category: {0:?}")]
    UnknownCategory(String),

    /// A skill name did not match any known mechanic skill.
    #[error("unknown mechanic skill: {0:?}")]
    UnknownSkill(String),

    /// Latitude or longitude is non-finite or outside its valid range.
    #[error("invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates {
        /// Latitude as supplied.
        lat: f64,
        /// Longitude as supplied.
        lon: f64,
    },

    /// A coordinate policy name was not recognised.
    #[error("unknown coordinate policy: {0:?}")]
    UnknownPolicy(String),
}

/// Result type alias for roadside core operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
