//! Error types for geoset operations.

use thiserror::Error;

/// Errors produced by geoset operations.
///
/// Validation errors (`InvalidCoordinates`, `InvalidArgument`,
/// `UnsupportedOptionCombination`) are raised before any storage mutation,
/// so a failed call never leaves partial state behind.
#[derive(Error, Debug)]
pub enum GeoSetError {
    /// A longitude/latitude pair falls outside the supported range.
    ///
    /// Longitude must be within [-180, 180] and latitude within the
    /// Web-Mercator band [-85.05112878, 85.05112878].
    #[error("invalid longitude,latitude pair: {longitude},{latitude}")]
    InvalidCoordinates { longitude: f64, latitude: f64 },

    /// A query referenced a member that is not registered in the container.
    #[error("no such member: {0}")]
    NoSuchMember(String),

    /// A numeric or unit parameter could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Mutually exclusive query options were combined.
    #[error("unsupported option combination: {0}")]
    UnsupportedOptionCombination(&'static str),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The storage backend reported a failure.
    #[error("storage backend error: {0}")]
    Store(String),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoSetError::InvalidCoordinates {
            longitude: 200.0,
            latitude: 10.0,
        };
        assert_eq!(err.to_string(), "invalid longitude,latitude pair: 200,10");

        let err = GeoSetError::NoSuchMember("Agrigento".to_string());
        assert_eq!(err.to_string(), "no such member: Agrigento");
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeoSetError>();
    }
}
