//! Coordinate sequence validation.
//!
//! Annotation geometry is stored as a flat numeric sequence
//! `[x1, y1, x2, y2, ...]`. A point is a single coordinate pair, a polygon
//! is a closed boundary of at least three vertices.

use crate::error::CoreError;

/// Minimum number of coordinate values for a polygon (three vertices).
pub const MIN_POLYGON_COORDINATES: usize = 6;

/// Validate a point coordinate sequence: exactly one finite pair.
pub fn validate_point_coordinates(points: &[f64]) -> Result<(), CoreError> {
    if points.len() != 2 {
        return Err(CoreError::Validation(format!(
            "A point annotation must have exactly 2 coordinate values, got {}",
            points.len()
        )));
    }
    validate_finite(points)
}

/// Validate a polygon coordinate sequence: an even number of finite values,
/// at least [`MIN_POLYGON_COORDINATES`].
pub fn validate_polygon_coordinates(points: &[f64]) -> Result<(), CoreError> {
    if points.len() < MIN_POLYGON_COORDINATES {
        return Err(CoreError::Validation(format!(
            "A polygon annotation must have at least {MIN_POLYGON_COORDINATES} coordinate values, got {}",
            points.len()
        )));
    }
    if points.len() % 2 != 0 {
        return Err(CoreError::Validation(format!(
            "Coordinate values must come in x/y pairs, got {}",
            points.len()
        )));
    }
    validate_finite(points)
}

fn validate_finite(points: &[f64]) -> Result<(), CoreError> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(CoreError::Validation(
            "Coordinate values must be finite numbers".to_string(),
        ));
    }
    Ok(())
}
