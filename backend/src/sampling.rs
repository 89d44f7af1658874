use crate::error::AirRouteError;
use crate::models::Coordinate;

/// Pick `count` evenly spaced vertices from a route polyline.
///
/// Only existing vertices are returned, never interpolated points, so the
/// samples approximate the route rather than subdividing it by distance.
/// A polyline with at most `count` vertices is returned whole.
pub fn sample_coordinates(
    polyline: &[Coordinate],
    count: usize,
) -> Result<Vec<Coordinate>, AirRouteError> {
    let indices = sample_indices(polyline.len(), count)?;
    Ok(indices.into_iter().map(|idx| polyline[idx]).collect())
}

/// Indices chosen by [`sample_coordinates`] for a polyline of `len` vertices.
///
/// `index(i) = floor(i / (count - 1) * (len - 1))`. First and last vertices are
/// always kept; duplicate indices are possible and accepted.
pub fn sample_indices(len: usize, count: usize) -> Result<Vec<usize>, AirRouteError> {
    if len == 0 {
        return Err(AirRouteError::invalid("cannot sample an empty polyline"));
    }
    if count == 0 {
        return Err(AirRouteError::invalid("sample count must be at least 1"));
    }
    if len <= count {
        return Ok((0..len).collect());
    }
    if count == 1 {
        return Ok(vec![0]);
    }

    let last = (len - 1) as f64;
    let span = (count - 1) as f64;
    Ok((0..count)
        .map(|i| ((i as f64 / span) * last).floor() as usize)
        .collect())
}
