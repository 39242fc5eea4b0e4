// Geodesy module - great-circle distances over tracks
//
// Spherical Earth model (mean radius), haversine formulation.

use std::f64::consts::PI;

use crate::constants::EARTH_RADIUS_M;
use crate::track::{Coordinate, Track};

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Returns the great-circle distance in meters between two coordinates
///
/// Uses the haversine formula, which stays well-conditioned for both very
/// short segments and antipodal points.
///
/// # Arguments
/// * `a` - Start coordinate
/// * `b` - End coordinate
///
/// # Returns
/// Distance in meters
///
/// # Example
/// ```
/// use trackfilter::geodesy::segment_distance;
/// use trackfilter::track::Coordinate;
///
/// let london = Coordinate::new(51.5074, -0.1278).unwrap();
/// let paris = Coordinate::new(48.8566, 2.3522).unwrap();
/// let d = segment_distance(&london, &paris);
/// assert!((d - 343_500.0).abs() < 2_000.0);
/// ```
pub fn segment_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat() - a.lat()) * DTOR;
    let d_lon = (b.lon() - a.lon()) * DTOR;

    let sin_dlat = (d_lat / 2.0).sin();
    let sin_dlon = (d_lon / 2.0).sin();

    let h = sin_dlat * sin_dlat
        + (a.lat() * DTOR).cos() * (b.lat() * DTOR).cos() * sin_dlon * sin_dlon;
    // Rounding can push h a hair past 1 for antipodes
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Unrounded sum of segment distances over consecutive pairs, in sequence order
pub fn path_length(track: &Track) -> f64 {
    track
        .segments()
        .map(|(a, b)| segment_distance(a, b))
        .sum()
}

/// Total travelled distance of a track in meters, rounded to 2 decimals
///
/// Rounding is applied once to the full sum, never per segment. Tracks with
/// fewer than two points have zero length.
pub fn total_distance(track: &Track) -> f64 {
    round_to_centimeters(path_length(track))
}

/// Round a distance in meters to 2 decimal places
#[inline]
pub fn round_to_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}
