// Shared constants for distance and smoothing

/// Mean Earth radius for the spherical (haversine) model, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Latitude bounds in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Longitude bounds in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Default process noise standard deviation (degrees). Q = diag(q, q) with q = 0.55^2.
pub const DEFAULT_PROCESS_NOISE_STD: f64 = 0.55;

/// Default observation noise standard deviation (degrees). R = diag(r, r) with r = 1^2.
pub const DEFAULT_OBSERVATION_NOISE_STD: f64 = 1.0;

/// Default diagonal of the initial state covariance (identity prior).
pub const DEFAULT_INITIAL_COVARIANCE: f64 = 1.0;

/// Default output file written by the CLI.
pub const DEFAULT_OUTPUT_FILE: &str = "out.gpx";

/// Decimal places kept when writing coordinates to GPX/CSV.
pub const COORD_DECIMALS: usize = 8;
