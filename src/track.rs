// Track model - validated coordinates and immutable ordered tracks

use std::ops::Index;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::error::{Result, TrackError};

/// A geographic position in degrees
///
/// Always within lat ∈ [-90, 90], lon ∈ [-180, 180]; use `Coordinate::new`
/// to build one from untrusted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(MIN_LAT..=MAX_LAT).contains(&lat)
            || !(MIN_LON..=MAX_LON).contains(&lon)
        {
            return Err(TrackError::InvalidCoordinate { lat, lon });
        }
        Ok(Coordinate { lat, lon })
    }

    /// Latitude in degrees
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawCoordinate::deserialize(deserializer)?;
        Coordinate::new(raw.lat, raw.lon).map_err(serde::de::Error::custom)
    }
}

/// Ordered, immutable sequence of coordinates; index is temporal order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    points: Vec<Coordinate>,
}

impl Track {
    /// Empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a track from raw `(lat, lon)` pairs, validating every pair
    pub fn from_lat_lon<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut builder = TrackBuilder::new();
        for (lat, lon) in pairs {
            builder.push_lat_lon(lat, lon)?;
        }
        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Coordinate> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, Coordinate> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consecutive pairs in sequence order
    pub fn segments(&self) -> impl Iterator<Item = (&Coordinate, &Coordinate)> {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }
}

impl Index<usize> for Track {
    type Output = Coordinate;

    fn index(&self, index: usize) -> &Coordinate {
        &self.points[index]
    }
}

impl From<Vec<Coordinate>> for Track {
    fn from(points: Vec<Coordinate>) -> Self {
        Track { points }
    }
}

impl FromIterator<Coordinate> for Track {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Track {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Coordinate;
    type IntoIter = slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Append-only construction of a `Track`
#[derive(Debug, Default)]
pub struct TrackBuilder {
    points: Vec<Coordinate>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TrackBuilder {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, coord: Coordinate) -> &mut Self {
        self.points.push(coord);
        self
    }

    /// Validate and append a raw pair
    pub fn push_lat_lon(&mut self, lat: f64, lon: f64) -> Result<&mut Self> {
        let coord = Coordinate::new(lat, lon)?;
        Ok(self.push(coord))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze into an immutable track
    pub fn build(self) -> Track {
        Track {
            points: self.points,
        }
    }
}
