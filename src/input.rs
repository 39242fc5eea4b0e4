// Track loaders

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use gpx::errors::GpxError;
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::track::{Track, TrackBuilder};

/// Something that can produce a track
pub trait TrackSource {
    /// Load the full track, in temporal order
    fn load(&mut self) -> Result<Track>;
}

impl TrackSource for Track {
    fn load(&mut self) -> Result<Track> {
        Ok(self.clone())
    }
}

/// GPX file/stream loader
///
/// Every `trkpt` of every segment of every track is taken in document
/// order and concatenated into one track. Waypoints and routes are ignored.
pub struct GpxSource<R: Read> {
    reader: R,
}

impl GpxSource<BufReader<File>> {
    /// Open a GPX file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Opened GPX input {}", path.as_ref().display());
        Ok(GpxSource {
            reader: BufReader::new(file),
        })
    }
}

impl<R: Read> GpxSource<R> {
    pub fn new(reader: R) -> Self {
        GpxSource { reader }
    }
}

impl<R: Read> TrackSource for GpxSource<R> {
    fn load(&mut self) -> Result<Track> {
        let doc = gpx::read(&mut self.reader).map_err(bounds_to_invalid_coordinate)?;

        let mut builder = TrackBuilder::new();
        for track in &doc.tracks {
            for segment in &track.segments {
                for point in &segment.points {
                    let geo = point.point();
                    builder.push_lat_lon(geo.y(), geo.x())?;
                }
            }
        }

        debug!(
            "Loaded {} track points from {} GPX track(s)",
            builder.len(),
            doc.tracks.len()
        );
        Ok(builder.build())
    }
}

/// The gpx parser range-checks `trkpt` attributes itself; report those
/// failures as `InvalidCoordinate`. The coordinate it did not check is NaN.
fn bounds_to_invalid_coordinate(err: GpxError) -> TrackError {
    match err {
        GpxError::LonLatOutOfBoundsError(field, _, value) => {
            if field.eq_ignore_ascii_case("latitude") {
                TrackError::InvalidCoordinate {
                    lat: value,
                    lon: f64::NAN,
                }
            } else {
                TrackError::InvalidCoordinate {
                    lat: f64::NAN,
                    lon: value,
                }
            }
        }
        other => TrackError::from(other),
    }
}

/// Parse a GPX document held in memory
pub fn parse_gpx_str(input: &str) -> Result<Track> {
    GpxSource::new(input.as_bytes()).load()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>ride</name>
    <trkseg>
      <trkpt lat="49.0000" lon="8.0000"><ele>120.0</ele></trkpt>
      <trkpt lat="49.0010" lon="8.0005"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="49.0020" lon="8.0010"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="49.0030" lon="8.0015"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_parse_flattens_segments_in_order() {
        let track = parse_gpx_str(TWO_SEGMENTS).unwrap();
        assert_eq!(track.len(), 4);
        let lats: Vec<f64> = track.iter().map(|c| c.lat()).collect();
        assert_eq!(lats, vec![49.0, 49.001, 49.002, 49.003]);
        assert_eq!(track[3].lon(), 8.0015);
    }

    #[test]
    fn test_parse_empty_track() {
        let doc = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg></trkseg></trk>
</gpx>"#;
        let track = parse_gpx_str(doc).unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let result = parse_gpx_str("<gpx><trk><trkseg><trkpt lat=");
        assert!(matches!(result, Err(TrackError::Gpx(_))));
    }

    #[test]
    fn test_parse_out_of_range_latitude() {
        let doc = TWO_SEGMENTS.replace(r#"lat="49.0020""#, r#"lat="91.0""#);
        match parse_gpx_str(&doc) {
            Err(TrackError::InvalidCoordinate { lat, .. }) => assert_eq!(lat, 91.0),
            other => panic!("expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_out_of_range_longitude() {
        let doc = TWO_SEGMENTS.replace(r#"lon="8.0015""#, r#"lon="-200.5""#);
        match parse_gpx_str(&doc) {
            Err(TrackError::InvalidCoordinate { lon, .. }) => assert_eq!(lon, -200.5),
            other => panic!("expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let result = GpxSource::open("/nonexistent/track.gpx");
        assert!(matches!(result, Err(TrackError::Io(_))));
    }

    #[test]
    fn test_track_as_source() {
        let mut track = Track::from_lat_lon(vec![(1.0, 2.0)]).unwrap();
        let loaded = track.load().unwrap();
        assert_eq!(loaded, track);
    }
}
