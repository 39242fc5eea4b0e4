use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track as GpxTrack, TrackSegment, Waypoint};
use tracing::debug;

use crate::constants::COORD_DECIMALS;
use crate::error::Result;
use crate::track::Track;

/// Trait for track writers
pub trait TrackSink {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Write a complete track
    fn write_track(&mut self, track: &Track) -> Result<()>;
}

/// GPX 1.1 output: one `trk` with one `trkseg` holding every point
pub struct GpxOutput<W: Write> {
    writer: W,
    creator: String,
}

impl GpxOutput<BufWriter<File>> {
    /// Create (or truncate) a GPX file on disk
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(GpxOutput::new(BufWriter::new(file)))
    }
}

impl<W: Write> GpxOutput<W> {
    pub fn new(writer: W) -> Self {
        GpxOutput {
            writer,
            creator: env!("CARGO_PKG_NAME").to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn build_document(&self, track: &Track) -> Gpx {
        let mut segment = TrackSegment::new();
        segment.points = track
            .iter()
            .map(|c| Waypoint::new(Point::new(round_coord(c.lon()), round_coord(c.lat()))))
            .collect();

        let mut trk = GpxTrack::new();
        trk.segments.push(segment);

        Gpx {
            version: GpxVersion::Gpx11,
            creator: Some(self.creator.clone()),
            tracks: vec![trk],
            ..Default::default()
        }
    }
}

impl<W: Write> TrackSink for GpxOutput<W> {
    fn name(&self) -> &str {
        "gpx"
    }

    fn write_track(&mut self, track: &Track) -> Result<()> {
        let doc = self.build_document(track);
        gpx::write(&doc, &mut self.writer)?;
        self.writer.flush()?;
        debug!("Wrote {} points as GPX", track.len());
        Ok(())
    }
}

/// Round degrees to `COORD_DECIMALS` places
fn round_coord(deg: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS as i32);
    (deg * scale).round() / scale
}

/// CSV output, `lat,lon` per line
pub struct CsvOutput<W: Write> {
    writer: W,
}

impl CsvOutput<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(CsvOutput::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvOutput<W> {
    pub fn new(writer: W) -> Self {
        CsvOutput { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TrackSink for CsvOutput<W> {
    fn name(&self) -> &str {
        "csv"
    }

    fn write_track(&mut self, track: &Track) -> Result<()> {
        writeln!(self.writer, "lat,lon")?;
        for c in track {
            writeln!(
                self.writer,
                "{:.prec$},{:.prec$}",
                c.lat(),
                c.lon(),
                prec = COORD_DECIMALS
            )?;
        }
        self.writer.flush()?;
        debug!("Wrote {} points as CSV", track.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_gpx_str;

    fn sample_track() -> Track {
        Track::from_lat_lon(vec![(52.520_008, 13.404_954), (52.520_9, 13.405_1), (-33.9, 151.2)])
            .unwrap()
    }

    #[test]
    fn test_gpx_output_readable() {
        let track = sample_track();
        let mut out = GpxOutput::new(Vec::new());
        out.write_track(&track).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("<trkseg>"));
        assert_eq!(text.matches("<trkpt").count(), 3);

        let back = parse_gpx_str(&text).unwrap();
        assert_eq!(back.len(), track.len());
        for (a, b) in back.iter().zip(track.iter()) {
            assert!((a.lat() - b.lat()).abs() < 1e-8);
            assert!((a.lon() - b.lon()).abs() < 1e-8);
        }
    }

    #[test]
    fn test_gpx_output_rounds_to_8_decimals() {
        let track = Track::from_lat_lon(vec![(0.123456789012, 1.0 / 3.0)]).unwrap();
        let mut out = GpxOutput::new(Vec::new());
        out.write_track(&track).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains(r#"lat="0.12345679""#), "{}", text);
        assert!(text.contains(r#"lon="0.33333333""#), "{}", text);
    }

    #[test]
    fn test_gpx_output_empty_track() {
        let mut out = GpxOutput::new(Vec::new());
        out.write_track(&Track::new()).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(parse_gpx_str(&text).unwrap().is_empty());
    }

    #[test]
    fn test_csv_output_format() {
        let track = Track::from_lat_lon(vec![(1.5, -2.25), (0.0, 0.0)]).unwrap();
        let mut out = CsvOutput::new(Vec::new());
        out.write_track(&track).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["lat,lon", "1.50000000,-2.25000000", "0.00000000,0.00000000"]);
    }

    #[test]
    fn test_sink_names() {
        assert_eq!(GpxOutput::new(Vec::new()).name(), "gpx");
        assert_eq!(CsvOutput::new(Vec::new()).name(), "csv");
    }
}
