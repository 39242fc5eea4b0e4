use std::fs;

use trackfilter::input::{GpxSource, TrackSource};
use trackfilter::output::{CsvOutput, GpxOutput, TrackSink};
use trackfilter::pipeline::TrackPipeline;
use trackfilter::TrackError;

const MERIDIAN_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="fixture" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="0.0000" lon="0.0000"></trkpt>
      <trkpt lat="0.0009" lon="0.0000"></trkpt>
      <trkpt lat="0.0018" lon="0.0000"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

#[test]
fn test_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.gpx");
    let output = dir.path().join("out.gpx");
    let csv = dir.path().join("out.csv");
    fs::write(&input, MERIDIAN_GPX).unwrap();

    let pipeline = TrackPipeline::default();
    let mut source = GpxSource::open(&input).unwrap();
    let report = pipeline.run_source(&mut source).unwrap();
    assert_eq!(report.raw_distance, 200.15);
    assert!(report.smoothed_distance < report.raw_distance);

    let mut sinks: Vec<Box<dyn TrackSink>> = vec![
        Box::new(GpxOutput::create(&output).unwrap()),
        Box::new(CsvOutput::create(&csv).unwrap()),
    ];
    pipeline.emit(&report, &mut sinks).unwrap();
    drop(sinks);

    let written = GpxSource::open(&output).unwrap().load().unwrap();
    assert_eq!(written.len(), 3);
    for (a, b) in written.iter().zip(report.smoothed.iter()) {
        assert!((a.lat() - b.lat()).abs() < 1e-8);
        assert!((a.lon() - b.lon()).abs() < 1e-8);
    }

    let csv_text = fs::read_to_string(&csv).unwrap();
    assert_eq!(csv_text.lines().count(), 4);
    assert!(csv_text.starts_with("lat,lon\n"));
}

#[test]
fn test_out_of_range_point_rejected() {
    let doc = MERIDIAN_GPX.replace(r#"lat="0.0018""#, r#"lat="91.0""#);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.gpx");
    fs::write(&input, doc).unwrap();

    let mut source = GpxSource::open(&input).unwrap();
    let result = TrackPipeline::default().run_source(&mut source);
    match result {
        Err(TrackError::InvalidCoordinate { lat, .. }) => assert_eq!(lat, 91.0),
        other => panic!("expected InvalidCoordinate, got {:?}", other),
    }
}
