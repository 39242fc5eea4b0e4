// Pipeline - glue between loader, distance, smoother and writers

use nalgebra::Matrix2;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::geodesy::total_distance;
use crate::input::TrackSource;
use crate::kalman::{KalmanSmoother, ModelParams};
use crate::output::TrackSink;
use crate::track::Track;

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Distance over the raw track, meters, 2 decimals
    pub raw_distance: f64,
    /// Distance over the smoothed track, meters, 2 decimals
    pub smoothed_distance: f64,
    /// Number of points in both tracks
    pub points: usize,
    #[serde(skip)]
    pub smoothed: Track,
}

impl PipelineReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Raw distance -> smoothing -> smoothed distance
pub struct TrackPipeline {
    smoother: KalmanSmoother,
    initial_covariance: Matrix2<f64>,
}

impl TrackPipeline {
    /// Create a pipeline
    ///
    /// # Arguments
    /// * `params` - Smoother model
    /// * `initial_covariance` - Prior covariance on the first coordinate
    pub fn new(params: ModelParams, initial_covariance: Matrix2<f64>) -> Self {
        TrackPipeline {
            smoother: KalmanSmoother::new(params),
            initial_covariance,
        }
    }

    pub fn smoother(&self) -> &KalmanSmoother {
        &self.smoother
    }

    /// Run the numeric stages over an in-memory track
    pub fn run(&self, track: &Track) -> Result<PipelineReport> {
        let raw_distance = total_distance(track);
        debug!("Raw distance over {} points: {:.2} m", track.len(), raw_distance);

        let smoothed = self.smoother.smooth(track, &self.initial_covariance)?;
        let smoothed_distance = total_distance(&smoothed);
        debug!("Smoothed distance: {:.2} m", smoothed_distance);

        Ok(PipelineReport {
            raw_distance,
            smoothed_distance,
            points: track.len(),
            smoothed,
        })
    }

    /// Load from a source, then run
    pub fn run_source(&self, source: &mut dyn TrackSource) -> Result<PipelineReport> {
        let track = source.load()?;
        info!("Loaded track with {} points", track.len());
        self.run(&track)
    }

    /// Hand the smoothed track to every sink, stopping at the first failure
    pub fn emit(&self, report: &PipelineReport, sinks: &mut [Box<dyn TrackSink>]) -> Result<()> {
        for sink in sinks.iter_mut() {
            sink.write_track(&report.smoothed)?;
            info!("Wrote smoothed track ({})", sink.name());
        }
        Ok(())
    }
}

impl Default for TrackPipeline {
    fn default() -> Self {
        TrackPipeline::new(ModelParams::default(), Matrix2::identity())
    }
}
