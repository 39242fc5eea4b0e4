use clap::Parser;
use nalgebra::Matrix2;

use crate::constants::{
    DEFAULT_INITIAL_COVARIANCE, DEFAULT_OBSERVATION_NOISE_STD, DEFAULT_OUTPUT_FILE,
    DEFAULT_PROCESS_NOISE_STD,
};
use crate::error::{Result, TrackError};
use crate::kalman::ModelParams;

/// Track distance and Kalman smoothing
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input GPX file
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Write the smoothed track as GPX to this file.
    #[arg(long, short, value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,

    /// Also write the smoothed track as CSV (lat,lon) to this file.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<String>,

    /// Print the distance report as JSON instead of plain lines.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Process noise standard deviation in degrees (Q = diag(q^2, q^2)).
    #[arg(long, value_name = "STD", default_value_t = DEFAULT_PROCESS_NOISE_STD)]
    pub process_noise: f64,

    /// Observation noise standard deviation in degrees (R = diag(r^2, r^2)).
    #[arg(long, value_name = "STD", default_value_t = DEFAULT_OBSERVATION_NOISE_STD)]
    pub observation_noise: f64,

    /// Diagonal of the prior covariance on the first point.
    #[arg(long, value_name = "VAR", default_value_t = DEFAULT_INITIAL_COVARIANCE)]
    pub initial_covariance: f64,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Smoother model from the noise arguments
    pub fn model_params(&self) -> Result<ModelParams> {
        ModelParams::random_walk(self.process_noise, self.observation_noise)
    }

    /// Prior covariance from `--initial-covariance`
    pub fn initial_covariance(&self) -> Result<Matrix2<f64>> {
        if !self.initial_covariance.is_finite() || self.initial_covariance < 0.0 {
            return Err(TrackError::Config(format!(
                "initial covariance must be finite and non-negative, got {}",
                self.initial_covariance
            )));
        }
        Ok(Matrix2::from_diagonal_element(self.initial_covariance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["trackfilter", "ride.gpx"]);
        assert_eq!(config.input, "ride.gpx");
        assert_eq!(config.output, "out.gpx");
        assert!(config.csv.is_none());
        assert!(!config.json);
        assert!(!config.verbose);
        assert_eq!(config.model_params().unwrap(), ModelParams::default());
        assert_eq!(config.initial_covariance().unwrap(), Matrix2::identity());
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "trackfilter",
            "ride.gpx",
            "--output",
            "smooth.gpx",
            "--csv",
            "smooth.csv",
            "--process-noise",
            "0.1",
            "--observation-noise",
            "2",
            "--initial-covariance",
            "0.5",
            "-v",
        ]);
        assert_eq!(config.output, "smooth.gpx");
        assert_eq!(config.csv.as_deref(), Some("smooth.csv"));
        assert!(config.verbose);

        let params = config.model_params().unwrap();
        assert!((params.process_noise[(0, 0)] - 0.01).abs() < 1e-12);
        assert_eq!(params.observation_noise[(1, 1)], 4.0);
        assert_eq!(config.initial_covariance().unwrap()[(0, 0)], 0.5);
    }

    #[test]
    fn test_zero_initial_covariance() {
        let config =
            Config::parse_from(["trackfilter", "ride.gpx", "--initial-covariance", "0"]);
        assert_eq!(config.initial_covariance().unwrap(), Matrix2::zeros());
    }

    #[test]
    fn test_negative_initial_covariance() {
        let config =
            Config::parse_from(["trackfilter", "ride.gpx", "--initial-covariance=-1"]);
        assert!(matches!(config.initial_covariance(), Err(TrackError::Config(_))));
    }
}
