// Kalman filter state and linear-Gaussian model for position tracks

use nalgebra::{Cholesky, Matrix2, Vector2};

use crate::constants::{DEFAULT_OBSERVATION_NOISE_STD, DEFAULT_PROCESS_NOISE_STD};
use crate::error::{Result, SmootherStage, TrackError};
use crate::track::Coordinate;

/// Linear model driving the filter
///
/// State and observation are both `(lat, lon)` in degrees. With the default
/// identity transition this is a random walk with no velocity term.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// State transition matrix F
    pub transition: Matrix2<f64>,
    /// Observation matrix H
    pub observation: Matrix2<f64>,
    /// Process noise covariance Q
    pub process_noise: Matrix2<f64>,
    /// Observation noise covariance R
    pub observation_noise: Matrix2<f64>,
}

impl ModelParams {
    /// Random-walk model with `Q = diag(q_std², q_std²)` and `R = diag(r_std², r_std²)`
    ///
    /// # Arguments
    /// * `process_noise_std` - Standard deviation of the per-step drift (degrees), >= 0
    /// * `observation_noise_std` - Standard deviation of each observation (degrees), > 0
    pub fn random_walk(process_noise_std: f64, observation_noise_std: f64) -> Result<Self> {
        if !process_noise_std.is_finite() || process_noise_std < 0.0 {
            return Err(TrackError::Config(format!(
                "process noise must be finite and non-negative, got {}",
                process_noise_std
            )));
        }
        if !observation_noise_std.is_finite() || observation_noise_std <= 0.0 {
            return Err(TrackError::Config(format!(
                "observation noise must be finite and positive, got {}",
                observation_noise_std
            )));
        }

        let q = process_noise_std * process_noise_std;
        let r = observation_noise_std * observation_noise_std;

        Ok(ModelParams {
            transition: Matrix2::identity(),
            observation: Matrix2::identity(),
            process_noise: Matrix2::from_diagonal_element(q),
            observation_noise: Matrix2::from_diagonal_element(r),
        })
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        let q = DEFAULT_PROCESS_NOISE_STD * DEFAULT_PROCESS_NOISE_STD;
        let r = DEFAULT_OBSERVATION_NOISE_STD * DEFAULT_OBSERVATION_NOISE_STD;
        ModelParams {
            transition: Matrix2::identity(),
            observation: Matrix2::identity(),
            process_noise: Matrix2::from_diagonal_element(q),
            observation_noise: Matrix2::from_diagonal_element(r),
        }
    }
}

/// Belief about the true coordinate at one time step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanState {
    /// Mean `[lat, lon]`
    pub mean: Vector2<f64>,
    /// 2x2 covariance, symmetric PSD
    pub covariance: Matrix2<f64>,
}

impl KalmanState {
    pub fn new(mean: Vector2<f64>, covariance: Matrix2<f64>) -> Self {
        KalmanState { mean, covariance }
    }

    /// Initial state centred on a coordinate
    pub fn from_coordinate(coord: &Coordinate, covariance: Matrix2<f64>) -> Self {
        KalmanState {
            mean: observation_vector(coord),
            covariance,
        }
    }

    /// Time update: `x' = F x`, `P' = F P Fᵗ + Q`
    pub fn predict(&self, params: &ModelParams) -> KalmanState {
        let f = &params.transition;
        KalmanState {
            mean: f * self.mean,
            covariance: symmetrize(&(f * self.covariance * f.transpose() + params.process_noise)),
        }
    }

    /// Measurement update against one observed coordinate
    ///
    /// The gain is obtained with a Cholesky solve on the innovation
    /// covariance, and the posterior covariance uses the Joseph form so it
    /// stays symmetric PSD.
    ///
    /// # Arguments
    /// * `observation` - Observed coordinate at this step
    /// * `params` - Model matrices
    /// * `step` - Index of the step, reported on failure
    pub fn update(
        &self,
        observation: &Coordinate,
        params: &ModelParams,
        step: usize,
    ) -> Result<KalmanState> {
        let h = &params.observation;
        let r = &params.observation_noise;
        let p = &self.covariance;

        let s = symmetrize(&(h * p * h.transpose() + r));
        let chol = Cholesky::new(s).ok_or(TrackError::NumericInstability {
            step,
            stage: SmootherStage::Filter,
        })?;

        // K = P Hᵗ S⁻¹  <=>  Kᵗ = S⁻¹ H P
        let gain = chol.solve(&(h * p)).transpose();

        let innovation = observation_vector(observation) - h * self.mean;
        let mean = self.mean + gain * innovation;

        let ikh = Matrix2::identity() - gain * h;
        let covariance = symmetrize(&(ikh * p * ikh.transpose() + gain * r * gain.transpose()));

        let next = KalmanState { mean, covariance };
        if !next.is_finite() {
            return Err(TrackError::NumericInstability {
                step,
                stage: SmootherStage::Filter,
            });
        }
        Ok(next)
    }

    /// Position uncertainty, `sqrt(trace(P))`, in degrees
    pub fn position_error(&self) -> f64 {
        self.covariance.trace().max(0.0).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.mean.iter().all(|v| v.is_finite()) && self.covariance.iter().all(|v| v.is_finite())
    }

    /// Convert the mean back to a validated coordinate
    pub fn to_coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.mean[0], self.mean[1])
    }
}

/// Observation vector `[lat, lon]` for a coordinate
#[inline]
pub fn observation_vector(coord: &Coordinate) -> Vector2<f64> {
    Vector2::new(coord.lat(), coord.lon())
}

/// `(M + Mᵗ) / 2`, removes rounding asymmetry from covariance products
#[inline]
pub fn symmetrize(m: &Matrix2<f64>) -> Matrix2<f64> {
    (m + m.transpose()) * 0.5
}
