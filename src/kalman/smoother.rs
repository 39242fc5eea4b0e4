// Two-pass smoother: forward Kalman filter followed by a Rauch-Tung-Striebel
// backward recursion over the stored filter results.

use nalgebra::{Cholesky, Matrix2};
use tracing::{debug, warn};

use super::state::{symmetrize, KalmanState, ModelParams};
use crate::error::{Result, SmootherStage, TrackError};
use crate::track::{Track, TrackBuilder};

/// Filter output for one time step
#[derive(Debug, Clone, Copy)]
struct ForwardStep {
    /// Prior at this step (before seeing the observation)
    predicted: KalmanState,
    /// Posterior at this step
    filtered: KalmanState,
}

/// Offline Kalman smoother for a whole track
#[derive(Debug, Clone, Default)]
pub struct KalmanSmoother {
    params: ModelParams,
}

impl KalmanSmoother {
    pub fn new(params: ModelParams) -> Self {
        KalmanSmoother { params }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Smooth a track, returning a new track of the same length and order
    ///
    /// The initial state mean is the first raw coordinate; `initial_covariance`
    /// is the prior covariance on it (zero trusts the first fix outright).
    ///
    /// # Returns
    /// The smoothed track, or `NumericInstability` if any solve fails. No
    /// partial result is returned on failure.
    pub fn smooth(&self, track: &Track, initial_covariance: &Matrix2<f64>) -> Result<Track> {
        if track.len() < 2 {
            return Ok(track.clone());
        }

        let states = self.smooth_with_covariances(track, initial_covariance)?;

        let mut builder = TrackBuilder::with_capacity(states.len());
        for (step, state) in states.iter().enumerate() {
            let coord = state.to_coordinate().map_err(|_| TrackError::NumericInstability {
                step,
                stage: SmootherStage::Smoother,
            })?;
            builder.push(coord);
        }
        Ok(builder.build())
    }

    /// Smoothed mean and covariance for every step
    ///
    /// Empty input yields an empty vector; a single point yields its
    /// initial state unchanged.
    pub fn smooth_with_covariances(
        &self,
        track: &Track,
        initial_covariance: &Matrix2<f64>,
    ) -> Result<Vec<KalmanState>> {
        let first = match track.first() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        let initial = KalmanState::from_coordinate(first, symmetrize(initial_covariance));
        if track.len() == 1 {
            return Ok(vec![initial]);
        }

        debug!("Smoothing track of {} points", track.len());

        let forward = self.filter(track, initial).map_err(|e| {
            warn!("Forward filter failed: {}", e);
            e
        })?;
        let smoothed = self.backward(&forward).map_err(|e| {
            warn!("Backward smoother failed: {}", e);
            e
        })?;

        if let (Some(first), Some(last)) = (smoothed.first(), smoothed.last()) {
            debug!(
                "Smoothing done: first error {:.6} deg, last error {:.6} deg",
                first.position_error(),
                last.position_error()
            );
        }

        Ok(smoothed)
    }

    /// Forward predict/update pass
    fn filter(&self, track: &Track, initial: KalmanState) -> Result<Vec<ForwardStep>> {
        let mut steps: Vec<ForwardStep> = Vec::with_capacity(track.len());

        for (i, observation) in track.iter().enumerate() {
            let predicted = match steps.last() {
                None => initial,
                Some(prev) => prev.filtered.predict(&self.params),
            };
            let filtered = predicted.update(observation, &self.params, i)?;
            steps.push(ForwardStep {
                predicted,
                filtered,
            });
        }

        Ok(steps)
    }

    /// Backward RTS pass over completed filter output
    fn backward(&self, forward: &[ForwardStep]) -> Result<Vec<KalmanState>> {
        let n = forward.len();
        let mut smoothed = Vec::with_capacity(n);
        let last = match forward.last() {
            Some(step) => step.filtered,
            None => return Ok(smoothed),
        };
        smoothed.resize(n, last);

        let f = &self.params.transition;

        for i in (0..n - 1).rev() {
            let filtered = &forward[i].filtered;
            let next_pred = &forward[i + 1].predicted;
            let next_smoothed = smoothed[i + 1];

            let chol = Cholesky::new(next_pred.covariance).ok_or(
                TrackError::NumericInstability {
                    step: i,
                    stage: SmootherStage::Smoother,
                },
            )?;

            // J = P Fᵗ P_pred⁻¹  <=>  Jᵗ = P_pred⁻¹ F P
            let gain = chol.solve(&(f * filtered.covariance)).transpose();

            let mean = filtered.mean + gain * (next_smoothed.mean - next_pred.mean);
            let covariance = symmetrize(
                &(filtered.covariance
                    + gain * (next_smoothed.covariance - next_pred.covariance) * gain.transpose()),
            );

            let state = KalmanState::new(mean, covariance);
            if !state.is_finite() {
                return Err(TrackError::NumericInstability {
                    step: i,
                    stage: SmootherStage::Smoother,
                });
            }
            smoothed[i] = state;
        }

        Ok(smoothed)
    }
}
