// Kalman filter module
// Linear-Gaussian position model plus forward filter / RTS smoother

pub mod smoother;
pub mod state;

pub use smoother::KalmanSmoother;
pub use state::{KalmanState, ModelParams};
