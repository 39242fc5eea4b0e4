pub mod constants;
pub mod error;
pub mod track;
pub mod geodesy;
pub mod kalman;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod config;

pub use error::{Result, TrackError};
pub use track::{Coordinate, Track, TrackBuilder};
