//! Segment-wise forecasting with echo state networks.
//!
//! A series is cut into windows, the windows are fed through a reservoir,
//! the leading transient is washed out and the remaining states are mapped
//! by a trainable readout onto future reservoir sized blocks, which are
//! projected back into windows of the forecast.

#[macro_use]
extern crate log;

mod config;
mod errors;
mod linear;
mod model;
mod segment;
mod segment_forecaster;
mod strategy;

#[cfg(test)]
mod test_utils;

pub use config::ForecasterConfig;
pub use errors::{ConfigError, ForecastError, Result};
pub use linear::Linear;
pub use model::{EsnForecaster, StateDict};
pub use segment::{flatten, segment, unsegment, washout};
pub use segment_forecaster::SegmentForecaster;
pub use strategy::Strategy;
