//! Utilities around training a forecaster: learning rate schedules,
//! early stopping with checkpoints, losses and data scaling.
//! The optimization step itself is left to the caller.

#[macro_use]
extern crate log;

pub mod checkpoint;
mod early_stopping;
mod errors;
mod loss;
mod lr_schedule;
mod scaler;

pub use early_stopping::EarlyStopping;
pub use errors::{Result, TrainingError};
pub use loss::{mae, mse, WaveletMseLoss};
pub use lr_schedule::{LrAdjust, LrSchedule};
pub use scaler::StandardScaler;
