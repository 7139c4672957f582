use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Construction time configuration of an [`EsnForecaster`](crate::EsnForecaster),
/// fixed for the lifetime of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecasterConfig {
    /// Length of the input series
    pub seq_len: usize,
    /// Length of the forecast
    pub pred_len: usize,
    /// Width of one segment, divides both `seq_len` and `pred_len`
    pub window_len: usize,
    /// Number of nodes in each reservoir
    pub reservoir_size: usize,
    /// Number of leading reservoir states to discard
    pub washout: usize,
    /// Give every channel its own reservoir, readout and projection
    pub individual: bool,
    /// Number of independent series in the input
    pub channels: usize,
    /// Spread the channels of individual mode over worker threads
    #[serde(default)]
    pub parallel: bool,
    /// Optional seed for the initialization of the linear layers
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ForecasterConfig {
    /// Load a configuration from a json file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    /// Number of windows in the input
    #[inline(always)]
    pub fn input_seg(&self) -> usize {
        self.seq_len.checked_div(self.window_len).unwrap_or(0)
    }

    /// Number of windows in the forecast
    #[inline(always)]
    pub fn pred_seg(&self) -> usize {
        self.pred_len.checked_div(self.window_len).unwrap_or(0)
    }

    /// Input width of the readout layer, zero if the washout consumes every window
    #[inline(always)]
    pub fn readout_in_features(&self) -> usize {
        self.input_seg().saturating_sub(self.washout) * self.reservoir_size
    }

    /// Output width of the readout layer
    #[inline(always)]
    pub fn readout_out_features(&self) -> usize {
        self.pred_seg() * self.reservoir_size
    }

    /// Check all invariants the forward pass relies on
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (name, v) in [
            ("seq_len", self.seq_len),
            ("pred_len", self.pred_len),
            ("window_len", self.window_len),
            ("reservoir_size", self.reservoir_size),
            ("channels", self.channels),
        ] {
            if v == 0 {
                return Err(ConfigError::ZeroDimension(name));
            }
        }
        if self.seq_len % self.window_len != 0 {
            return Err(ConfigError::SeqLenNotDivisible {
                seq_len: self.seq_len,
                window_len: self.window_len,
            });
        }
        if self.pred_len % self.window_len != 0 {
            return Err(ConfigError::PredLenNotDivisible {
                pred_len: self.pred_len,
                window_len: self.window_len,
            });
        }
        if self.washout >= self.input_seg() {
            return Err(ConfigError::WashoutTooLarge {
                washout: self.washout,
                input_seg: self.input_seg(),
            });
        }
        if !self.individual && self.channels != 1 {
            return Err(ConfigError::SharedMultiChannel {
                channels: self.channels,
            });
        }

        Ok(())
    }
}
