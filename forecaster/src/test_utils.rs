use classic_rcs::{ESNConstructor, EchoStateNetwork, Params};
use common::{Reservoir, ReservoirParams};
use nalgebra::DMatrix;

use crate::ForecasterConfig;

pub(crate) fn config(
    seq_len: usize,
    pred_len: usize,
    window_len: usize,
    reservoir_size: usize,
    washout: usize,
    individual: bool,
    channels: usize,
) -> ForecasterConfig {
    ForecasterConfig {
        seq_len,
        pred_len,
        window_len,
        reservoir_size,
        washout,
        individual,
        channels,
        parallel: false,
        seed: Some(0),
    }
}

/// Reservoir whose states are its inputs
#[derive(Debug, Clone)]
pub(crate) struct IdentityReservoir {
    params: Params,
}

impl IdentityReservoir {
    pub(crate) fn new(window_len: usize) -> Self {
        Self {
            params: Params::tanh(window_len, window_len, 1.0),
        }
    }
}

impl Reservoir for IdentityReservoir {
    fn params(&self) -> &dyn ReservoirParams {
        &self.params
    }

    fn advance(&self, inputs: &DMatrix<f64>) -> DMatrix<f64> {
        inputs.clone()
    }
}

pub(crate) fn esn(window_len: usize, reservoir_size: usize, seed: u64) -> EchoStateNetwork {
    let params = Params::tanh(window_len, reservoir_size, 0.5);
    let c = ESNConstructor::new(Some(seed), window_len, reservoir_size, 0.9, 0.3, 0.1, 1.0, 0.5);
    EchoStateNetwork::new(params, c)
}

/// A batch of sine waves, shifted per sample and channel
pub(crate) fn sine_batch(batch: usize, seq_len: usize, channels: usize) -> Vec<DMatrix<f64>> {
    (0..batch)
        .map(|b| {
            DMatrix::from_fn(seq_len, channels, |t, c| {
                ((t + 3 * b) as f64 * 0.2 + c as f64).sin() * (1.0 + c as f64)
            })
        })
        .collect()
}
