use common::{Activation, ReservoirParams};
use serde::{Deserialize, Serialize};

/// The parameters of the Echo State Network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Width of a single input vector, which is one window of the series
    pub input_dim: usize,
    /// Number of nodes in the reservoir
    pub reservoir_size: usize,
    /// Activation function of reservoir state transition
    pub reservoir_activation: Activation,
    /// Tunes the decay time of internal activity of the network
    /// The leaking rate a can be regarded as the speed of the reservoir
    /// update dynamics discretized in time. A leaking rate of 1.0 turns
    /// the leaky integrator into a plain echo state network.
    pub leaking_rate: f64,
    /// Initial value of state
    pub initial_state_value: f64,
}

impl Params {
    /// The usual choice for a forecaster: tanh reservoir, zero initial state
    pub fn tanh(input_dim: usize, reservoir_size: usize, leaking_rate: f64) -> Self {
        Self {
            input_dim,
            reservoir_size,
            reservoir_activation: Activation::Tanh,
            leaking_rate,
            initial_state_value: 0.0,
        }
    }
}

impl ReservoirParams for Params {
    #[inline(always)]
    fn initial_state_value(&self) -> f64 {
        self.initial_state_value
    }

    #[inline(always)]
    fn reservoir_size(&self) -> usize {
        self.reservoir_size
    }

    #[inline(always)]
    fn input_dim(&self) -> usize {
        self.input_dim
    }
}
