use common::{Reservoir, ReservoirParams};
use nalgebra::{DMatrix, Dim, Matrix};

use crate::{Params, ReservoirConstructor, StateMatrix};

/// The Reservoir Computer, Leaky Echo State Network.
/// Only the reservoir dynamics live here, readouts are owned by the consumer.
#[derive(Debug, Clone)]
pub struct EchoStateNetwork {
    params: Params,
    input_weight_matrix: DMatrix<f64>,
    reservoir_weights: DMatrix<f64>,
    reservoir_biases: StateMatrix,
}

impl EchoStateNetwork {
    /// Create a new reservoir, with weights taken from the constructor
    ///
    /// # Arguments:
    /// params: The parameters
    /// reservoir_constructor: Generates recurrent, input and bias weights
    ///
    /// # Panics:
    /// If the constructor's matrices do not have the shapes implied by `params`,
    /// (reservoir_size, reservoir_size), (reservoir_size, input_dim) and reservoir_size biases
    pub fn new<C>(params: Params, mut reservoir_constructor: C) -> Self
    where
        C: ReservoirConstructor,
    {
        let reservoir_weights = reservoir_constructor.construct_reservoir_weights();
        let reservoir_biases = reservoir_constructor.construct_reservoir_biases();
        let input_weight_matrix = reservoir_constructor.construct_input_weight_matrix();

        assert_eq!(
            reservoir_weights.shape(),
            (params.reservoir_size, params.reservoir_size),
            "reservoir weights do not match reservoir_size"
        );
        assert_eq!(
            input_weight_matrix.shape(),
            (params.reservoir_size, params.input_dim),
            "input weights do not match (reservoir_size, input_dim)"
        );
        assert_eq!(reservoir_biases.nrows(), params.reservoir_size);
        debug!(
            "new EchoStateNetwork: input_dim: {}, reservoir_size: {}, leaking_rate: {}",
            params.input_dim, params.reservoir_size, params.leaking_rate
        );

        Self {
            params,
            input_weight_matrix,
            reservoir_weights,
            reservoir_biases,
        }
    }

    #[inline(always)]
    pub fn reservoir_weights(&self) -> &DMatrix<f64> {
        &self.reservoir_weights
    }

    #[inline(always)]
    pub fn input_weight_matrix(&self) -> &DMatrix<f64> {
        &self.input_weight_matrix
    }

    #[inline(always)]
    pub fn reservoir_biases(&self) -> &StateMatrix {
        &self.reservoir_biases
    }

    fn initial_state(&self) -> StateMatrix {
        Matrix::from_element_generic(
            Dim::from_usize(self.params.reservoir_size),
            Dim::from_usize(1),
            self.params.initial_state_value,
        )
    }
}

impl Reservoir for EchoStateNetwork {
    #[inline(always)]
    fn params(&self) -> &dyn ReservoirParams {
        &self.params
    }

    fn advance(&self, inputs: &DMatrix<f64>) -> DMatrix<f64> {
        assert_eq!(inputs.ncols(), self.params.input_dim, "input width must equal input_dim");

        let mut states: DMatrix<f64> = DMatrix::from_element_generic(
            Dim::from_usize(inputs.nrows()),
            Dim::from_usize(self.params.reservoir_size),
            0.0,
        );
        let mut state = self.initial_state();
        let a = self.params.leaking_rate;

        for i in 0..inputs.nrows() {
            let input: StateMatrix = inputs.row(i).transpose();
            let mut state_delta: StateMatrix = &self.input_weight_matrix * input
                + &self.reservoir_weights * &state
                + &self.reservoir_biases;
            self.params.reservoir_activation.activate(state_delta.as_mut_slice());

            // perform node-to-node update
            state = (1.0 - a) * &state + a * state_delta;
            states.set_row(i, &state.transpose());
        }

        states
    }
}
