use nalgebra::DMatrix;

use crate::StateMatrix;

/// Provides the abstraction needed for custom implementations of the reservoir generation process
pub trait ReservoirConstructor {
    /// Square matrix of recurrent weights, `reservoir_size` x `reservoir_size`
    fn construct_reservoir_weights(&mut self) -> DMatrix<f64>;

    fn construct_reservoir_biases(&mut self) -> StateMatrix;

    /// Maps one input vector onto the reservoir, `reservoir_size` x `input_dim`
    fn construct_input_weight_matrix(&mut self) -> DMatrix<f64>;
}
