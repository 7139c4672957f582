use nalgebra::{DMatrix, Dim, Matrix};
use nanorand::{Rng, WyRand};

use crate::{ReservoirConstructor, StateMatrix};

/// Constructs the weights of an Euler State Network,
/// which has an anti-symmetric recurrent matrix shifted by a small diffusion term
pub struct EUSNConstructor {
    rng: WyRand,
    input_dim: usize,
    reservoir_size: usize,
    reservoir_weight_scaling: f64,
    reservoir_bias_scaling: f64,
    input_sparsity: f64,
    input_weight_scaling: f64,

    /// diffusion coeffient used for stabilizing the discrete forward
    /// propagation
    gamma: f64,
}

impl EUSNConstructor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: Option<u64>,
        input_dim: usize,
        reservoir_size: usize,
        reservoir_weight_scaling: f64,
        reservoir_bias_scaling: f64,
        input_sparsity: f64,
        input_weight_scaling: f64,
        gamma: f64,
    ) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        Self {
            rng,
            input_dim,
            reservoir_size,
            reservoir_weight_scaling,
            reservoir_bias_scaling,
            input_sparsity,
            input_weight_scaling,
            gamma,
        }
    }
}

impl ReservoirConstructor for EUSNConstructor {
    fn construct_reservoir_weights(&mut self) -> DMatrix<f64> {
        let weights: DMatrix<f64> = Matrix::from_fn_generic(
            Dim::from_usize(self.reservoir_size),
            Dim::from_usize(self.reservoir_size),
            |_, _| (self.rng.generate::<f64>() * 2.0 - 1.0) * self.reservoir_weight_scaling,
        );
        let identity_m: DMatrix<f64> = DMatrix::identity(self.reservoir_size, self.reservoir_size);

        // This satisfies the constraint of being anti-symmetric
        (&weights - weights.transpose()) - (self.gamma * identity_m)
    }

    fn construct_reservoir_biases(&mut self) -> StateMatrix {
        Matrix::from_fn_generic(Dim::from_usize(self.reservoir_size), Dim::from_usize(1), |_, _| {
            (self.rng.generate::<f64>() * 2.0 - 1.0) * self.reservoir_bias_scaling
        })
    }

    fn construct_input_weight_matrix(&mut self) -> DMatrix<f64> {
        Matrix::from_fn_generic(
            Dim::from_usize(self.reservoir_size),
            Dim::from_usize(self.input_dim),
            |_, _| {
                if self.rng.generate::<f64>() < self.input_sparsity {
                    (self.rng.generate::<f64>() * 2.0 - 1.0) * self.input_weight_scaling
                } else {
                    0.0
                }
            },
        )
    }
}
