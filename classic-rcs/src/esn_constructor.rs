use nalgebra::{DMatrix, Dim, Matrix};
use nanorand::{Rng, WyRand};

use crate::{ReservoirConstructor, StateMatrix};

/// Constructs the weights of a classic Echo State Network
pub struct ESNConstructor {
    /// Controls the retention of information from previous time steps.
    /// The spectral radius determines how fast the influence of an input
    /// dies out in a reservoir with time, and how stable the reservoir
    /// activations are. The spectral radius should be greater in tasks
    /// requiring longer memory of the input.
    spectral_radius: f64,

    /// The width of one input vector
    input_dim: usize,

    /// The number of nodes in the reservoir
    reservoir_size: usize,

    /// How sparsly connected the reservoir will be
    reservoir_sparsity: f64,

    /// Scales the randomly generated biases
    reservoir_bias_scaling: f64,

    /// Probability of inputs connecting to state
    input_sparsity: f64,

    /// Scales the input weights
    input_weight_scaling: f64,

    rng: WyRand,
}

impl ESNConstructor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: Option<u64>,
        input_dim: usize,
        reservoir_size: usize,
        spectral_radius: f64,
        reservoir_sparsity: f64,
        reservoir_bias_scaling: f64,
        input_sparsity: f64,
        input_weight_scaling: f64,
    ) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        Self {
            spectral_radius,
            input_dim,
            reservoir_size,
            reservoir_sparsity,
            rng,
            reservoir_bias_scaling,
            input_sparsity,
            input_weight_scaling,
        }
    }
}

/// The largest absolute eigenvalue of a square matrix
pub fn spectral_radius(m: &DMatrix<f64>) -> f64 {
    if m.is_empty() {
        return 0.0;
    }
    m.complex_eigenvalues().iter().map(|c| c.re.hypot(c.im)).fold(0.0, f64::max)
}

impl ReservoirConstructor for ESNConstructor {
    fn construct_reservoir_weights(&mut self) -> DMatrix<f64> {
        let mut reservoir_matrix: DMatrix<f64> = Matrix::from_fn_generic(
            Dim::from_usize(self.reservoir_size),
            Dim::from_usize(self.reservoir_size),
            |_, _| {
                if self.rng.generate::<f64>() < self.reservoir_sparsity {
                    self.rng.generate::<f64>() * 2.0 - 1.0
                } else {
                    0.0
                }
            },
        );

        let spec_rad = spectral_radius(&reservoir_matrix);
        if spec_rad > 0.0 {
            reservoir_matrix *= (1.0 / spec_rad) * self.spectral_radius;
        } else {
            warn!("reservoir has no nonzero eigenvalue, skipping spectral radius scaling");
        }
        trace!("reservoir: {}", reservoir_matrix);

        reservoir_matrix
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

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn esn_constructor_spectral_radius() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut c = ESNConstructor::new(Some(0), 4, 30, 0.9, 0.3, 0.1, 1.0, 0.5);
        let weights = c.construct_reservoir_weights();
        assert_eq!(weights.shape(), (30, 30));

        let rad = spectral_radius(&weights);
        info!("spectral radius: {}", rad);
        assert_eq!(round(rad, 4), 0.9);
    }

    #[test]
    fn esn_constructor_input_weights() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut c = ESNConstructor::new(Some(0), 24, 8, 0.9, 0.1, 0.1, 1.0, 0.5);
        let w_in = c.construct_input_weight_matrix();
        assert_eq!(w_in.shape(), (8, 24));
        assert!(w_in.iter().all(|v| v.abs() <= 0.5));

        let biases = c.construct_reservoir_biases();
        assert_eq!(biases.nrows(), 8);
        assert!(biases.iter().all(|v| v.abs() <= 0.1));
    }

    #[test]
    fn spectral_radius_of_diagonal() {
        let m = DMatrix::from_diagonal(&StateMatrix::from_vec(vec![0.5, -2.0, 1.0]));
        assert_eq!(round(spectral_radius(&m), 6), 2.0);
        assert_eq!(spectral_radius(&DMatrix::zeros(0, 0)), 0.0);
    }

    #[test]
    fn spectral_radius_of_rotation() {
        // eigenvalues 0.6 +- 0.8i, the modulus of both is 1
        let m = DMatrix::from_row_slice(2, 2, &[0.6, -0.8, 0.8, 0.6]);
        assert_eq!(round(spectral_radius(&m), 6), 1.0);

        let m = m * 2.5;
        assert_eq!(round(spectral_radius(&m), 6), 2.5);
    }
}
