use nalgebra::{DMatrix, DMatrixViewMut, DVector, Dim, Matrix};
use nanorand::{Rng, WyRand};
use serde::{Deserialize, Serialize};

use crate::{ForecastError, Result};

/// A trainable affine layer, `y = W x + b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// `out_features` x `in_features`
    weight: DMatrix<f64>,
    bias: DVector<f64>,
}

impl Linear {
    /// Create a new layer with weights and biases drawn uniformly from
    /// `[-1/sqrt(in_features), 1/sqrt(in_features))`
    pub fn new(in_features: usize, out_features: usize, rng: &mut WyRand) -> Self {
        let bound = 1.0 / (in_features.max(1) as f64).sqrt();
        let weight: DMatrix<f64> = Matrix::from_fn_generic(
            Dim::from_usize(out_features),
            Dim::from_usize(in_features),
            |_, _| (rng.generate::<f64>() * 2.0 - 1.0) * bound,
        );
        let bias: DVector<f64> =
            Matrix::from_fn_generic(Dim::from_usize(out_features), Dim::from_usize(1), |_, _| {
                (rng.generate::<f64>() * 2.0 - 1.0) * bound
            });

        Self { weight, bias }
    }

    pub fn zeros(in_features: usize, out_features: usize) -> Self {
        Self {
            weight: DMatrix::zeros(out_features, in_features),
            bias: DVector::zeros(out_features),
        }
    }

    /// Square layer passing its input through unchanged
    pub fn identity(features: usize) -> Self {
        Self {
            weight: DMatrix::identity(features, features),
            bias: DVector::zeros(features),
        }
    }

    /// Assemble a layer from existing parameters
    pub fn from_parts(weight: DMatrix<f64>, bias: DVector<f64>) -> Result<Self> {
        if bias.len() != weight.nrows() {
            return Err(ForecastError::LayerShape {
                layer: "bias".to_string(),
                expected: (weight.nrows(), 1),
                got: (bias.len(), 1),
            });
        }

        Ok(Self { weight, bias })
    }

    #[inline(always)]
    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    #[inline(always)]
    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    #[inline(always)]
    pub fn weight(&self) -> &DMatrix<f64> {
        &self.weight
    }

    #[inline(always)]
    pub fn bias(&self) -> &DVector<f64> {
        &self.bias
    }

    /// Mutable access to the weights, the shape of the layer stays fixed
    pub fn weight_mut(&mut self) -> DMatrixViewMut<'_, f64> {
        let cols = self.weight.ncols();
        self.weight.columns_mut(0, cols)
    }

    pub fn bias_mut(&mut self) -> &mut [f64] {
        self.bias.as_mut_slice()
    }

    /// Set every weight and every bias to a constant
    pub fn fill(&mut self, weight: f64, bias: f64) {
        self.weight.fill(weight);
        self.bias.fill(bias);
    }

    /// Number of trainable parameters
    #[inline(always)]
    pub fn num_params(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    /// (weight rows, weight cols) and (bias rows, 1)
    pub(crate) fn shapes(&self) -> ((usize, usize), (usize, usize)) {
        (self.weight.shape(), (self.bias.len(), 1))
    }

    /// Apply the layer to a single input vector
    pub fn forward(&self, input: &DVector<f64>) -> Result<DVector<f64>> {
        if input.len() != self.in_features() {
            return Err(ForecastError::LayerInput {
                expected: self.in_features(),
                got: input.len(),
            });
        }

        Ok(&self.weight * input + &self.bias)
    }

    /// Apply the layer to every row of `inputs` with the same weights
    ///
    /// # Arguments:
    /// inputs: N rows of width `in_features`
    ///
    /// # Returns:
    /// N rows of width `out_features`
    pub fn forward_rows(&self, inputs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if inputs.ncols() != self.in_features() {
            return Err(ForecastError::LayerInput {
                expected: self.in_features(),
                got: inputs.ncols(),
            });
        }

        let mut out = inputs * self.weight.transpose();
        for mut row in out.row_iter_mut() {
            row += self.bias.transpose();
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_init_bounds() {
        let mut rng = WyRand::new_seed(0);
        let l = Linear::new(16, 3, &mut rng);
        assert_eq!(l.weight().shape(), (3, 16));
        assert_eq!(l.bias().len(), 3);
        assert_eq!(l.num_params(), 51);
        assert!(l.weight().iter().chain(l.bias().iter()).all(|v| v.abs() <= 0.25));

        let mut rng = WyRand::new_seed(0);
        assert_eq!(Linear::new(16, 3, &mut rng), l);
    }

    #[test]
    fn linear_forward() {
        let l = Linear::from_parts(
            DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 2.0, 0.0, 1.0, -1.0]),
            DVector::from_vec(vec![0.5, -0.5]),
        )
        .unwrap();
        let y = l.forward(&DVector::from_vec(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(y.as_slice(), &[7.5, -1.5]);

        match l.forward(&DVector::from_vec(vec![1.0, 2.0])) {
            Err(ForecastError::LayerInput { expected: 3, got: 2 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn linear_forward_rows_shares_weights() {
        let mut rng = WyRand::new_seed(3);
        let l = Linear::new(4, 2, &mut rng);
        let inputs = DMatrix::from_fn(3, 4, |i, j| (i + j) as f64);

        let out = l.forward_rows(&inputs).unwrap();
        assert_eq!(out.shape(), (3, 2));
        for i in 0..3 {
            let row = l.forward(&inputs.row(i).transpose()).unwrap();
            for j in 0..2 {
                assert!((out[(i, j)] - row[j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn linear_from_parts_rejects_bias() {
        assert!(Linear::from_parts(DMatrix::zeros(2, 3), DVector::zeros(3)).is_err());
    }

    #[test]
    fn linear_mutation_keeps_shape() {
        let mut l = Linear::zeros(3, 2);
        {
            let mut w = l.weight_mut();
            w[(1, 2)] = 4.0;
        }
        l.bias_mut()[0] = 1.0;
        let y = l.forward(&DVector::from_vec(vec![0.0, 0.0, 1.0])).unwrap();
        assert_eq!(y.as_slice(), &[1.0, 4.0]);

        l.fill(0.0, 2.0);
        assert!(l.weight().iter().all(|v| *v == 0.0));
        assert!(l.bias().iter().all(|v| *v == 2.0));

        let y = Linear::identity(2).forward(&DVector::from_vec(vec![3.0, 4.0])).unwrap();
        assert_eq!(y.as_slice(), &[3.0, 4.0]);
    }
}
