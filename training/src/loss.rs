use std::f64::consts::SQRT_2;

use nalgebra::DMatrix;

use crate::{Result, TrainingError};

fn check_shapes(pred: &[DMatrix<f64>], target: &[DMatrix<f64>]) -> Result<()> {
    if pred.len() != target.len() {
        return Err(TrainingError::ShapeMismatch {
            expected: (target.len(), 1),
            got: (pred.len(), 1),
        });
    }
    for (p, t) in pred.iter().zip(target.iter()) {
        if p.shape() != t.shape() {
            return Err(TrainingError::ShapeMismatch {
                expected: t.shape(),
                got: p.shape(),
            });
        }
    }

    Ok(())
}

fn mean_over<F>(pred: &[DMatrix<f64>], target: &[DMatrix<f64>], f: F) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    check_shapes(pred, target)?;
    let n: usize = target.iter().map(|t| t.len()).sum();
    if n == 0 {
        return Err(TrainingError::Empty);
    }
    let sum: f64 = pred
        .iter()
        .zip(target.iter())
        .flat_map(|(p, t)| p.iter().zip(t.iter()).map(|(p, t)| f(p - t)))
        .sum();

    Ok(sum / n as f64)
}

/// Mean squared error over a batch of (length, channels) matrices
pub fn mse(pred: &[DMatrix<f64>], target: &[DMatrix<f64>]) -> Result<f64> {
    mean_over(pred, target, |e| e * e)
}

/// Mean absolute error over a batch of (length, channels) matrices
pub fn mae(pred: &[DMatrix<f64>], target: &[DMatrix<f64>]) -> Result<f64> {
    mean_over(pred, target, f64::abs)
}

/// Mean squared error in the domain of a single level Haar wavelet decomposition.
/// Errors in the detail coefficients are usually weighted higher,
/// pushing the forecast to follow fast changes of the series.
#[derive(Debug, Clone, Copy)]
pub struct WaveletMseLoss {
    pub approx_weight: f64,
    pub detail_weight: f64,
}

impl Default for WaveletMseLoss {
    fn default() -> Self {
        Self {
            approx_weight: 1.0,
            detail_weight: 3.0,
        }
    }
}

impl WaveletMseLoss {
    /// Approximation and detail coefficients of every channel,
    /// filters `[1, 1] / sqrt(2)` and `[1, -1] / sqrt(2)` with a stride of 2.
    /// A trailing odd value is dropped.
    pub fn decompose(series: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
        let half = series.nrows() / 2;
        let approx =
            DMatrix::from_fn(half, series.ncols(), |k, c| (series[(2 * k, c)] + series[(2 * k + 1, c)]) / SQRT_2);
        let detail =
            DMatrix::from_fn(half, series.ncols(), |k, c| (series[(2 * k, c)] - series[(2 * k + 1, c)]) / SQRT_2);

        (approx, detail)
    }

    pub fn loss(&self, pred: &[DMatrix<f64>], target: &[DMatrix<f64>]) -> Result<f64> {
        check_shapes(pred, target)?;
        let (pred_a, pred_d): (Vec<_>, Vec<_>) = pred.iter().map(Self::decompose).unzip();
        let (target_a, target_d): (Vec<_>, Vec<_>) = target.iter().map(Self::decompose).unzip();

        let loss_approx = mse(&pred_a, &target_a)?;
        let loss_detail = mse(&pred_d, &target_d)?;
        trace!("wavelet loss: approx: {}, detail: {}", loss_approx, loss_detail);

        Ok(self.approx_weight * loss_approx + self.detail_weight * loss_detail)
    }
}
