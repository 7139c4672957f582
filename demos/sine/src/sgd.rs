use forecaster::{Linear, Result};
use nalgebra::{DMatrix, DVector};

/// One stochastic gradient descent step on the mean squared error of a single forecast
///
/// # Arguments:
/// features: Flattened reservoir states, the input of the readout
/// target: The `pred_len` values to forecast
///
/// # Returns:
/// The loss before the update
pub(crate) fn sgd_step(
    readout: &mut Linear,
    projection: &mut Linear,
    features: &DVector<f64>,
    target: &[f64],
    lr: f64,
) -> Result<f64> {
    let reservoir_size = projection.in_features();
    let window_len = projection.out_features();
    let pred_seg = target.len() / window_len;

    let future = readout.forward(features)?;
    let blocks = DMatrix::from_row_slice(pred_seg, reservoir_size, future.as_slice());
    let pred = projection.forward_rows(&blocks)?;
    let target = DMatrix::from_row_slice(pred_seg, window_len, target);

    let err = pred - target;
    let n = err.len() as f64;
    let loss = err.norm_squared() / n;

    // backpropagate through projection and readout
    let d_pred = err * (2.0 / n);
    let d_projection_w = d_pred.transpose() * &blocks;
    let d_projection_b = d_pred.row_sum();
    let d_blocks = &d_pred * projection.weight();
    let d_future = DVector::from_row_slice(d_blocks.transpose().as_slice());
    let d_readout_w = &d_future * features.transpose();

    let mut w = projection.weight_mut();
    w -= d_projection_w * lr;
    for (b, g) in projection.bias_mut().iter_mut().zip(d_projection_b.iter()) {
        *b -= lr * g;
    }
    let mut w = readout.weight_mut();
    w -= d_readout_w * lr;
    for (b, g) in readout.bias_mut().iter_mut().zip(d_future.iter()) {
        *b -= lr * g;
    }

    Ok(loss)
}
