use nalgebra::{DMatrix, DVector};

use crate::{Result, TrainingError};

/// Standardizes every channel to zero mean and unit variance
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: DVector<f64>,
    std: DVector<f64>,
}

impl StandardScaler {
    pub fn new(mean: DVector<f64>, std: DVector<f64>) -> Self {
        Self { mean, std }
    }

    /// Estimate mean and standard deviation of each channel over all samples and timesteps.
    /// Channels without variance get a standard deviation of 1.
    pub fn fit(data: &[DMatrix<f64>]) -> Result<Self> {
        let channels = data.first().ok_or(TrainingError::Empty)?.ncols();
        let mut n = 0;
        let mut sum: DVector<f64> = DVector::zeros(channels);
        for m in data {
            if m.ncols() != channels {
                return Err(TrainingError::ShapeMismatch {
                    expected: (m.nrows(), channels),
                    got: m.shape(),
                });
            }
            n += m.nrows();
            for row in m.row_iter() {
                sum += row.transpose();
            }
        }
        if n == 0 {
            return Err(TrainingError::Empty);
        }
        let mean = sum / n as f64;

        let mut var: DVector<f64> = DVector::zeros(channels);
        for m in data {
            for row in m.row_iter() {
                let d = row.transpose() - &mean;
                var += d.component_mul(&d);
            }
        }
        let std = (var / n as f64).map(|v| if v > 0.0 { v.sqrt() } else { 1.0 });
        debug!("fitted scaler, mean: {}, std: {}", mean, std);

        Ok(Self { mean, std })
    }

    #[inline(always)]
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    #[inline(always)]
    pub fn std(&self) -> &DVector<f64> {
        &self.std
    }

    fn check(&self, data: &DMatrix<f64>) -> Result<()> {
        if data.ncols() != self.mean.len() {
            return Err(TrainingError::ShapeMismatch {
                expected: (data.nrows(), self.mean.len()),
                got: data.shape(),
            });
        }

        Ok(())
    }

    pub fn transform(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.check(data)?;
        Ok(DMatrix::from_fn(data.nrows(), data.ncols(), |t, c| {
            (data[(t, c)] - self.mean[c]) / self.std[c]
        }))
    }

    pub fn inverse_transform(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.check(data)?;
        Ok(DMatrix::from_fn(data.nrows(), data.ncols(), |t, c| {
            data[(t, c)] * self.std[c] + self.mean[c]
        }))
    }
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn scaler_fit_transform() {
        let data = vec![
            DMatrix::from_row_slice(2, 2, &[1.0, 5.0, 3.0, 5.0]),
            DMatrix::from_row_slice(2, 2, &[5.0, 5.0, 7.0, 5.0]),
        ];
        let scaler = StandardScaler::fit(&data).unwrap();
        assert_eq!(scaler.mean().as_slice(), &[4.0, 5.0]);
        assert_eq!(round(scaler.std()[0], 9), round(5.0_f64.sqrt(), 9));
        // constant channel
        assert_eq!(scaler.std()[1], 1.0);

        let scaled = scaler.transform(&data[1]).unwrap();
        assert_eq!(scaled[(0, 1)], 0.0);
        let restored = scaler.inverse_transform(&scaled).unwrap();
        for (a, b) in restored.iter().zip(data[1].iter()) {
            assert_eq!(round(*a, 9), *b);
        }
    }

    #[test]
    fn scaler_rejects_shapes() {
        assert!(matches!(StandardScaler::fit(&[]), Err(TrainingError::Empty)));
        let scaler = StandardScaler::new(DVector::zeros(2), DVector::from_element(2, 1.0));
        assert!(scaler.transform(&DMatrix::zeros(3, 3)).is_err());
        assert_eq!(scaler.transform(&DMatrix::zeros(3, 2)).unwrap(), DMatrix::zeros(3, 2));
    }
}
