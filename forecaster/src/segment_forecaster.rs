use common::Reservoir;
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;

use crate::{
    flatten, segment, unsegment, washout, ConfigError, ForecastError, ForecasterConfig, Linear,
    Result,
};

/// Forecasts a single scalar series:
/// windows -> reservoir -> washout -> readout -> projection -> windows
#[derive(Debug, Clone)]
pub struct SegmentForecaster<R> {
    reservoir: R,
    readout: Linear,
    projection: Linear,
    window_len: usize,
    washout: usize,
    pred_seg: usize,
    reservoir_size: usize,
}

impl<R> SegmentForecaster<R>
where
    R: Reservoir,
{
    /// Create a new forecaster around `reservoir` with freshly initialized layers
    ///
    /// # Arguments:
    /// config: Validated here as well, so inconsistent dimensions fail before any layer is built
    /// channel: The channel this forecaster is built for, used in errors
    /// reservoir: Must consume windows of `window_len` and have `reservoir_size` nodes
    /// rng: Source of the initial layer weights
    pub fn new(
        config: &ForecasterConfig,
        channel: usize,
        reservoir: R,
        rng: &mut WyRand,
    ) -> Result<Self> {
        config.validate()?;

        let params = reservoir.params();
        let got = (params.input_dim(), params.reservoir_size());
        let expected = (config.window_len, config.reservoir_size);
        if got != expected {
            return Err(ConfigError::ReservoirMismatch {
                channel,
                expected,
                got,
            }
            .into());
        }

        let readout = Linear::new(config.readout_in_features(), config.readout_out_features(), rng);
        let projection = Linear::new(config.reservoir_size, config.window_len, rng);

        Ok(Self {
            reservoir,
            readout,
            projection,
            window_len: config.window_len,
            washout: config.washout,
            pred_seg: config.pred_seg(),
            reservoir_size: config.reservoir_size,
        })
    }

    #[inline(always)]
    pub fn reservoir(&self) -> &R {
        &self.reservoir
    }

    #[inline(always)]
    pub fn readout(&self) -> &Linear {
        &self.readout
    }

    #[inline(always)]
    pub fn readout_mut(&mut self) -> &mut Linear {
        &mut self.readout
    }

    #[inline(always)]
    pub fn projection(&self) -> &Linear {
        &self.projection
    }

    #[inline(always)]
    pub fn projection_mut(&mut self) -> &mut Linear {
        &mut self.projection
    }

    /// Both trainable layers at once, (readout, projection)
    #[inline(always)]
    pub fn layers_mut(&mut self) -> (&mut Linear, &mut Linear) {
        (&mut self.readout, &mut self.projection)
    }

    #[inline(always)]
    pub fn num_params(&self) -> usize {
        self.readout.num_params() + self.projection.num_params()
    }

    /// Flattened reservoir states of `series` after the washout,
    /// the input of the readout layer. Depends only on the fixed reservoir.
    pub fn features(&self, series: &[f64]) -> Result<DVector<f64>> {
        let windows = segment(series, self.window_len)?;
        let states = self.reservoir.advance(&windows);
        let washed = washout(&states, self.washout)?;
        debug!(
            "features: windows: {:?}, states: {:?}, washed: {:?}",
            windows.shape(),
            states.shape(),
            washed.shape()
        );

        Ok(flatten(&washed))
    }

    /// Map features onto the forecast windows, `pred_seg` x `window_len`
    pub fn decode(&self, features: &DVector<f64>) -> Result<DMatrix<f64>> {
        let future = self.readout.forward(features)?;
        if future.len() != self.pred_seg * self.reservoir_size {
            return Err(ForecastError::LayerShape {
                layer: "readout".to_string(),
                expected: (self.pred_seg * self.reservoir_size, 1),
                got: (future.len(), 1),
            });
        }
        let blocks = DMatrix::from_row_slice(self.pred_seg, self.reservoir_size, future.as_slice());

        let out = self.projection.forward_rows(&blocks)?;
        if out.ncols() != self.window_len {
            return Err(ForecastError::LayerShape {
                layer: "projection".to_string(),
                expected: (self.pred_seg, self.window_len),
                got: out.shape(),
            });
        }
        trace!("projected windows: {}", out);

        Ok(out)
    }

    /// Forecast `pred_len` values following `series`
    pub fn forecast(&self, series: &[f64]) -> Result<Vec<f64>> {
        let features = self.features(series)?;
        Ok(unsegment(&self.decode(&features)?))
    }

    /// Forecast column `channel` of every sample in the batch
    pub fn forecast_batch(&self, input: &[DMatrix<f64>], channel: usize) -> Result<Vec<Vec<f64>>> {
        input
            .iter()
            .map(|sample| {
                let series: Vec<f64> = sample.column(channel).iter().cloned().collect();
                self.forecast(&series)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{config, IdentityReservoir};

    #[test]
    fn segment_forecaster_identity_round_trip() {
        if let Err(_) = pretty_env_logger::try_init() {}

        // identity reservoir, readout and projection only drop the washed out windows
        let c = config(16, 12, 4, 4, 1, false, 1);
        let mut rng = WyRand::new_seed(0);
        let mut f = SegmentForecaster::new(&c, 0, IdentityReservoir::new(4), &mut rng).unwrap();
        *f.readout_mut() = Linear::identity(12);
        *f.projection_mut() = Linear::identity(4);

        let series: Vec<f64> = (0..16).map(|v| v as f64 * 0.5).collect();
        assert_eq!(f.forecast(&series).unwrap(), series[4..].to_vec());
    }

    #[test]
    fn segment_forecaster_rejects_reservoir() {
        let c = config(16, 8, 4, 6, 0, false, 1);
        let mut rng = WyRand::new_seed(0);
        match SegmentForecaster::new(&c, 2, IdentityReservoir::new(4), &mut rng) {
            Err(ForecastError::Config(ConfigError::ReservoirMismatch {
                channel: 2,
                expected: (4, 6),
                got: (4, 4),
            })) => {}
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn segment_forecaster_rejects_config() {
        let mut rng = WyRand::new_seed(0);

        let c = config(16, 8, 4, 4, 5, false, 1);
        match SegmentForecaster::new(&c, 0, IdentityReservoir::new(4), &mut rng) {
            Err(ForecastError::Config(ConfigError::WashoutTooLarge {
                washout: 5,
                input_seg: 4,
            })) => {}
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }

        let c = config(16, 8, 0, 4, 0, false, 1);
        assert!(matches!(
            SegmentForecaster::new(&c, 0, IdentityReservoir::new(4), &mut rng),
            Err(ForecastError::Config(ConfigError::ZeroDimension("window_len")))
        ));
    }

    #[test]
    fn segment_forecaster_rejects_series() {
        let c = config(16, 8, 4, 4, 0, false, 1);
        let mut rng = WyRand::new_seed(0);
        let f = SegmentForecaster::new(&c, 0, IdentityReservoir::new(4), &mut rng).unwrap();

        assert!(matches!(f.forecast(&[0.0; 15]), Err(ForecastError::Indivisible { .. })));
        // a shorter series changes the readout input width
        assert!(matches!(f.forecast(&[0.0; 12]), Err(ForecastError::LayerInput { .. })));
        assert_eq!(f.forecast(&[0.0; 16]).unwrap().len(), 8);
        assert_eq!(f.num_params(), 16 * 8 + 8 + 4 * 4 + 4);
    }

    #[test]
    fn segment_forecaster_rejects_replaced_layers() {
        let c = config(16, 8, 4, 4, 0, false, 1);
        let mut rng = WyRand::new_seed(0);
        let mut f = SegmentForecaster::new(&c, 0, IdentityReservoir::new(4), &mut rng).unwrap();
        let features = f.features(&[1.0; 16]).unwrap();
        assert_eq!(features.len(), 16);
        assert_eq!(f.decode(&features).unwrap().shape(), (2, 4));

        *f.projection_mut() = Linear::identity(4);
        *f.readout_mut() = Linear::zeros(16, 12);
        assert!(matches!(f.decode(&features), Err(ForecastError::LayerShape { .. })));

        *f.readout_mut() = Linear::zeros(16, 8);
        *f.projection_mut() = Linear::zeros(4, 3);
        match f.decode(&features) {
            Err(ForecastError::LayerShape { layer, got, .. }) => {
                assert_eq!(layer, "projection");
                assert_eq!(got, (2, 3));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
