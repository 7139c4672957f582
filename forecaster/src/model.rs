use std::collections::BTreeMap;

use common::Reservoir;
use nalgebra::DMatrix;
use nanorand::WyRand;

use crate::{ForecastError, ForecasterConfig, Linear, Result, SegmentForecaster, Strategy};

/// The trainable parameters of a model, keyed by layer name
pub type StateDict = BTreeMap<String, Linear>;

/// Echo state network forecaster over (batch, seq_len, channels) inputs
#[derive(Debug, Clone)]
pub struct EsnForecaster<R> {
    config: ForecasterConfig,
    strategy: Strategy<R>,
}

impl<R> EsnForecaster<R>
where
    R: Reservoir,
{
    /// Create a new forecaster
    ///
    /// # Arguments:
    /// config: Validated here, so an inconsistent configuration fails before any forward pass
    /// reservoir_factory: Called with the channel index for every reservoir needed,
    /// once in shared mode and `channels` times in individual mode
    pub fn new<F>(config: ForecasterConfig, mut reservoir_factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> R,
    {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };
        let strategy = if config.individual {
            let forecasters = (0..config.channels)
                .map(|c| SegmentForecaster::new(&config, c, reservoir_factory(c), &mut rng))
                .collect::<Result<Vec<_>>>()?;
            Strategy::PerChannel(forecasters)
        } else {
            Strategy::Shared(SegmentForecaster::new(&config, 0, reservoir_factory(0), &mut rng)?)
        };

        let model = Self { config, strategy };
        info!(
            "built forecaster: individual: {}, channels: {}, input_seg: {}, pred_seg: {}, params: {}",
            model.config.individual,
            model.config.channels,
            model.config.input_seg(),
            model.config.pred_seg(),
            model.num_params()
        );

        Ok(model)
    }

    #[inline(always)]
    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    #[inline(always)]
    pub fn strategy(&self) -> &Strategy<R> {
        &self.strategy
    }

    pub fn num_params(&self) -> usize {
        self.strategy.forecasters().iter().map(|f| f.num_params()).sum()
    }

    fn forecaster(&self, channel: usize) -> Result<&SegmentForecaster<R>> {
        let forecasters = self.strategy.forecasters();
        forecasters.get(channel).ok_or(ForecastError::UnknownChannel {
            channel,
            channels: forecasters.len(),
        })
    }

    fn forecaster_mut(&mut self, channel: usize) -> Result<&mut SegmentForecaster<R>> {
        let forecasters = self.strategy.forecasters_mut();
        let channels = forecasters.len();
        forecasters
            .get_mut(channel)
            .ok_or(ForecastError::UnknownChannel { channel, channels })
    }

    /// The readout layer serving `channel`, only channel 0 exists in shared mode
    pub fn readout(&self, channel: usize) -> Result<&Linear> {
        Ok(self.forecaster(channel)?.readout())
    }

    pub fn readout_mut(&mut self, channel: usize) -> Result<&mut Linear> {
        Ok(self.forecaster_mut(channel)?.readout_mut())
    }

    /// The projection layer serving `channel`, only channel 0 exists in shared mode
    pub fn projection(&self, channel: usize) -> Result<&Linear> {
        Ok(self.forecaster(channel)?.projection())
    }

    pub fn projection_mut(&mut self, channel: usize) -> Result<&mut Linear> {
        Ok(self.forecaster_mut(channel)?.projection_mut())
    }

    /// Readout and projection of `channel`, for optimizers updating both
    pub fn layers_mut(&mut self, channel: usize) -> Result<(&mut Linear, &mut Linear)> {
        Ok(self.forecaster_mut(channel)?.layers_mut())
    }

    /// Forecast every sample of the batch
    ///
    /// # Arguments:
    /// input: One `seq_len` x `channels` matrix per sample
    ///
    /// # Returns:
    /// One `pred_len` x `channels` matrix per sample
    pub fn forward(&self, input: &[DMatrix<f64>]) -> Result<Vec<DMatrix<f64>>> {
        let expected = (self.config.seq_len, self.config.channels);
        for (sample, m) in input.iter().enumerate() {
            if m.shape() != expected {
                return Err(ForecastError::ShapeMismatch {
                    sample,
                    expected,
                    got: m.shape(),
                });
            }
        }

        let forecasts = match &self.strategy {
            Strategy::Shared(f) => vec![(0, f.forecast_batch(input, 0)?)],
            Strategy::PerChannel(fs) => {
                if self.config.parallel && fs.len() > 1 {
                    forecast_parallel(fs, input)?
                } else {
                    fs.iter()
                        .enumerate()
                        .map(|(c, f)| f.forecast_batch(input, c).map(|preds| (c, preds)))
                        .collect::<Result<Vec<_>>>()?
                }
            }
        };

        let mut out = vec![DMatrix::zeros(self.config.pred_len, self.config.channels); input.len()];
        for (channel, preds) in forecasts {
            for (sample, pred) in out.iter_mut().zip(preds.iter()) {
                sample.column_mut(channel).copy_from_slice(pred);
            }
        }

        Ok(out)
    }

    /// Snapshot of all trainable parameters
    pub fn state_dict(&self) -> StateDict {
        let mut dict = StateDict::new();
        for (c, f) in self.strategy.forecasters().iter().enumerate() {
            let (readout_key, projection_key) = self.strategy.layer_keys(c);
            dict.insert(readout_key, f.readout().clone());
            dict.insert(projection_key, f.projection().clone());
        }

        dict
    }

    /// Replace all trainable parameters.
    /// Nothing is changed unless every layer is present with matching shapes.
    pub fn load_state_dict(&mut self, dict: &StateDict) -> Result<()> {
        let mut layers = Vec::with_capacity(self.strategy.forecasters().len());
        for (c, f) in self.strategy.forecasters().iter().enumerate() {
            let (readout_key, projection_key) = self.strategy.layer_keys(c);
            let readout = checked_layer(dict, &readout_key, f.readout())?;
            let projection = checked_layer(dict, &projection_key, f.projection())?;
            layers.push((readout.clone(), projection.clone()));
        }

        for (f, (readout, projection)) in self.strategy.forecasters_mut().iter_mut().zip(layers) {
            *f.readout_mut() = readout;
            *f.projection_mut() = projection;
        }
        debug!("loaded {} layers", dict.len());

        Ok(())
    }
}

fn checked_layer<'a>(dict: &'a StateDict, key: &str, current: &Linear) -> Result<&'a Linear> {
    let layer = dict.get(key).ok_or_else(|| ForecastError::MissingParameter(key.to_string()))?;
    let (weight, bias) = layer.shapes();
    let (expected_weight, expected_bias) = current.shapes();
    if weight != expected_weight {
        return Err(ForecastError::LayerShape {
            layer: format!("{}.weight", key),
            expected: expected_weight,
            got: weight,
        });
    }
    if bias != expected_bias {
        return Err(ForecastError::LayerShape {
            layer: format!("{}.bias", key),
            expected: expected_bias,
            got: bias,
        });
    }

    Ok(layer)
}

/// Forecast the channels on scoped worker threads.
/// Every worker owns a contiguous chunk of channels and reports them by index.
fn forecast_parallel<R>(
    forecasters: &[SegmentForecaster<R>],
    input: &[DMatrix<f64>],
) -> Result<Vec<(usize, Vec<Vec<f64>>)>>
where
    R: Reservoir,
{
    let workers = num_cpus::get().max(1);
    let chunk_len = (forecasters.len() + workers - 1) / workers;
    debug!("forecasting {} channels in chunks of {}", forecasters.len(), chunk_len);

    let results = crossbeam::scope(|s| {
        let handles: Vec<_> = forecasters
            .chunks(chunk_len)
            .enumerate()
            .map(|(k, chunk)| {
                s.spawn(move |_| {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(j, f)| {
                            let channel = k * chunk_len + j;
                            f.forecast_batch(input, channel).map(|preds| (channel, preds))
                        })
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| ForecastError::WorkerPanicked).and_then(|r| r))
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| ForecastError::WorkerPanicked)??;

    Ok(results.into_iter().flatten().collect())
}
