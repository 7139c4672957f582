use std::slice;

use crate::SegmentForecaster;

/// How the channels of the input are mapped onto forecasters
#[derive(Debug, Clone)]
pub enum Strategy<R> {
    /// One forecaster for the single channel of the input
    Shared(SegmentForecaster<R>),
    /// One forecaster per channel, indexed by channel id
    PerChannel(Vec<SegmentForecaster<R>>),
}

impl<R> Strategy<R> {
    /// All forecasters, position i serves channel i
    #[inline(always)]
    pub fn forecasters(&self) -> &[SegmentForecaster<R>] {
        match self {
            Strategy::Shared(f) => slice::from_ref(f),
            Strategy::PerChannel(fs) => fs,
        }
    }

    #[inline(always)]
    pub fn forecasters_mut(&mut self) -> &mut [SegmentForecaster<R>] {
        match self {
            Strategy::Shared(f) => slice::from_mut(f),
            Strategy::PerChannel(fs) => fs,
        }
    }

    /// Names of the readout and projection layers of `channel` in a state dict
    pub fn layer_keys(&self, channel: usize) -> (String, String) {
        match self {
            Strategy::Shared(_) => ("readout".to_string(), "projection".to_string()),
            Strategy::PerChannel(_) => (
                format!("readout_layers.{}", channel),
                format!("projection_layers.{}", channel),
            ),
        }
    }
}
