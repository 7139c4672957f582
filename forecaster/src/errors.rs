use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

/// Inconsistent construction time configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDimension(&'static str),

    #[error("seq_len {seq_len} is not divisible by window_len {window_len}")]
    SeqLenNotDivisible { seq_len: usize, window_len: usize },

    #[error("pred_len {pred_len} is not divisible by window_len {window_len}")]
    PredLenNotDivisible { pred_len: usize, window_len: usize },

    #[error("washout {washout} must be smaller than the number of input segments {input_seg}")]
    WashoutTooLarge { washout: usize, input_seg: usize },

    #[error("shared mode only supports a single channel, got {channels}")]
    SharedMultiChannel { channels: usize },

    #[error(
        "reservoir of channel {channel} has (input_dim, reservoir_size) {got:?}, expected {expected:?}"
    )]
    ReservoirMismatch { channel: usize, expected: (usize, usize), got: (usize, usize) },
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("sample {sample} has shape {got:?}, expected (seq_len, channels) = {expected:?}")]
    ShapeMismatch { sample: usize, expected: (usize, usize), got: (usize, usize) },

    #[error("series of length {len} can not be cut into windows of length {window_len}")]
    Indivisible { len: usize, window_len: usize },

    #[error("washout {washout} leaves no states out of {len}")]
    Washout { washout: usize, len: usize },

    #[error("layer {layer} has shape {got:?}, expected {expected:?}")]
    LayerShape { layer: String, expected: (usize, usize), got: (usize, usize) },

    #[error("layer expects {expected} input features, got {got}")]
    LayerInput { expected: usize, got: usize },

    #[error("channel {channel} out of range for {channels} forecaster(s)")]
    UnknownChannel { channel: usize, channels: usize },

    #[error("parameter {0} is missing from the state dict")]
    MissingParameter(String),

    #[error("a channel worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
