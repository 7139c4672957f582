#[macro_use]
extern crate log;

mod sgd;

use std::{error::Error, fs, process, time::Instant};

use classic_rcs::{ESNConstructor, EchoStateNetwork, Params};
use dialoguer::{theme::ColorfulTheme, Select};
use forecaster::{EsnForecaster, ForecastError, ForecasterConfig};
use nalgebra::{DMatrix, DVector};
use time_series_generator::generate_sine_wave;
use training::{
    checkpoint, mse, EarlyStopping, LrAdjust, LrSchedule, StandardScaler, TrainingError, WaveletMseLoss,
};

const SEQ_LEN: usize = 96;
const PRED_LEN: usize = 48;
const WINDOW_LEN: usize = 24;
const RESERVOIR_SIZE: usize = 64;
const EPOCHS: usize = 30;
const SEED: Option<u64> = Some(0);
const CHECKPOINT_DIR: &str = "checkpoints/sine";

fn reservoir(channel: usize) -> EchoStateNetwork {
    let params = Params::tanh(WINDOW_LEN, RESERVOIR_SIZE, 0.3);
    let constructor = ESNConstructor::new(
        SEED.map(|s| s + channel as u64),
        WINDOW_LEN,
        RESERVOIR_SIZE,
        0.9,
        0.1,
        0.1,
        1.0,
        0.5,
    );
    EchoStateNetwork::new(params, constructor)
}

/// Sliding (input, target) pairs over the rows of `values`
fn samples(values: &DMatrix<f64>, step: usize) -> (Vec<DMatrix<f64>>, Vec<DMatrix<f64>>) {
    (0..=values.nrows() - SEQ_LEN - PRED_LEN)
        .step_by(step)
        .map(|start| {
            (
                values.rows(start, SEQ_LEN).into_owned(),
                values.rows(start + SEQ_LEN, PRED_LEN).into_owned(),
            )
        })
        .unzip()
}

fn column(m: &DMatrix<f64>, c: usize) -> Vec<f64> {
    m.column(c).iter().cloned().collect()
}

fn run() -> Result<(), Box<dyn Error>> {
    let modes = vec!["shared", "individual", "individual, parallel"];
    let mode = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select forecasting mode")
        .items(&modes)
        .default(0)
        .interact()?;
    let individual = mode > 0;
    let channels = if individual { 2 } else { 1 };

    let mut wave: Vec<f64> = generate_sine_wave(100);
    wave.append(&mut wave.clone());
    wave.append(&mut wave.clone());
    wave.append(&mut wave.clone());
    info!("got {} datapoints", wave.len());

    // the second channel lags a quarter period behind
    let n = wave.len() - 25;
    let values = DMatrix::from_fn(n, channels, |t, c| match c {
        0 => wave[t + 25],
        _ => 2.0 * wave[t],
    });

    let (inputs, targets) = samples(&values, 12);
    let n_train = inputs.len() * 7 / 10;
    let scaler = StandardScaler::fit(&inputs[..n_train])?;
    let scale = |ms: &[DMatrix<f64>]| -> Result<Vec<DMatrix<f64>>, TrainingError> {
        ms.iter().map(|m| scaler.transform(m)).collect()
    };
    let (inputs, targets) = (scale(&inputs)?, scale(&targets)?);
    let (train_x, val_x) = inputs.split_at(n_train);
    let (train_y, val_y) = targets.split_at(n_train);
    info!("train samples: {}, validation samples: {}", train_x.len(), val_x.len());

    let config = ForecasterConfig {
        seq_len: SEQ_LEN,
        pred_len: PRED_LEN,
        window_len: WINDOW_LEN,
        reservoir_size: RESERVOIR_SIZE,
        washout: 1,
        individual,
        channels,
        parallel: mode == 2,
        seed: SEED,
    };
    let mut model = EsnForecaster::new(config, reservoir)?;

    // the reservoirs are fixed, so their features only need to be computed once
    let t0 = Instant::now();
    let mut features: Vec<Vec<DVector<f64>>> = Vec::with_capacity(channels);
    for (c, f) in model.strategy().forecasters().iter().enumerate() {
        let channel_features = train_x
            .iter()
            .map(|x| f.features(&column(x, c)))
            .collect::<Result<Vec<_>, ForecastError>>()?;
        features.push(channel_features);
    }
    info!("harvested reservoir features in {}ms", t0.elapsed().as_millis());

    let mut schedule = LrSchedule::new(LrAdjust::Type3, 0.01);
    let mut early_stopping = EarlyStopping::new(5, true, 0.0);
    let wavelet = WaveletMseLoss::default();
    for epoch in 1..=EPOCHS {
        schedule.adjust(epoch, None);

        let mut train_loss = 0.0;
        for (c, channel_features) in features.iter().enumerate() {
            let (readout, projection) = model.layers_mut(c)?;
            for (h, y) in channel_features.iter().zip(train_y.iter()) {
                train_loss += sgd::sgd_step(readout, projection, h, &column(y, c), schedule.lr())?;
            }
        }
        train_loss /= (train_x.len() * channels) as f64;

        let val_pred = model.forward(val_x)?;
        let val_loss = mse(&val_pred, val_y)?;
        info!(
            "epoch {}: train mse: {:.6}, val mse: {:.6}, val wavelet: {:.6}",
            epoch,
            train_loss,
            val_loss,
            wavelet.loss(&val_pred, val_y)?
        );

        early_stopping.step(val_loss, &model.state_dict(), CHECKPOINT_DIR)?;
        if early_stopping.early_stop() {
            info!("Early stopping");
            break;
        }
    }

    model.load_state_dict(&checkpoint::load(CHECKPOINT_DIR)?)?;
    let val_pred = model.forward(val_x)?;
    info!("best val mse: {:.6}", mse(&val_pred, val_y)?);

    let last = val_x.len() - 1;
    let input = scaler.inverse_transform(&val_x[last])?;
    let truth = scaler.inverse_transform(&val_y[last])?;
    let pred = scaler.inverse_transform(&val_pred[last])?;
    fs::create_dir_all("img")?;
    for c in 0..channels {
        let mut gt = column(&input, c);
        let mut pd = gt.clone();
        gt.append(&mut column(&truth, c));
        pd.append(&mut column(&pred, c));
        let filename = format!("img/sine_forecast_{}_{}.png", mode, c);
        rc_plot::visual(&gt, Some(&pd), &filename, (1920, 1080))?;
    }

    Ok(())
}

pub(crate) fn main() {
    pretty_env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
