use std::path::Path;

use forecaster::StateDict;

use crate::{checkpoint, Result};

/// Stops training once the validation loss has not improved for `patience` epochs.
/// Every improvement is saved as a checkpoint.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    verbose: bool,
    /// Minimum change of the score counting as an improvement
    delta: f64,
    counter: usize,
    best_score: Option<f64>,
    early_stop: bool,
    val_loss_min: f64,
}

impl EarlyStopping {
    pub fn new(patience: usize, verbose: bool, delta: f64) -> Self {
        Self {
            patience,
            verbose,
            delta,
            counter: 0,
            best_score: None,
            early_stop: false,
            val_loss_min: f64::INFINITY,
        }
    }

    /// Whether training should stop
    #[inline(always)]
    pub fn early_stop(&self) -> bool {
        self.early_stop
    }

    #[inline(always)]
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// The lowest validation loss that was checkpointed
    #[inline(always)]
    pub fn val_loss_min(&self) -> f64 {
        self.val_loss_min
    }

    /// Observe the validation loss of an epoch
    ///
    /// # Arguments:
    /// val_loss: The validation loss
    /// state: The current parameters, saved if the loss improved
    /// dir: Directory of the checkpoint
    pub fn step<P: AsRef<Path>>(&mut self, val_loss: f64, state: &StateDict, dir: P) -> Result<()> {
        let score = -val_loss;
        match self.best_score {
            Some(best) if score < best + self.delta => {
                self.counter += 1;
                info!("EarlyStopping counter: {} out of {}", self.counter, self.patience);
                if self.counter >= self.patience {
                    self.early_stop = true;
                }
            }
            _ => {
                self.best_score = Some(score);
                self.save_checkpoint(val_loss, state, dir)?;
                self.counter = 0;
            }
        }

        Ok(())
    }

    fn save_checkpoint<P: AsRef<Path>>(&mut self, val_loss: f64, state: &StateDict, dir: P) -> Result<()> {
        if self.verbose {
            info!(
                "Validation loss decreased ({:.6} --> {:.6}).  Saving model ...",
                self.val_loss_min, val_loss
            );
        }
        checkpoint::save(state, dir)?;
        self.val_loss_min = val_loss;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use forecaster::Linear;

    use super::*;

    #[test]
    fn early_stopping_patience() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let dir = std::env::temp_dir().join(format!("early_stopping_{}", std::process::id()));
        let mut state = StateDict::new();
        state.insert("projection".to_string(), Linear::identity(2));

        let mut es = EarlyStopping::new(2, true, 0.0);
        es.step(1.0, &state, &dir).unwrap();
        assert_eq!(es.val_loss_min(), 1.0);
        assert!(dir.join(checkpoint::CHECKPOINT_FILE).exists());

        // improvement resets the counter
        es.step(1.5, &state, &dir).unwrap();
        assert_eq!(es.counter(), 1);
        state.insert("projection".to_string(), Linear::zeros(2, 2));
        es.step(0.5, &state, &dir).unwrap();
        assert_eq!(es.counter(), 0);
        assert_eq!(es.val_loss_min(), 0.5);
        assert_eq!(checkpoint::load(&dir).unwrap(), state);

        // an equal loss is not worse, a worse loss twice in a row stops
        es.step(0.5, &state, &dir).unwrap();
        assert_eq!(es.counter(), 0);
        es.step(0.7, &state, &dir).unwrap();
        assert!(!es.early_stop());
        es.step(0.8, &state, &dir).unwrap();
        assert!(es.early_stop());
        assert_eq!(es.val_loss_min(), 0.5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn early_stopping_delta() {
        let dir = std::env::temp_dir().join(format!("early_stopping_delta_{}", std::process::id()));
        let state = StateDict::new();

        // improvements smaller than delta do not count
        let mut es = EarlyStopping::new(1, false, 0.1);
        es.step(1.0, &state, &dir).unwrap();
        es.step(0.95, &state, &dir).unwrap();
        assert!(es.early_stop());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
