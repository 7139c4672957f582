use std::str::FromStr;

use crate::TrainingError;

/// Rule for adjusting the learning rate at the start of an epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LrAdjust {
    /// Halve the learning rate every epoch
    Type1,
    /// Fixed table of learning rates for selected epochs
    Type2,
    /// Keep the learning rate for two epochs, then decay by 0.8 per epoch
    Type3,
    /// Never change the learning rate
    Constant,
    /// Drop to a tenth of the learning rate once `epoch` reaches `until`
    StepDecay { until: usize },
    /// Follow an external scheduler
    Tst,
}

impl FromStr for LrAdjust {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type1" => Ok(LrAdjust::Type1),
            "type2" => Ok(LrAdjust::Type2),
            "type3" => Ok(LrAdjust::Type3),
            "constant" => Ok(LrAdjust::Constant),
            "3" => Ok(LrAdjust::StepDecay { until: 10 }),
            "4" => Ok(LrAdjust::StepDecay { until: 15 }),
            "5" => Ok(LrAdjust::StepDecay { until: 25 }),
            "6" => Ok(LrAdjust::StepDecay { until: 5 }),
            "TST" => Ok(LrAdjust::Tst),
            _ => Err(TrainingError::UnknownLrAdjust(s.to_string())),
        }
    }
}

const TYPE2_TABLE: [(usize, f64); 7] =
    [(2, 5e-5), (4, 1e-5), (6, 5e-6), (8, 1e-6), (10, 5e-7), (15, 1e-7), (20, 5e-8)];

impl LrAdjust {
    /// The learning rate for `epoch`, if this rule has an entry for it
    ///
    /// # Arguments:
    /// epoch: Counting from 1
    /// base_lr: The initial learning rate
    /// scheduler_lr: Last learning rate of an external scheduler, only used by `Tst`
    pub fn learning_rate(&self, epoch: usize, base_lr: f64, scheduler_lr: Option<f64>) -> Option<f64> {
        match self {
            LrAdjust::Type1 => Some(base_lr * 0.5_f64.powi(epoch as i32 - 1)),
            LrAdjust::Type2 => TYPE2_TABLE.iter().find(|(e, _)| *e == epoch).map(|(_, lr)| *lr),
            LrAdjust::Type3 => {
                if epoch < 3 {
                    Some(base_lr)
                } else {
                    Some(base_lr * 0.8_f64.powi(epoch as i32 - 3))
                }
            }
            LrAdjust::Constant => Some(base_lr),
            LrAdjust::StepDecay { until } => {
                if epoch < *until {
                    Some(base_lr)
                } else {
                    Some(base_lr * 0.1)
                }
            }
            LrAdjust::Tst => scheduler_lr,
        }
    }
}

/// Tracks the learning rate of a training run
#[derive(Debug, Clone)]
pub struct LrSchedule {
    adjust: LrAdjust,
    base_lr: f64,
    lr: f64,
    printout: bool,
}

impl LrSchedule {
    pub fn new(adjust: LrAdjust, base_lr: f64) -> Self {
        Self {
            adjust,
            base_lr,
            lr: base_lr,
            printout: true,
        }
    }

    /// Silence the log line emitted on every update
    pub fn quiet(mut self) -> Self {
        self.printout = false;
        self
    }

    #[inline(always)]
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Apply the rule for `epoch`, returning the new learning rate if it was updated
    pub fn adjust(&mut self, epoch: usize, scheduler_lr: Option<f64>) -> Option<f64> {
        let lr = self.adjust.learning_rate(epoch, self.base_lr, scheduler_lr)?;
        self.lr = lr;
        if self.printout {
            info!("Updating learning rate to {}", lr);
        }

        Some(lr)
    }
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn lr_adjust_from_str() {
        assert_eq!("type1".parse::<LrAdjust>().unwrap(), LrAdjust::Type1);
        assert_eq!("6".parse::<LrAdjust>().unwrap(), LrAdjust::StepDecay { until: 5 });
        assert_eq!("TST".parse::<LrAdjust>().unwrap(), LrAdjust::Tst);
        assert!(matches!(
            "cosine".parse::<LrAdjust>(),
            Err(TrainingError::UnknownLrAdjust(s)) if s == "cosine"
        ));
    }

    #[test]
    fn lr_adjust_rules() {
        let lr = 0.01;
        assert_eq!(LrAdjust::Type1.learning_rate(1, lr, None), Some(0.01));
        assert_eq!(LrAdjust::Type1.learning_rate(3, lr, None), Some(0.0025));

        assert_eq!(LrAdjust::Type2.learning_rate(4, lr, None), Some(1e-5));
        assert_eq!(LrAdjust::Type2.learning_rate(5, lr, None), None);

        assert_eq!(LrAdjust::Type3.learning_rate(2, lr, None), Some(0.01));
        let lr5 = LrAdjust::Type3.learning_rate(5, lr, None).unwrap();
        assert_eq!(round(lr5, 6), 0.0064);

        let step = LrAdjust::StepDecay { until: 10 };
        assert_eq!(step.learning_rate(9, lr, None), Some(0.01));
        assert_eq!(round(step.learning_rate(10, lr, None).unwrap(), 9), 0.001);

        assert_eq!(LrAdjust::Tst.learning_rate(7, lr, Some(0.003)), Some(0.003));
        assert_eq!(LrAdjust::Tst.learning_rate(7, lr, None), None);
    }

    #[test]
    fn lr_schedule_keeps_last_rate() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut schedule = LrSchedule::new(LrAdjust::Type2, 1e-4);
        assert_eq!(schedule.adjust(1, None), None);
        assert_eq!(schedule.lr(), 1e-4);
        assert_eq!(schedule.adjust(2, None), Some(5e-5));
        assert_eq!(schedule.adjust(3, None), None);
        assert_eq!(schedule.lr(), 5e-5);
    }
}
