use serde::{Deserialize, Serialize};

/// Smooth exponential decay: `lr = initial_lr * decay_rate^(step / decay_steps)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningRateSchedule {
    pub initial_lr: f32,
    pub decay_rate: f32,
    pub decay_steps: usize,
}

impl LearningRateSchedule {
    pub fn exponential_decay(initial_lr: f32, decay_rate: f32, decay_steps: usize) -> Self {
        LearningRateSchedule {
            initial_lr,
            decay_rate,
            decay_steps,
        }
    }

    /// Get the learning rate for a given step
    pub fn get_lr(&self, step: usize) -> f32 {
        let exponent = step as f64 / self.decay_steps.max(1) as f64;
        (self.initial_lr as f64 * (self.decay_rate as f64).powf(exponent)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay() {
        let schedule = LearningRateSchedule::exponential_decay(0.05, 0.01, 10000);
        assert!((schedule.get_lr(0) - 0.05).abs() < 1e-7);
        assert!((schedule.get_lr(10000) - 0.0005).abs() < 1e-7);
        assert!((schedule.get_lr(5000) - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_decay_is_smooth_between_boundaries() {
        let schedule = LearningRateSchedule::exponential_decay(1.0, 0.5, 10);
        assert_eq!(schedule.get_lr(10), 0.5);
        let lr = schedule.get_lr(5);
        assert!(lr < 1.0 && lr > 0.5);
        assert!((lr - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_zero_decay_steps_do_not_divide_by_zero() {
        let schedule = LearningRateSchedule::exponential_decay(0.1, 0.5, 0);
        assert!((schedule.get_lr(2) - 0.025).abs() < 1e-7);
    }
}
