use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Visit-count softmax temperature as a step function of training progress.
///
/// Each breakpoint `(fraction, temperature)` applies while
/// `trained_steps < fraction * training_steps`; past the last breakpoint the
/// `final_temperature` applies. A step landing exactly on a boundary belongs
/// to the next (lower) bracket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSchedule {
    breakpoints: Vec<(f64, f32)>,
    final_temperature: f32,
}

impl TemperatureSchedule {
    pub fn new(breakpoints: Vec<(f64, f32)>, final_temperature: f32) -> Result<Self> {
        let mut previous = 0.0;
        for &(fraction, temperature) in &breakpoints {
            if !(fraction > previous) || !fraction.is_finite() {
                return Err(Error::invalid_parameter(
                    "temperature_breakpoints".to_string(),
                    format!("fractions must be finite and strictly increasing, got {}", fraction),
                ));
            }
            if !(temperature > 0.0) {
                return Err(Error::invalid_parameter(
                    "temperature".to_string(),
                    format!("temperatures must be positive, got {}", temperature),
                ));
            }
            previous = fraction;
        }
        if !(final_temperature > 0.0) {
            return Err(Error::invalid_parameter(
                "final_temperature".to_string(),
                format!("must be positive, got {}", final_temperature),
            ));
        }
        Ok(TemperatureSchedule {
            breakpoints,
            final_temperature,
        })
    }

    /// 1.0 for the first half of training, 0.5 until three quarters, then 0.25.
    pub fn muzero() -> Self {
        TemperatureSchedule {
            breakpoints: vec![(0.5, 1.0), (0.75, 0.5)],
            final_temperature: 0.25,
        }
    }

    /// A single temperature for the whole run.
    pub fn constant(temperature: f32) -> Self {
        TemperatureSchedule {
            breakpoints: Vec::new(),
            final_temperature: temperature,
        }
    }

    pub fn temperature(&self, trained_steps: usize, training_steps: usize) -> f32 {
        let trained = trained_steps as f64;
        let total = training_steps as f64;
        self.breakpoints
            .iter()
            .find(|&&(fraction, _)| trained < fraction * total)
            .map(|&(_, temperature)| temperature)
            .unwrap_or(self.final_temperature)
    }
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self::muzero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muzero_brackets() {
        let schedule = TemperatureSchedule::muzero();
        assert_eq!(schedule.temperature(0, 20000), 1.0);
        assert_eq!(schedule.temperature(9999, 20000), 1.0);
        assert_eq!(schedule.temperature(10000, 20000), 0.5);
        assert_eq!(schedule.temperature(14999, 20000), 0.5);
        assert_eq!(schedule.temperature(15000, 20000), 0.25);
        assert_eq!(schedule.temperature(1_000_000, 20000), 0.25);
    }

    #[test]
    fn test_constant() {
        let schedule = TemperatureSchedule::constant(0.7);
        assert_eq!(schedule.temperature(0, 10), 0.7);
        assert_eq!(schedule.temperature(100, 10), 0.7);
    }

    #[test]
    fn test_validation() {
        assert!(TemperatureSchedule::new(vec![(0.5, 1.0), (0.4, 0.5)], 0.25).is_err());
        assert!(TemperatureSchedule::new(vec![(0.5, 0.0)], 0.25).is_err());
        assert!(TemperatureSchedule::new(vec![(0.5, 1.0)], -1.0).is_err());
        assert!(TemperatureSchedule::new(vec![(0.3, 2.0), (0.9, 1.0)], 0.1).is_ok());
    }
}
