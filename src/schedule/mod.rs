//! Step-indexed schedules: exploration temperature and learning rate.

pub mod learning_rate;
pub mod temperature;

pub use learning_rate::LearningRateSchedule;
pub use temperature::TemperatureSchedule;
