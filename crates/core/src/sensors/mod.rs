//! Sensor views over the account snapshot.

mod sensors_model;

#[cfg(test)]
mod sensors_model_tests;

pub use sensors_model::{sensors_from_snapshot, AccountSensor, SensorAttributes};
