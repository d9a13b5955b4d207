//! Data module - backing file loading and record types

mod store;

pub use store::{ConfigError, CovidRecord, DataStore, LoadError, NumericField, DATE_FORMAT};
