//! Statistics module - descriptive statistics over the dataset

mod calculator;

pub use calculator::{FieldSummary, StatisticsSnapshot, StatsService};
