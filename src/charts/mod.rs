//! Charts module - static chart rendering

mod plotter;

pub use plotter::{render_country_trend, render_daily_area, render_histogram, ChartError};
