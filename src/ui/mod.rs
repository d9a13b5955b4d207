//! UI module - terminal dashboard

mod dashboard;

pub use dashboard::Dashboard;
