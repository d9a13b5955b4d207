//! Configuration parsed from command line arguments and environment variables.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "covidash")]
#[command(version, about = "COVID-19 data analysis dashboard & statistics API")]
pub struct AppConfig {
    /// Path to the backing CSV data file
    #[arg(long, env = "DATA_FILE", default_value = "COVID_19_2024.csv")]
    pub data_file: PathBuf,

    /// API host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// API port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Directory for rendered chart images
    #[arg(long, env = "CHARTS_DIR", default_value = "charts")]
    pub charts_dir: PathBuf,

    /// Country highlighted in the trend charts
    #[arg(long, env = "FOCUS_COUNTRY", default_value = "Brasil")]
    pub focus_country: String,
}
