//! Dashboard Module
//! Foreground consumer: dataset table, statistics panel and chart files.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::charts;
use crate::data::{CovidRecord, DataStore, NumericField, DATE_FORMAT};

const READY_ATTEMPTS: u64 = 10;
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Renders the dashboard once: dataset table, statistics fetched from the
/// API, and static charts.
///
/// Every section is failure-isolated: a failing section logs a warning and
/// is skipped, the remaining sections still render.
pub struct Dashboard {
    store: DataStore,
    client: Client,
    api_base: String,
    charts_dir: PathBuf,
    focus_country: String,
}

impl Dashboard {
    pub fn new(
        store: DataStore,
        api_base: String,
        charts_dir: PathBuf,
        focus_country: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            store,
            client,
            api_base,
            charts_dir,
            focus_country,
        })
    }

    pub async fn run(&self) {
        let ready = self.wait_until_ready().await;
        if !ready {
            warn!("API did not become ready; the statistics panel will be skipped");
        }

        let dataset = match self.store.load() {
            Ok(records) => {
                info!(rows = records.len(), "dataset loaded for dashboard");
                Some(records)
            }
            Err(err) => {
                warn!("could not load dataset: {err}");
                None
            }
        };

        println!("\n=== Análise de dados COVID-19 ===\n");

        if let Some(records) = &dataset {
            render_table(records);
        }

        if ready {
            match self.fetch_statistics().await {
                Ok(stats) => render_statistics(&stats),
                Err(err) => warn!("could not fetch statistics from the API: {err}"),
            }
        }

        if let Some(records) = &dataset {
            self.render_charts(records);
        }
    }

    /// Poll the API's health endpoint with linear backoff until it answers.
    ///
    /// Readiness probe instead of a fixed startup delay; if the API never
    /// comes up the caller degrades instead of failing.
    async fn wait_until_ready(&self) -> bool {
        let url = format!("{}/health", self.api_base);
        for attempt in 1..=READY_ATTEMPTS {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return true,
                _ => tokio::time::sleep(Duration::from_millis(100 * attempt)).await,
            }
        }
        false
    }

    async fn fetch_statistics(&self) -> Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}/api/statistics", self.api_base))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }

    fn render_charts(&self, records: &[CovidRecord]) {
        if let Err(err) = std::fs::create_dir_all(&self.charts_dir) {
            warn!(
                "could not create chart directory {}: {err}",
                self.charts_dir.display()
            );
            return;
        }

        let area = self.charts_dir.join("casos_novos_x_obitos_novos.png");
        match charts::render_daily_area(records, &area) {
            Ok(()) => info!(chart = %area.display(), "chart written"),
            Err(err) => warn!("area chart failed: {err}"),
        }

        for (field, file_name) in [
            (NumericField::CumulativeCases, "evolucao_casos.png"),
            (NumericField::CumulativeDeaths, "evolucao_obitos.png"),
        ] {
            let path = self.charts_dir.join(file_name);
            match charts::render_country_trend(records, &self.focus_country, field, &path) {
                Ok(()) => info!(chart = %path.display(), "chart written"),
                Err(err) => warn!("trend chart for {} failed: {err}", field.column_name()),
            }
        }

        let histogram = self.charts_dir.join("histograma_casos_novos.png");
        match charts::render_histogram(records, NumericField::NewCases, 30, &histogram) {
            Ok(()) => info!(chart = %histogram.display(), "chart written"),
            Err(err) => warn!("histogram failed: {err}"),
        }
    }
}

fn render_table(records: &[CovidRecord]) {
    println!(
        "{:<12} {:<24} {:>16} {:>12} {:>16} {:>12}",
        "Data", "País", "Casos acum.", "Casos novos", "Óbitos acum.", "Óbitos novos"
    );
    for record in records {
        println!(
            "{:<12} {:<24} {:>16} {:>12} {:>16} {:>12}",
            record.date.format(DATE_FORMAT).to_string(),
            record.country,
            format_count(record.cumulative_cases),
            format_count(record.new_cases),
            format_count(record.cumulative_deaths),
            format_count(record.new_deaths),
        );
    }
    println!("\n{} registros\n", records.len());
}

fn render_statistics(snapshot: &Value) {
    println!("--- Estatísticas básicas ---");
    let Some(columns) = snapshot.as_object() else {
        warn!("unexpected statistics payload shape");
        return;
    };

    println!(
        "{:<20} {:>16} {:>16} {:>16}",
        "Coluna", "Média", "Mediana", "Desvio padrão"
    );
    for (column, summary) in columns {
        println!(
            "{:<20} {:>16} {:>16} {:>16}",
            column,
            format_stat(&summary["mean"]),
            format_stat(&summary["median"]),
            format_stat(&summary["std"]),
        );
    }
    println!();
}

fn format_stat(value: &Value) -> String {
    match value.as_f64() {
        Some(number) => format_decimal(number),
        // NaN statistics arrive as JSON null.
        None => "-".to_string(),
    }
}

/// Table cell for a possibly absent count.
fn format_count(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), format_grouped)
}

/// Group an integer's digits pt-BR style: `1234567` -> `1.234.567`.
fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a float pt-BR style with two decimals: `1234.5` -> `1.234,50`.
fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = format!("{:.2}", value.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = format_grouped(integer.parse::<i64>().unwrap_or(0));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped},{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_in_thousands() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1.000");
        assert_eq!(format_grouped(1234567), "1.234.567");
        assert_eq!(format_grouped(-45210), "-45.210");
    }

    #[test]
    fn formats_decimals_with_comma_separator() {
        assert_eq!(format_decimal(1234.5), "1.234,50");
        assert_eq!(format_decimal(0.125), "0,13");
        assert_eq!(format_decimal(-7.0), "-7,00");
    }

    #[test]
    fn non_finite_values_render_as_dash() {
        assert_eq!(format_decimal(f64::NAN), "-");
        assert_eq!(format_stat(&Value::Null), "-");
    }

    #[test]
    fn absent_counts_render_as_dash() {
        assert_eq!(format_count(None), "-");
        assert_eq!(format_count(Some(1000)), "1.000");
    }
}
