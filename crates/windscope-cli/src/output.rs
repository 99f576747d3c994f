//! Output formatting for windscope (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format (whole query result)
    Json,
    /// CSV format
    Csv,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message (unless in quiet mode)
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.yellow());
        }
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    let table = Table::new(data).to_string();
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => {
                if let Err(e) = write_csv(data, std::io::stdout().lock()) {
                    self.warn(&format!("CSV output failed: {}", e));
                }
            }
        }
    }

    /// Print a query result: the whole document as JSON, rows otherwise
    pub fn print_result<T: Tabled + Serialize, D: Serialize>(&self, rows: &[T], document: &D) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
                );
            }
            _ => self.print(rows),
        }
    }
}

/// Write rows as CSV, header taken from the row's field names
fn write_csv<T: Serialize, W: std::io::Write>(data: &[T], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in data {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Display types for the commands
// =============================================================================

/// One value of a series trace
#[derive(Debug, Tabled, Serialize)]
pub struct SeriesRow {
    #[tabled(rename = "Series")]
    pub series: String,
    #[tabled(rename = "Turbine")]
    pub turbine: String,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Value")]
    pub value: f64,
}

/// One turbine-day of the generation table
#[derive(Debug, Tabled, Serialize)]
pub struct GenerationRow {
    #[tabled(rename = "Day")]
    pub day: String,
    #[tabled(rename = "Turbine")]
    pub turbine: String,
    #[tabled(rename = "Generation (kWh)")]
    pub generation_kwh: f64,
    #[tabled(rename = "Availability (%)")]
    pub availability: f64,
}

/// One retained power-curve sample
#[derive(Debug, Tabled, Serialize)]
pub struct CurveRow {
    #[tabled(rename = "Turbine")]
    pub turbine: String,
    #[tabled(rename = "Wind (m/s)")]
    pub wind: f64,
    #[tabled(rename = "Power (kW)")]
    pub power: f64,
}

/// Turbine registry entry
#[derive(Debug, Tabled, Serialize)]
pub struct TurbineRow {
    #[tabled(rename = "Turbine")]
    pub turbine: String,
    #[tabled(rename = "Device")]
    pub device: String,
}

/// Parameter registry entry
#[derive(Debug, Tabled, Serialize)]
pub struct ParameterRow {
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Name")]
    pub name: String,
}
