//! # Analyze a series read from a file (one or more numbers per line)
//! lagscope analyze --input data/births.txt --alpha 0.05 --dataset daily-total-female-births
//!
//! # Compute forecasting date windows
//! lagscope windows --forecast-length 2 --gap 1 --max-delay 3
//!
//! # List the configured datasets
//! lagscope datasets --config config/lagscope.toml

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use lagscope::{
    AppConfig, LagAnalysis, LagSignificanceAnalyzer, WindowCalculator, WindowInputs, WindowPlan,
    WindowRow,
};

#[derive(Parser)]
#[command(name = "lagscope")]
#[command(about = "Find statistically significant autocorrelation lags")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify ACF lags of a numeric series
    Analyze {
        /// File with whitespace or comma separated values ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Significance level, strictly between 0 and 1
        #[arg(short, long, default_value_t = 0.05)]
        alpha: f64,

        /// Dataset id from the catalog; unknown ids are rejected
        #[arg(short, long)]
        dataset: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute training and validation date windows
    Windows {
        #[arg(long, allow_negative_numbers = true)]
        forecast_length: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        gap: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        max_delay: Option<i64>,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// List dataset ids and their target columns
    Datasets,
}

/// JSON shape printed by `analyze --json`.
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dataset: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_column: Option<&'a str>,
    #[serde(flatten)]
    analysis: &'a LagAnalysis,
}

fn read_series(input: &str) -> Result<Vec<f64>> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read series from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read series from {}", input))?
    };

    content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f64>()
                .with_context(|| format!("Value #{} is not a number: {:?}", i + 1, token))
        })
        .collect()
}

fn print_rows(title: &str, rows: &[WindowRow]) {
    println!("{}", title);
    println!("  {:<12} {:<16} {:<16}", "observation", "earliest feature", "latest feature");
    for row in rows {
        println!(
            "  {:<12} {:<16} {:<16}",
            row.observation_date.to_string(),
            format!("{} (-{})", row.earliest_feature_date, row.earliest_offset_days),
            format!("{} (-{})", row.latest_feature_date, row.latest_offset_days),
        );
    }
}

fn print_plan(plan: &WindowPlan) {
    print_rows("Training", &plan.training);
    println!();
    print_rows("Validation", &plan.validation);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lagscope=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            input,
            alpha,
            dataset,
            json,
        } => {
            let target = dataset
                .as_deref()
                .map(|id| config.datasets.resolve(id))
                .transpose()?;

            let series = read_series(&input)?;
            info!(observations = series.len(), alpha, "Analyzing series");

            let analyzer = LagSignificanceAnalyzer::new(config.analyzer.clone());
            let analysis = analyzer.analyze(&series, alpha)?;

            if json {
                let output = AnalyzeOutput {
                    dataset: dataset.as_deref(),
                    target_column: target,
                    analysis: &analysis,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let label = match (dataset.as_deref(), target) {
                    (Some(id), Some(column)) => format!("{} [{}]", id, column),
                    _ => input.clone(),
                };
                println!("{}", analysis.summary(&label));
            }
        }
        Commands::Windows {
            forecast_length,
            gap,
            max_delay,
            json,
        } => {
            let calculator = WindowCalculator::new(config.windows.clone());
            let inputs = WindowInputs {
                forecast_length,
                gap,
                max_delay,
            };

            let plan = calculator.compute(inputs)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
        Commands::Datasets => {
            for (id, column) in config.datasets.iter() {
                println!("{:<40} {}", id, column);
            }
        }
    }

    Ok(())
}
