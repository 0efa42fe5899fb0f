use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mealprint_core::{Config, MealPrint, init, report::CarbonFootprintReport};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate the carbon footprint of a meal from a photo", long_about = None)]
struct Args {
    /// Photo of the meal to analyze (PNG, JPG, GIF, or WebP)
    image: PathBuf,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Print the raw report JSON instead of the rendered view
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    init();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // Load config and override model if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.model {
        config.model_name = m;
    }
    let model_name = config.model_name.clone();

    let mut app = MealPrint::with_config(config).context("Failed to initialize analyzer")?;
    app.select_image_from_path(&args.image)
        .with_context(|| format!("Failed to load image {}", args.image.display()))?;

    // Send to API
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Analyzing meal with {}...", model_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    app.analyze().await;

    spinner.finish_and_clear();

    if let Some(message) = app.state().error_message() {
        bail!("{}", message);
    }

    match app.state().report() {
        Some(report) if args.json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        Some(report) => print_report(report),
        None => bail!("Analysis produced no report"),
    }

    Ok(())
}

/// Renders the report: dish name, total, per-ingredient bar chart, summary.
fn print_report(report: &CarbonFootprintReport) {
    println!();
    println!("{}", report.dish_name);
    println!("Total: {:.2} kg CO2e", report.total_carbon_footprint);
    println!();

    let name_width = report
        .ingredients
        .iter()
        .map(|i| i.name.chars().count())
        .max()
        .unwrap_or(0);
    let amount_width = report
        .ingredients
        .iter()
        .map(|i| i.amount.chars().count())
        .max()
        .unwrap_or(0);
    let max_footprint = report
        .ingredients
        .iter()
        .map(|i| i.carbon_footprint)
        .fold(0.0_f64, f64::max);

    for ingredient in &report.ingredients {
        println!(
            "  {:<name_width$}  {:>amount_width$}  {:>6.2} kg CO2e  {}",
            ingredient.name,
            ingredient.amount,
            ingredient.carbon_footprint,
            bar(ingredient.carbon_footprint, max_footprint),
        );
    }

    println!();
    println!("{}", report.summary);
}

/// Scales a footprint to a Unicode bar relative to the largest ingredient.
fn bar(value: f64, max: f64) -> String {
    const WIDTH: usize = 28;

    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * WIDTH as f64).round() as usize;
    "█".repeat(len.clamp(1, WIDTH))
}
