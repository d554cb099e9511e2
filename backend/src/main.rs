//! Retail Promo CLI - promotion and profitability tables from a transaction CSV
//!
//! # Main Commands
//!
//! ```bash
//! retail-promo serve                      # Start HTTP server (port 3000)
//! retail-promo report --year 2023 -o d.json  # Full dashboard JSON
//! retail-promo summary                    # KPI summary as text
//! ```
//!
//! # Table Commands
//!
//! ```bash
//! retail-promo kpi --year 2023            # KPI summary for one year
//! retail-promo uplift                     # Promotion uplift
//! retail-promo top-products               # Top products per season
//! retail-promo heatmap                    # Season × category profit
//! retail-promo customer-response          # Best promotion per customer category
//! retail-promo channels                   # Profit by store type / payment method
//! retail-promo years                      # Available years
//! retail-promo categories                 # Effective category map
//! ```

use clap::{Parser, Subcommand};
use retail_promo::{
    build_dashboard, category_heatmap, channel_profit, customer_response, format_currency,
    format_number, kpi_summary, promotion_uplift, server::AppState, top_products_by_season,
    CategoryMap, Dataset, Section, Settings,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "retail-promo")]
#[command(about = "Promotion uplift and profitability tables for retail transactions", long_about = None)]
struct Cli {
    /// Transaction CSV (default: $RETAIL_PROMO_DATA or retail_promo.csv)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Category map JSON (default: built-in map)
    #[arg(long, global = true)]
    categories: Option<PathBuf>,

    /// Log file, truncated at start; pass "" to disable
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dashboard as JSON
    Report {
        /// Year for the KPI section (default: first available)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Human-readable KPI summary
    Summary {
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// KPI summary for one year as JSON
    Kpi {
        #[arg(short, long)]
        year: i32,
    },

    /// Promotion uplift by customer category and store type
    Uplift,

    /// Top products per season
    TopProducts,

    /// Profit by season and product category
    Heatmap,

    /// Best promotion per customer category
    CustomerResponse,

    /// Profit by store type and payment method
    Channels,

    /// Years present in the data
    Years,

    /// Print the effective category map
    Categories,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $RETAIL_PROMO_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match resolve_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let _guard = init_tracing(cli.verbose, settings.log_file.as_deref());

    let result = match cli.command {
        Commands::Report { year, output } => cmd_report(&settings, year, output.as_deref()),
        Commands::Summary { year } => cmd_summary(&settings, year),
        Commands::Kpi { year } => {
            with_dataset(&settings, |d| print_json(&kpi_summary(&d.transactions, year)))
        }
        Commands::Uplift => {
            with_dataset(&settings, |d| print_json(&promotion_uplift(&d.transactions)))
        }
        Commands::TopProducts => {
            with_dataset(&settings, |d| print_json(&top_products_by_season(&d.exploded)))
        }
        Commands::Heatmap => {
            with_dataset(&settings, |d| print_json(&category_heatmap(&d.exploded)))
        }
        Commands::CustomerResponse => {
            with_dataset(&settings, |d| print_json(&customer_response(&d.transactions)))
        }
        Commands::Channels => with_dataset(&settings, |d| print_json(&channel_profit(&d.exploded))),
        Commands::Years => with_dataset(&settings, |d| print_json(&d.years())),
        Commands::Categories => cmd_categories(&settings),
        Commands::Serve { .. } => cmd_serve(&settings).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Defaults, then environment, then flags
fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::from_env()?;
    if let Some(data) = &cli.data {
        settings = settings.with_data_path(data.clone());
    }
    if let Some(categories) = &cli.categories {
        settings = settings.with_categories_path(categories.clone());
    }
    if let Some(log_file) = &cli.log_file {
        settings = settings.with_log_file(PathBuf::from(log_file));
    }
    if let Commands::Serve { port: Some(port) } = &cli.command {
        settings = settings.with_port(*port);
    }
    Ok(settings)
}

/// Human-readable stderr layer plus an optional plain-text file layer.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = || {
        if verbose == 0 {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
        } else {
            EnvFilter::new(level)
        }
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let mut guard = None;
    let file_layer = match log_file.map(fs::File::create) {
        Some(Ok(file)) => {
            let (non_blocking, g) = tracing_appender::non_blocking(file);
            guard = Some(g);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .with_filter(filter()),
            )
        }
        Some(Err(e)) => {
            eprintln!("⚠️  Cannot open log file: {}", e);
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn load(settings: &Settings) -> Result<Dataset, Box<dyn std::error::Error>> {
    let categories = settings.category_map()?;
    let dataset = Dataset::load(&settings.data_path, &categories)?;
    eprintln!(
        "📄 {} ({}, delimiter '{}'): {} transactions",
        settings.data_path.display(),
        dataset.source.encoding,
        format_delimiter(dataset.source.delimiter),
        dataset.transactions.len()
    );
    Ok(dataset)
}

fn with_dataset<F>(settings: &Settings, f: F) -> CliResult
where
    F: FnOnce(&Dataset) -> CliResult,
{
    let dataset = load(settings)?;
    f(&dataset)
}

fn cmd_report(settings: &Settings, year: Option<i32>, output: Option<&Path>) -> CliResult {
    let dataset = load(settings)?;
    let dashboard = build_dashboard(&dataset, year);

    if let Some(y) = dashboard.selected_year {
        eprintln!("📊 Dashboard for {}", y);
    }

    let json = serde_json::to_string_pretty(&dashboard)?;
    write_output(&json, output)
}

fn cmd_summary(settings: &Settings, year: Option<i32>) -> CliResult {
    let dataset = load(settings)?;
    let year = year
        .or_else(|| dataset.default_year())
        .ok_or("No year available")?;
    let kpi = kpi_summary(&dataset.transactions, year);

    println!("📊 KPI summary for {}\n", kpi.year);
    println!("   Transactions:      {}", kpi.transactions);
    println!("   🛒 Total Sales:    {}", format_currency(kpi.total_sales));
    println!("   💰 Total Profit:   {}", format_currency(kpi.total_profit));
    println!(
        "   📈 Avg Margin:     {}",
        match kpi.avg_profit_margin {
            Some(m) => format!("{}%", format_number(Some(m))),
            None => "N/A".to_string(),
        }
    );
    match &kpi.top_promotion {
        Section::Ready { data } => println!(
            "   🏆 Top Promotion:  {} ({})",
            data.promotion,
            format_currency(data.sales)
        ),
        Section::Unavailable { reason } => println!("   🏆 Top Promotion:  ⚠️  {}", reason),
    }

    Ok(())
}

fn cmd_categories(settings: &Settings) -> CliResult {
    let map: CategoryMap = settings.category_map()?;
    eprintln!(
        "📋 {} categories, {} products",
        map.categories().len(),
        map.product_count()
    );
    println!("{}", map.to_json()?);
    Ok(())
}

async fn cmd_serve(settings: &Settings) -> CliResult {
    let categories = settings.category_map()?;

    // A failed load is served as 503 rather than aborting
    let dataset = Dataset::load(&settings.data_path, &categories);
    if let Err(e) = &dataset {
        eprintln!("❌ {}", e);
    }

    retail_promo::server::start_server(settings.port, AppState::new(dataset, categories)).await?;
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
