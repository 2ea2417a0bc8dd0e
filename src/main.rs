use analytics::{SummaryTable, build_chart, format_number};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{LoggingSettings, ServerOverrides, Settings, load_settings};
use core_types::ChartType;
use datasource::FixtureRepository;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the ACV dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Commands::Serve(args) = &cli.command {
        args.overrides.apply(&mut settings);
        settings.validate()?;
    }

    // The guard must stay alive for the whole run so buffered file logs flush.
    let _file_guard = init_tracing(&settings.logging)?;
    if !cli.config.exists() {
        tracing::info!(path = %cli.config.display(), "No configuration file found, using defaults.");
    }

    match cli.command {
        Commands::Serve(_) => handle_serve(settings).await,
        Commands::Report(args) => handle_report(args, settings).await,
        Commands::Format(args) => {
            for value in args.values {
                println!("{}", format_number(value));
            }
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Serves quarterly ACV breakdowns by customer type, team and industry.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the fixtures and serve the JSON API.
    Serve(ServeArgs),
    /// Print the summary table for one chart type.
    Report(ReportArgs),
    /// Format numbers the way chart labels do.
    Format(FormatArgs),
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    overrides: ServerOverrides,
}

#[derive(Parser)]
struct ReportArgs {
    /// "Customer", "Team" or "Account Industry" (slugs work too).
    #[arg(long, default_value = "Customer")]
    chart: ChartType,
}

#[derive(Parser)]
struct FormatArgs {
    /// Values to format, e.g. 1500 or 0.0000012345.
    #[arg(required = true, allow_hyphen_values = true)]
    values: Vec<String>,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server_addr()?;
    let repo = FixtureRepository::load(&settings.data).await?;
    web_server::run_server(addr, repo).await
}

async fn handle_report(args: ReportArgs, settings: Settings) -> anyhow::Result<()> {
    let repo = FixtureRepository::load(&settings.data).await?;
    let view = build_chart(args.chart, repo.records(args.chart))?;
    println!("{}", render_summary(&view.table));
    println!("{}", view.donut.center_label);
    Ok(())
}

fn render_summary(summary: &SummaryTable) -> Table {
    let mut header = vec![summary.header.clone()];
    for quarter in &summary.quarters {
        header.push(format!("{quarter} ACV"));
        header.push(format!("{quarter} %"));
    }
    header.push("Total ACV".to_string());
    header.push("Total %".to_string());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);

    for row in &summary.rows {
        let mut cells = vec![row.category.clone()];
        for cell in row.cells.iter().chain(std::iter::once(&row.total)) {
            cells.push(cell.label.clone());
            cells.push(format!("{}%", cell.pct));
        }
        table.add_row(cells);
    }

    let mut totals = vec!["Total".to_string()];
    for cell in summary.totals.cells.iter().chain(std::iter::once(&summary.totals.total)) {
        totals.push(cell.label.clone());
        totals.push(format!("{}%", cell.pct));
    }
    table.add_row(totals);

    table
}

// ==============================================================================
// Logging
// ==============================================================================

/// Stderr logging, plus a daily rolling JSON file when enabled.
///
/// Precedence: RUST_LOG env var > `logging.level` > "info".
fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = if logging.file_enabled {
        std::fs::create_dir_all(&logging.file_dir)?;
        let appender = tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix);
        // Wrap in non-blocking writer (writes happen in background thread)
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
