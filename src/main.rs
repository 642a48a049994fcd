//! CLI entry point for the E-Rate prospector.
//!
//! Provides subcommands for pulling E-Rate, school and library data from
//! open-data portals, summarizing saved extracts, and ranking states by opportunity.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use erate_prospector::analysis::opportunity::build_report;
use erate_prospector::config::Config;
use erate_prospector::output::{load_table, persist, print_json, print_pretty, write_json, write_rows};
use erate_prospector::{Dataset, FilterSet, SodaClient, SummaryRequest, summarize};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "erate_prospector")]
#[command(about = "Collect and score E-Rate market data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one filtered page of E-Rate data, summarize it and save it
    Sample {
        /// Funding year to filter on
        #[arg(short, long, default_value_t = 2024)]
        year: i64,

        /// State abbreviation to filter on
        #[arg(short, long, default_value = "CA")]
        state: String,

        /// Number of records to request
        #[arg(short, long, default_value_t = 100)]
        limit: usize,

        /// CSV file to write (defaults to <RAW_DATA_DIR>/erate_sample.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Collect every E-Rate record for a range of funding years
    Collect {
        /// First funding year to fetch
        #[arg(long, default_value_t = 2016)]
        start_year: i64,

        /// Last funding year to fetch (inclusive)
        #[arg(long, default_value_t = 2024)]
        end_year: i64,

        /// Optional state abbreviation filter
        #[arg(short, long)]
        state: Option<String>,

        /// Optional applicant type filter ("School" or "Library")
        #[arg(short, long)]
        applicant_type: Option<String>,

        /// Records per request
        #[arg(short, long, default_value_t = 1000)]
        page_size: usize,

        /// CSV file to write (defaults to <RAW_DATA_DIR>/erate_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch public library records from the IMLS open-data portal
    Libraries {
        /// Number of records to request
        #[arg(short, long, default_value_t = 500)]
        limit: usize,

        /// CSV file to write (defaults to <RAW_DATA_DIR>/imls_libraries.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch the NCES school directory from the Urban Institute education API
    Schools {
        /// Number of records to request
        #[arg(short, long, default_value_t = 500)]
        limit: usize,

        /// Optional state FIPS code filter
        #[arg(long)]
        fips: Option<i64>,

        /// CSV file to write (defaults to <RAW_DATA_DIR>/nces_schools.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print summary statistics for a saved CSV extract
    Summarize {
        /// CSV file produced by `sample`, `collect`, `schools` or `libraries`
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Which column set to summarize
        #[arg(short, long, value_enum, default_value_t = Kind::Erate)]
        kind: Kind,
    },
    /// Rank states by opportunity score from a state-level library summary
    Score {
        /// State-level library CSV ("State Name", "Total Revenue In Thousands", "Public Library Count")
        #[arg(value_name = "LIBRARIES_CSV")]
        libraries: PathBuf,

        /// Optional E-Rate extract to count applications per state
        #[arg(long)]
        erate: Option<PathBuf>,

        /// Optional school directory extract for the poverty indicator
        #[arg(long)]
        schools: Option<PathBuf>,

        /// Directory to write the ranking to (defaults to RAW_DATA_DIR)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Erate,
    Schools,
    Libraries,
}

impl Kind {
    fn request(self) -> SummaryRequest {
        match self {
            Kind::Erate => SummaryRequest::erate(),
            Kind::Schools => SummaryRequest::schools(),
            Kind::Libraries => SummaryRequest::libraries(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = Config::from_env();
    let _file_guard = init_tracing(&config.log_file_path)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample {
            year,
            state,
            limit,
            output,
        } => {
            let client = SodaClient::from_config(&config, Dataset::erate())?;
            let filters = FilterSet::new()
                .with("funding_year", year)
                .with("state", state);

            let table = client.fetch_page(&filters, limit, 0).await?;
            info!(
                records = table.len(),
                columns = ?table.columns(),
                "Sample fetched"
            );

            let stats = summarize(&table, &SummaryRequest::erate());
            print_pretty(&stats);
            print_json(&stats)?;

            let path = output.unwrap_or_else(|| config.output_path("erate_sample.csv"));
            persist(&table, &path)?;
        }
        Commands::Collect {
            start_year,
            end_year,
            state,
            applicant_type,
            page_size,
            output,
        } => {
            let client = SodaClient::from_config(&config, Dataset::erate())?;
            let base = FilterSet::new()
                .with_opt("state", state)
                .with_opt("applicant_type", applicant_type);

            let table = client
                .fetch_years(start_year..=end_year, &base, page_size)
                .await?;

            print_json(&summarize(&table, &SummaryRequest::erate()))?;

            let path = output.unwrap_or_else(|| config.output_path("erate_data.csv"));
            persist(&table, &path)?;
        }
        Commands::Libraries { limit, output } => {
            let client = SodaClient::from_config(&config, Dataset::libraries())?;
            let table = client.fetch_page(&FilterSet::new(), limit, 0).await?;

            print_json(&summarize(&table, &SummaryRequest::libraries()))?;

            let path = output.unwrap_or_else(|| config.output_path("imls_libraries.csv"));
            persist(&table, &path)?;
        }
        Commands::Schools {
            limit,
            fips,
            output,
        } => {
            let client = SodaClient::from_config(&config, Dataset::schools())?;
            let filters = FilterSet::new().with_opt("fips", fips);
            let table = client.fetch_page(&filters, limit, 0).await?;
            if table.is_empty() {
                warn!("No school records returned");
            }

            print_json(&summarize(&table, &SummaryRequest::schools()))?;

            let path = output.unwrap_or_else(|| config.output_path("nces_schools.csv"));
            persist(&table, &path)?;
        }
        Commands::Summarize { input, kind } => {
            let table = load_table(&input)?;
            let stats = summarize(&table, &kind.request());
            if stats.is_empty() {
                warn!(path = %input.display(), "No records to summarize");
            }
            print_json(&stats)?;
        }
        Commands::Score {
            libraries,
            erate,
            schools,
            output_dir,
        } => {
            let libraries = load_table(&libraries)?;
            let erate = erate.as_deref().map(load_table).transpose()?;
            let schools = schools.as_deref().map(load_table).transpose()?;

            let report = build_report(&libraries, erate.as_ref(), schools.as_ref());

            for (rank, state) in report.states.iter().take(10).enumerate() {
                info!(
                    rank = rank + 1,
                    state = %state.state_name,
                    score = %format!("{:.1}", state.opportunity_score),
                    revenue_k = state.total_revenue_k,
                    "Top opportunity"
                );
            }
            info!(
                high_priority = ?report.high_priority,
                mean = %format!("{:.1}", report.mean_score),
                min = %format!("{:.1}", report.min_score),
                max = %format!("{:.1}", report.max_score),
                "Opportunity summary"
            );

            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            write_rows(&report.states, &dir.join("opportunity_scores_by_state.csv"))?;
            write_json(&report, &dir.join("opportunity_report.json"))?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
fn init_tracing(log_file_path: &Path) -> Result<WorkerGuard> {
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("erate_prospector.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}
