//! CLI entry point for the course rater service.
//!
//! Wires a constructed [`ReviewStore`] and [`EnrichmentService`] into the
//! request-handler facade and exposes each endpoint operation as a
//! subcommand, printing the same JSON envelopes the HTTP layer serves.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use course_rater::api::Api;
use course_rater::config::AppConfig;
use course_rater::enrich::{EnrichmentService, HttpProfessorApi};
use course_rater::store::ReviewStore;

#[derive(Parser)]
#[command(name = "course_rater")]
#[command(about = "Course difficulty review aggregation and professor enrichment", long_about = None)]
struct Cli {
    /// Path to the review CSV (overrides REVIEWS_CSV_PATH)
    #[arg(long)]
    csv: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the CSV and print summary statistics
    Load,
    /// Show one course with recent reviews and professors
    Course {
        code: String,

        /// Enrich the professors with external rating data
        #[arg(short, long, default_value_t = false)]
        enhanced: bool,
    },
    /// Search courses by query, department, and difficulty ceiling
    Search {
        query: String,

        #[arg(short, long)]
        department: Option<String>,

        #[arg(short, long)]
        max_difficulty: Option<f64>,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List easy courses (avg difficulty <= 4.0, at least 2 reviews)
    Easy {
        #[arg(short, long)]
        department: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Look up one professor, enriched with external data when available
    Professor {
        name: String,

        /// Fetch the external analytics block instead
        #[arg(short, long, default_value_t = false)]
        analytics: bool,
    },
    /// List all departments with their derived statistics
    Departments,
    /// Probe the external enrichment service
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/course_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("course_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(csv) = cli.csv {
        config.reviews_csv_path = csv;
    }

    let store = Arc::new(ReviewStore::new(&config.reviews_csv_path));
    let professor_api = Arc::new(HttpProfessorApi::new(&config.professor_api_url)?);
    let enrichment = Arc::new(EnrichmentService::new(
        professor_api,
        config.enrichment_enabled,
    ));
    let api = Api::new(store.clone(), enrichment);

    info!(
        csv = %config.reviews_csv_path,
        enrichment = config.enrichment_enabled,
        env = %config.environment,
        "Starting course_rater"
    );

    match cli.command {
        Commands::Load => {
            let courses = store.all_courses().await?;
            let departments = store.all_departments().await?;
            info!(
                courses = courses.len(),
                departments = departments.len(),
                "Review data loaded"
            );
            for department in &departments {
                info!(
                    code = %department.code,
                    name = %department.name,
                    courses = department.course_count,
                    avg_difficulty = department.average_difficulty,
                    "Department"
                );
            }
        }
        Commands::Course { code, enhanced } => {
            if enhanced {
                print_envelope(&api.enhanced_course_detail(&code).await)?;
            } else {
                print_envelope(&api.course_detail(&code).await)?;
            }
        }
        Commands::Search {
            query,
            department,
            max_difficulty,
            limit,
        } => {
            print_envelope(
                &api.search_courses(
                    Some(&query),
                    department.as_deref(),
                    max_difficulty,
                    limit,
                )
                .await,
            )?;
        }
        Commands::Easy { department, limit } => {
            print_envelope(&api.easy_courses(department.as_deref(), limit).await)?;
        }
        Commands::Professor { name, analytics } => {
            if analytics {
                print_envelope(&api.professor_analytics(&name).await)?;
            } else {
                print_envelope(&api.professor(&name).await)?;
            }
        }
        Commands::Departments => {
            let departments = store.all_departments().await?;
            println!("{}", serde_json::to_string_pretty(&departments)?);
        }
        Commands::Health => {
            print_envelope(&api.enrichment_health().await)?;
        }
    }

    Ok(())
}

/// Prints either envelope of an endpoint result as pretty JSON.
fn print_envelope<T: Serialize, E: Serialize>(result: &Result<T, E>) -> Result<()> {
    let json = match result {
        Ok(response) => serde_json::to_string_pretty(response)?,
        Err(envelope) => serde_json::to_string_pretty(envelope)?,
    };
    println!("{json}");
    Ok(())
}
