use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Duration, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod bucket;
mod db;
mod degradation;
mod engine;
mod export;
mod forecast;
mod models;
mod report;

use models::{EvaluationResult, Granularity, Metric, Snapshot};

#[derive(Parser)]
#[command(name = "rangekeeper-analytics")]
#[command(about = "EV battery range and degradation tracker for RangeKeeper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Register or update a driver profile
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_range: f64,
        #[arg(long)]
        model_year: i32,
    },
    /// Record today's battery reading (one per day)
    Submit {
        #[arg(long)]
        email: String,
        #[arg(long)]
        current_range: f64,
        #[arg(long)]
        current_percent: f64,
    },
    /// Delete a reading by id
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Import readings from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Load a forecast payload from the prediction service
    ImportForecast {
        #[arg(long)]
        email: String,
        #[arg(long)]
        json: PathBuf,
    },
    /// Aggregate reading history for one metric
    History {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        metric: Metric,
        #[arg(long, value_enum, default_value = "day")]
        granularity: Granularity,
        #[arg(long)]
        since_days: Option<i64>,
    },
    /// Estimate battery health from a one-off snapshot
    Estimate {
        #[arg(long)]
        manufacturer_range: f64,
        #[arg(long)]
        current_percent: f64,
        #[arg(long)]
        current_range: f64,
        #[arg(long)]
        vehicle_year: i32,
    },
    /// Show recent and upcoming forecast windows
    Forecast {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 7)]
        window: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Export reading history as CSV
    Export {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "battery_data.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Estimate {
        manufacturer_range,
        current_percent,
        current_range,
        vehicle_year,
    } = cli.command
    {
        let snapshot = Snapshot {
            manufacturer_range,
            current_percent,
            current_range,
            vehicle_year,
        };
        let result = engine::evaluate_snapshot(&snapshot, Utc::now().year())?;
        print_evaluation(&snapshot, &result);
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Signup {
            name,
            email,
            full_range,
            model_year,
        } => {
            engine::validate_profile(full_range, model_year, Utc::now().year())?;
            let id = db::upsert_user(&pool, &name, &email, full_range, model_year).await?;
            println!("Profile ready for {email} ({id}).");
        }
        Commands::Submit {
            email,
            current_range,
            current_percent,
        } => {
            let user = db::fetch_user(&pool, &email).await?;
            engine::validate_reading(user.full_range, current_percent)?;
            let inserted = db::insert_reading(
                &pool,
                user.id,
                user.full_range,
                Utc::now(),
                current_range,
                current_percent,
            )
            .await?;
            if inserted {
                println!("Reading recorded for {email}.");
            } else {
                println!("A reading already exists for today; only one entry per day is kept.");
            }
        }
        Commands::Delete { id } => {
            if db::delete_reading(&pool, id).await? {
                println!("Entry deleted.");
            } else {
                println!("No reading found with id {id}.");
            }
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} readings from {}.", csv.display());
        }
        Commands::ImportForecast { email, json } => {
            let user = db::fetch_user(&pool, &email).await?;
            let stored = db::import_forecast(&pool, user.id, &json).await?;
            println!("Stored {stored} forecast points for {email}.");
        }
        Commands::History {
            email,
            metric,
            granularity,
            since_days,
        } => {
            let since = since_days.map(|days| Utc::now().date_naive() - Duration::days(days.max(1)));
            let readings = db::fetch_readings(&pool, &email, since).await?;

            if readings.is_empty() {
                println!("No readings found for this window.");
                return Ok(());
            }

            let points = engine::aggregate_history(&readings, metric, granularity);
            println!("Average {} per {}:", metric.label(), granularity.label());
            for point in &points {
                println!("- {}: {:.2}", point.label, point.value);
            }
        }
        Commands::Forecast { email, window, csv } => {
            let points = db::fetch_forecast(&pool, &email).await?;
            if points.is_empty() {
                println!("No forecast data imported for {email}.");
                return Ok(());
            }

            let series = engine::view_forecast(points);
            println!("{} forecast points on file.", series.len());

            println!("Recent {window}-day window:");
            let recent = forecast::chart_series(series.recent(window));
            for (label, value) in recent.labels.iter().zip(&recent.values) {
                println!("- {label}: {value:.1} mi");
            }

            println!("Upcoming {window}-day window:");
            let upcoming = forecast::chart_series(series.upcoming(window));
            for (label, value) in upcoming.labels.iter().zip(&upcoming.values) {
                println!("- {label}: {value:.1} mi");
            }

            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                export::write_forecast_csv(file, series.overall())?;
                println!("Forecast written to {}.", path.display());
            }
        }
        Commands::Export { email, out } => {
            let readings = db::fetch_readings(&pool, &email, None).await?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_readings_csv(file, &readings)?;
            println!("Exported {} readings to {}.", readings.len(), out.display());
        }
        Commands::Report { email, out } => {
            let user = db::fetch_user(&pool, &email).await?;
            let readings = db::fetch_readings(&pool, &email, None).await?;
            let series = engine::view_forecast(db::fetch_forecast(&pool, &email).await?);
            let report = report::build_report(&user, &readings, &series, Utc::now().year());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Estimate { .. } => unreachable!("estimate runs without a database"),
    }

    Ok(())
}

fn print_evaluation(snapshot: &Snapshot, result: &EvaluationResult) {
    println!("Battery snapshot for a {} vehicle:", snapshot.vehicle_year);
    println!(
        "- Estimated full-charge range: {:.2} mi",
        result.estimated_full_range
    );
    println!("- Range lost: {:.2} mi", result.lost_range);
    println!(
        "- Degradation: {:.2}% ({})",
        result.lost_percent, result.health
    );
    println!("- Battery age {}: {}", result.battery_age, result.age_comment);
    println!(
        "- Benchmark: {} for a {}-year-old battery",
        result.benchmark_note, result.battery_age
    );
    println!("- Warranty: {}", result.warranty_note);
    println!("- Recommendation: {}", result.recommendation);
}
