use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{ArgGroup, Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod aggregate;
mod catalog;
mod db;
mod decimal;
mod input;
mod metrics;
mod models;
mod payload;
mod report;
mod sample;
mod title;
mod validate;

use models::{Configuration, Period, ReportPayload, ReportUser};

#[derive(Parser)]
#[command(name = "performance-report")]
#[command(about = "Discipline performance and quality reporting for Group Scholar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["csv", "json"])
        .required(true)
        .multiple(false)
))]
struct SourceArgs {
    /// Grade rows as CSV (period,semester,discipline,group,students,fives,fours,threes)
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Periods as a JSON array with autumnWinter/springSummer rows
    #[arg(long)]
    json: Option<PathBuf>,
    #[arg(long)]
    category: Option<String>,
    /// Defaults to the number of periods in the input
    #[arg(long)]
    years_of_work: Option<u8>,
    /// Defaults to the first year of the first period label
    #[arg(long)]
    start_year: Option<i32>,
    #[arg(long)]
    user_name: Option<String>,
    #[arg(long)]
    user_email: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Write an empty grade CSV for the given years
    Template {
        #[arg(long, default_value_t = 1)]
        years_of_work: u8,
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long, default_value = "grades.csv")]
        out: PathBuf,
    },
    /// Compute report tables and write them as JSON
    Build {
        #[arg(long, default_value = "performance")]
        name: String,
        #[command(flatten)]
        source: SourceArgs,
        /// Defaults to a file named after the report title
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
    /// Compute report tables and store them
    Save {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List stored reports
    List,
    /// Render a stored report as markdown
    Show {
        #[arg(long)]
        id: Uuid,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Recompute a stored report from new grade data
    Recompute {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Delete a stored report
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Manage the discipline catalog
    Discipline {
        #[command(subcommand)]
        command: DisciplineCommands,
    },
    /// Write a report built from generated grade data
    Sample {
        #[arg(long, default_value_t = 10)]
        disciplines: usize,
        #[arg(long, default_value_t = 3)]
        years_of_work: u8,
        #[arg(long, default_value_t = 2018)]
        start_year: i32,
        /// Fixed seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "sample.json")]
        out: PathBuf,
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DisciplineCommands {
    /// Add a discipline by code, name or both
    #[command(group(
        ArgGroup::new("label")
            .args(["code", "name"])
            .required(true)
            .multiple(true)
    ))]
    Add {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List catalog disciplines
    List,
    /// Remove a discipline from the catalog
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

struct BuiltReport {
    payload: ReportPayload,
    document: Value,
    user_email: Option<String>,
}

fn load_periods(source: &SourceArgs) -> anyhow::Result<Vec<Period>> {
    match (&source.csv, &source.json) {
        (Some(csv), _) => input::load_csv(csv),
        (None, Some(json)) => input::load_json(json),
        (None, None) => anyhow::bail!("either --csv or --json is required"),
    }
}

fn current_year() -> i32 {
    Local::now().year()
}

fn build_report(source: &SourceArgs) -> anyhow::Result<BuiltReport> {
    let periods = load_periods(source)?;
    let user = if source.user_name.is_some() || source.user_email.is_some() {
        Some(ReportUser {
            name: source.user_name.clone(),
            email: source.user_email.clone(),
        })
    } else {
        None
    };

    let years_of_work = match source.years_of_work {
        Some(years) => years,
        None => u8::try_from(periods.len().max(1)).unwrap_or(u8::MAX),
    };
    let start_year = source
        .start_year
        .or_else(|| periods.first().and_then(|period| input::label_start_year(&period.label)))
        .unwrap_or_else(current_year);

    let configuration = Configuration::new(source.category.clone(), years_of_work, start_year)?;
    assemble_report(configuration, &periods, user)
}

fn assemble_report(
    configuration: Configuration,
    periods: &[Period],
    user: Option<ReportUser>,
) -> anyhow::Result<BuiltReport> {
    input::check_period_count(periods, configuration.years_of_work)?;

    let payload = payload::build_payload(configuration, periods);
    let data = payload::to_sanitized_json(&payload).context("failed to serialize report")?;
    if payload::has_invalid_values(&data) {
        tracing::warn!("report contains empty or zero cells outside the final tables");
    }

    let user_email = user.as_ref().and_then(|user| user.email.clone());
    let user = match user {
        Some(user) => serde_json::to_value(user)?,
        None => Value::Null,
    };
    let document = payload::sanitize(json!({ "data": data, "user": user }));
    validate::validate_document(&document)?;

    Ok(BuiltReport {
        payload,
        document,
        user_email,
    })
}

fn write_json(path: &Path, value: &Value) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Template {
            years_of_work,
            start_year,
            out,
        } => {
            let configuration =
                Configuration::new(None, years_of_work, start_year.unwrap_or_else(current_year))?;
            let periods =
                input::generate_periods(configuration.years_of_work, configuration.start_year);
            let written = input::write_template(&out, &periods)?;
            println!("Template with {written} rows written to {}.", out.display());
        }
        Commands::Build {
            name,
            source,
            out,
            markdown,
        } => {
            let built = build_report(&source)?;
            let title = title::report_title(&name, Local::now().naive_local());
            let out =
                out.unwrap_or_else(|| PathBuf::from(format!("{}.json", title::clean_title(&title))));

            write_json(&out, &built.document)?;
            println!(
                "Report with {} disciplines written to {}.",
                built.payload.overall_results.len(),
                out.display()
            );

            if let Some(path) = markdown {
                std::fs::write(&path, report::render_markdown(&title, &built.payload))?;
                println!("Markdown written to {}.", path.display());
            }
        }
        Commands::Save { name, source } => {
            let built = build_report(&source)?;
            let title = title::report_title(&name, Local::now().naive_local());
            let pool = connect().await?;

            let known = db::list_disciplines(&pool).await?;
            if !known.is_empty() {
                let periods = load_periods(&source)?;
                for discipline in catalog::unknown_disciplines(&periods, &known) {
                    tracing::warn!(discipline, "discipline is not in the catalog");
                }
            }
            let id = db::insert_report(
                &pool,
                &name,
                &title,
                &built.document["data"],
                built.user_email.as_deref(),
            )
            .await?;
            println!("Saved {title} as {id}.");
        }
        Commands::List => {
            let pool = connect().await?;
            let reports = db::list_reports(&pool).await?;

            if reports.is_empty() {
                println!("No reports stored yet.");
                return Ok(());
            }

            for report in reports {
                println!(
                    "- {} {}: {} ({}, created {})",
                    report.id,
                    report.name,
                    report.title,
                    report.user_email.as_deref().unwrap_or("no owner"),
                    report.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Show { id, out } => {
            let pool = connect().await?;
            let stored = db::fetch_report(&pool, id)
                .await?
                .with_context(|| format!("report {id} not found"))?;
            let payload: ReportPayload = serde_json::from_value(stored.data)
                .with_context(|| format!("report {id} holds malformed data"))?;

            std::fs::write(&out, report::render_markdown(&stored.summary.title, &payload))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Recompute { id, source } => {
            let built = build_report(&source)?;
            let pool = connect().await?;
            if db::update_report_data(&pool, id, &built.document["data"]).await? {
                println!("Report {id} recomputed.");
            } else {
                anyhow::bail!("report {id} not found");
            }
        }
        Commands::Delete { id } => {
            let pool = connect().await?;
            if db::delete_report(&pool, id).await? {
                println!("Report {id} deleted.");
            } else {
                anyhow::bail!("report {id} not found");
            }
        }
        Commands::Discipline { command } => {
            let pool = connect().await?;
            match command {
                DisciplineCommands::Add { code, name } => {
                    let discipline = catalog::Discipline::new(code, name)?;
                    db::insert_discipline(&pool, &discipline).await?;
                    println!("Added {} as {}.", discipline.code_name(), discipline.id);
                }
                DisciplineCommands::List => {
                    let disciplines = db::list_disciplines(&pool).await?;
                    if disciplines.is_empty() {
                        println!("No disciplines in the catalog.");
                        return Ok(());
                    }
                    for discipline in disciplines {
                        println!("- {} {}", discipline.id, discipline.code_name());
                    }
                }
                DisciplineCommands::Delete { id } => {
                    if db::delete_discipline(&pool, id).await? {
                        println!("Discipline {id} deleted.");
                    } else {
                        anyhow::bail!("discipline {id} not found");
                    }
                }
            }
        }
        Commands::Sample {
            disciplines,
            years_of_work,
            start_year,
            seed,
            out,
            markdown,
        } => {
            let configuration = Configuration::new(None, years_of_work, start_year)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let periods = sample::sample_periods(
                &mut rng,
                disciplines,
                configuration.years_of_work,
                configuration.start_year,
            );
            let user = ReportUser {
                name: Some("Sample User".to_string()),
                email: None,
            };
            let built = assemble_report(configuration, &periods, Some(user))?;

            write_json(&out, &built.document)?;
            println!(
                "Sample report with {} disciplines written to {}.",
                built.payload.overall_results.len(),
                out.display()
            );

            if let Some(path) = markdown {
                let title = format!("Test Report from {}", Local::now().format("%d.%m.%Y %H:%M"));
                std::fs::write(&path, report::render_markdown(&title, &built.payload))?;
                println!("Markdown written to {}.", path.display());
            }
        }
    }

    Ok(())
}
