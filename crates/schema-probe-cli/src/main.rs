//! schema-probe CLI - relational schema discovery for PostgreSQL and SQL Server.

use clap::{Parser, Subcommand};
use schema_probe::{Config, Driver, DriverCatalog, ProbeError};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "schema-probe")]
#[command(about = "Engine-independent relational schema discovery")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "probe.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered engines and their connection fields
    Engines,

    /// Test the configured connection
    TestConnection,

    /// List user databases on the server
    Databases,

    /// Read tables, columns, constraints and indexes
    Schema,

    /// Run a statement and print its result sets
    Query {
        /// SQL text to execute
        #[arg(long)]
        sql: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ProbeError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let catalog = DriverCatalog::with_builtins();

    match cli.command {
        // Engines listing needs no configuration
        Commands::Engines => print_engines(&catalog, cli.output_json)?,

        Commands::TestConnection => {
            let (config, driver) = load_driver(&cli.config, &catalog)?;
            let start = Instant::now();
            let result = driver.test_connection(&config.connection).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            if cli.output_json {
                let report = json!({
                    "engine": driver.id(),
                    "connected": result.is_ok(),
                    "latency_ms": latency_ms,
                    "error": result.as_ref().err().map(|e| e.to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} ({}): {} ({}ms)",
                    driver.name(),
                    driver.id(),
                    if result.is_ok() { "OK" } else { "FAILED" },
                    latency_ms
                );
            }
            result?;
        }

        Commands::Databases => {
            let (config, driver) = load_driver(&cli.config, &catalog)?;
            let databases = with_executor(driver, &config, |executor| async move {
                driver.get_databases(executor.as_ref()).await
            })
            .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&databases)?);
            } else {
                println!("{:<40} {:>12}", "Database", "Size (MB)");
                for db in &databases {
                    println!("{:<40} {:>12.2}", db.name, db.size_mb);
                }
                println!("\n{} database(s)", databases.len());
            }
        }

        Commands::Schema => {
            let (config, driver) = load_driver(&cli.config, &catalog)?;
            let snapshot = with_executor(driver, &config, |executor| async move {
                driver.get_schema_information(executor.as_ref()).await
            })
            .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Schema of {} ({}):", config.connection.database, driver.name());
                println!("  Tables: {}", snapshot.tables.len());
                println!("  Columns: {}", snapshot.column_count());
                println!("  Constraints: {}", snapshot.constraints.len());
                println!("  Foreign keys: {}", snapshot.foreign_keys().count());
                println!("  Indexes: {}", snapshot.indexes.len());
                if snapshot.warnings > 0 {
                    println!("  Warnings: {}", snapshot.warnings);
                }
                for table in &snapshot.tables {
                    println!("\n  {} ({} columns)", table.full_name(), table.columns.len());
                }
            }
        }

        Commands::Query { sql } => {
            let (config, driver) = load_driver(&cli.config, &catalog)?;
            let sets = with_executor(driver, &config, |executor| async move {
                driver.run_query(&sql, executor.as_ref()).await
            })
            .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&sets)?);
            } else {
                for (idx, set) in sets.iter().enumerate() {
                    println!("-- result set {} ({} rows)", idx + 1, set.len());
                    for row in set {
                        println!("{}", serde_json::to_string(row)?);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load the configuration and resolve its engine against `catalog`.
fn load_driver<'a>(
    path: &Path,
    catalog: &'a DriverCatalog,
) -> Result<(Config, &'a Driver), ProbeError> {
    let config = Config::load_with(path, catalog)?;
    info!("Loaded configuration from {:?}", path);
    let driver = catalog.require(&config.connection.engine)?;
    Ok((config, driver))
}

/// Connect, run `op`, and release the connection regardless of the outcome.
async fn with_executor<T, F, Fut>(driver: &Driver, config: &Config, op: F) -> Result<T, ProbeError>
where
    F: FnOnce(std::sync::Arc<dyn schema_probe::StatementExecutor>) -> Fut,
    Fut: std::future::Future<Output = Result<T, ProbeError>>,
{
    let executor = driver.connect(&config.connection).await?;
    let result = op(executor.clone()).await;
    executor.close().await;
    result
}

fn print_engines(catalog: &DriverCatalog, output_json: bool) -> Result<(), ProbeError> {
    let drivers = catalog.drivers();

    if output_json {
        let engines: Vec<_> = drivers
            .iter()
            .map(|d| {
                json!({
                    "id": d.id(),
                    "name": d.name(),
                    "strategy": d.strategy(),
                    "fields": d.fields(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&engines)?);
        return Ok(());
    }

    for driver in drivers {
        println!("{} - {} [{}]", driver.id(), driver.name(), driver.strategy());
        for field in driver.fields() {
            println!(
                "    {:<24} {}{}",
                field.key,
                field.label,
                if field.required { " (required)" } else { "" }
            );
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
