//! cassandra-dynamo-migrate CLI - Cassandra to DynamoDB table migration.

use cassandra_dynamo_migrate::{
    Config, HealthCheckResult, MigrateError, MigrationResult, Orchestrator, SourceSeeder,
    TargetWriter,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

/// Printed once every record has been written.
const SUCCESS_LINE: &str = "Data migration completed successfully.";

#[derive(Parser)]
#[command(name = "cassandra-dynamo-migrate")]
#[command(about = "Migrate a Cassandra table into DynamoDB with retry and backoff")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (built-in local defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

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
    /// Copy every source record into the target table
    Run,

    /// Insert sample records into the source table
    Seed {
        /// Number of sample records to insert
        #[arg(long, default_value = "100000")]
        count: u64,
    },

    /// Test store connections
    HealthCheck,
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

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    dispatch(&cli, config).await
}

#[cfg(all(feature = "cassandra", feature = "dynamodb"))]
async fn dispatch(cli: &Cli, config: Config) -> Result<(), MigrateError> {
    use cassandra_dynamo_migrate::drivers::{CassandraReader, DynamoWriter};

    let source = CassandraReader::new(config.source.clone());
    let target = DynamoWriter::new(config.target.clone());
    execute(cli, Orchestrator::new(config, source, target)).await
}

#[cfg(not(all(feature = "cassandra", feature = "dynamodb")))]
async fn dispatch(_cli: &Cli, _config: Config) -> Result<(), MigrateError> {
    Err(MigrateError::Config(
        "this binary was built without store drivers; rebuild with `--features cassandra,dynamodb`"
            .to_string(),
    ))
}

#[cfg_attr(not(all(feature = "cassandra", feature = "dynamodb")), allow(dead_code))]
async fn execute<S, T>(cli: &Cli, orchestrator: Orchestrator<S, T>) -> Result<(), MigrateError>
where
    S: SourceSeeder,
    T: TargetWriter,
{
    match cli.command {
        Commands::Run => {
            let result = orchestrator.run().await?;
            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print_summary(&result);
            }
            write_success_line(
                cli.output_json,
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )?;
        }

        Commands::Seed { count } => {
            let inserted = orchestrator.seed(count).await?;
            if cli.output_json {
                println!("{}", serde_json::json!({ "records_inserted": inserted }));
            } else {
                println!("Finished inserting {} sample records.", inserted);
            }
        }

        Commands::HealthCheck => {
            let result = orchestrator.health_check().await;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_health(&result);
            }

            if !result.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

/// In JSON mode stdout carries only the JSON document.
#[cfg_attr(not(all(feature = "cassandra", feature = "dynamodb")), allow(dead_code))]
fn write_success_line(
    output_json: bool,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> std::io::Result<()> {
    let out: &mut dyn Write = if output_json { stderr } else { stdout };
    writeln!(out, "{}", SUCCESS_LINE)
}

#[cfg_attr(not(all(feature = "cassandra", feature = "dynamodb")), allow(dead_code))]
fn print_summary(result: &MigrationResult) {
    println!("\nMigration completed!");
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!("  Records read: {}", result.records_read);
    println!("  Records written: {}", result.records_written);
    println!("  Throughput: {} records/sec", result.records_per_second);
}

#[cfg_attr(not(all(feature = "cassandra", feature = "dynamodb")), allow(dead_code))]
fn print_health(result: &HealthCheckResult) {
    println!("Health Check Results:");
    println!(
        "  Source (Cassandra): {} ({}ms)",
        if result.source_connected { "OK" } else { "FAILED" },
        result.source_latency_ms
    );
    if let Some(ref err) = result.source_error {
        println!("    Error: {}", err);
    }
    println!(
        "  Target (DynamoDB): {} ({}ms)",
        if result.target_connected { "OK" } else { "FAILED" },
        result.target_latency_ms
    );
    if let Some(ref err) = result.target_error {
        println!("    Error: {}", err);
    }
    println!(
        "\n  Overall: {}",
        if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
    );
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
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line_goes_to_stderr_in_json_mode() {
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        write_success_line(true, &mut stdout, &mut stderr).unwrap();

        assert!(stdout.is_empty());
        assert_eq!(String::from_utf8(stderr).unwrap(), format!("{}\n", SUCCESS_LINE));
    }

    #[test]
    fn test_success_line_goes_to_stdout_in_text_mode() {
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        write_success_line(false, &mut stdout, &mut stderr).unwrap();

        assert!(stderr.is_empty());
        assert_eq!(String::from_utf8(stdout).unwrap(), format!("{}\n", SUCCESS_LINE));
    }
}
