//! pg-mysql-reconcile CLI - PostgreSQL to MySQL schema translation and validation.

use clap::{Parser, Subcommand};
use pg_mysql_reconcile::error::EXIT_VALIDATION_FAILED;
use pg_mysql_reconcile::{
    Config, CreateTableBuilder, Facet, JsonLinesSink, MemorySink, PostgresToMysqlMapper,
    Reconciler, ReconcileError, SnapshotCatalog, ValidationReport,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "pg-mysql-reconcile")]
#[command(about = "PostgreSQL to MySQL schema translation and migration validation")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Write each result as a JSON line to this file
    #[arg(long)]
    report: Option<PathBuf>,

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
    /// Emit MySQL CREATE TABLE statements for the source schema
    Ddl {
        /// Qualify table names with the target database
        #[arg(long)]
        qualified: bool,
    },

    /// Compare source and target column sets
    SchemaDiff,

    /// Compare exact row counts between source and target
    Counts,

    /// Compare sampled rows between source and target
    Verify {
        /// Override the number of rows sampled per table
        #[arg(long)]
        sample_size: Option<usize>,
    },

    /// Run schema, row count and sampled row checks
    Validate {
        /// Override the number of rows sampled per table
        #[arg(long)]
        sample_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, ReconcileError> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let facets: &[Facet] = match cli.command {
        Commands::Ddl { qualified } => {
            emit_ddl(&config, qualified, cli.output_json)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::SchemaDiff => &[Facet::Schema],
        Commands::Counts => &[Facet::Count],
        Commands::Verify { sample_size } => {
            apply_sample_size(&mut config, sample_size)?;
            &[Facet::Sample]
        }
        Commands::Validate { sample_size } => {
            apply_sample_size(&mut config, sample_size)?;
            &[Facet::Schema, Facet::Count, Facet::Sample]
        }
    };

    let source = Arc::new(SnapshotCatalog::load(&config.source.snapshot)?);
    let target = Arc::new(SnapshotCatalog::load(&config.target.snapshot)?);
    let reconciler = Reconciler::from_config(&config, source, target);

    let report = match &cli.report {
        Some(path) => {
            let mut sink = JsonLinesSink::new(BufWriter::new(File::create(path)?));
            reconciler.run_facets(facets, &mut sink).await?
        }
        None => {
            let mut sink = MemorySink::new();
            reconciler.run_facets(facets, &mut sink).await?
        }
    };

    if cli.output_json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_VALIDATION_FAILED))
    }
}

fn apply_sample_size(config: &mut Config, sample_size: Option<usize>) -> Result<(), ReconcileError> {
    if let Some(k) = sample_size {
        config.validation.sample_size = k;
        config.validate()?;
    }
    Ok(())
}

fn emit_ddl(config: &Config, qualified: bool, output_json: bool) -> Result<(), ReconcileError> {
    let source = SnapshotCatalog::load(&config.source.snapshot)?;
    let mapper = PostgresToMysqlMapper::new();
    let mut builder = CreateTableBuilder::new(&mapper)
        .widen_identity_columns(config.validation.widen_identity_columns);
    if qualified {
        builder = builder.target_schema(&config.target.schema);
    }

    let mut statements = Vec::new();
    for table in source.table_snapshots() {
        if !config.validation.includes_table(&table.name) {
            continue;
        }
        statements.push((table.name.clone(), builder.build(&table)?));
    }

    if output_json {
        let json: Vec<_> = statements
            .iter()
            .map(|(table, ddl)| serde_json::json!({ "table": table, "ddl": ddl }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for (_, ddl) in &statements {
            println!("{};\n", ddl);
        }
    }

    info!("Generated DDL for {} tables", statements.len());
    Ok(())
}

fn print_summary(report: &ValidationReport) {
    if !report.schema.is_empty() {
        println!("Schema:");
        for entry in &report.schema {
            let status = if entry.status.is_ok() { "✓" } else { "✗" };
            match &entry.issue {
                Some(issue) if !entry.status.is_ok() => {
                    println!("  {} {}: {}", status, entry.table, issue)
                }
                _ => println!("  {} {}", status, entry.table),
            }
        }
    }

    if !report.counts.is_empty() {
        println!("Row counts:");
        for count in &report.counts {
            let status = if count.matches { "✓" } else { "✗" };
            println!(
                "  {} {} (source: {}, target: {})",
                status, count.table, count.source_count, count.target_count
            );
        }
    }

    if !report.samples.is_empty() {
        println!("Sampled rows:");
        for sample in &report.samples {
            let status = if sample.passed { "✓" } else { "✗" };
            println!(
                "  {} {} ({}/{} rows matched)",
                status, sample.table, sample.rows_matched, sample.rows_checked
            );
            for mismatch in &sample.mismatches {
                match &mismatch.column {
                    Some(column) => println!(
                        "      id {} {}: {:?}",
                        mismatch.row_id, column, mismatch.kind
                    ),
                    None => println!("      id {}: {:?}", mismatch.row_id, mismatch.kind),
                }
            }
            if let Some(issue) = &sample.issue {
                println!("      {}", issue);
            }
        }
    }

    for error in &report.errors {
        println!("  ✗ Error in {} check for {}: {}", error.check, error.table, error.message);
    }

    println!(
        "\nValidation {} in {:.2}s",
        if report.passed() { "passed" } else { "found differences" },
        report.duration_ms as f64 / 1000.0
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

    // Logs go to stderr so --output-json stays parseable.
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
