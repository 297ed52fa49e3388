//! kgcsv CLI
//!
//! Command-line front end for schema-driven CSV imports:
//! - `validate`: check a CSV file against a bundled schema and report problems
//! - `import`: validate and write headers plus typed records as JSON
//! - `schema`: show the namespaces and type tags of a bundled schema

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use kgcsv_core::schemes;
use kgcsv_core::{CsvHeader, CsvSchema, Namespace, TypedCsvRecord};
use kgcsv_ingest::{read_csv_path, CsvReadOptions, ImportReport, Pipeline, RowProblem};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "kgcsv")]
#[command(
    author,
    version,
    about = "kgcsv: schema-driven CSV validation for knowledge-graph imports"
)]
struct Cli {
    /// Log filter, e.g. `debug` or `kgcsv_ingest=debug` (defaults to RUST_LOG, then `warn`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CSV file and print every problem found.
    Validate {
        /// Input CSV file
        input: PathBuf,
        #[command(flatten)]
        read: ReadArgs,
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a CSV file and write its typed records as JSON.
    Import {
        /// Input CSV file
        input: PathBuf,
        /// Output JSON file (headers + typed records)
        #[arg(short, long)]
        out: PathBuf,
        #[command(flatten)]
        read: ReadArgs,
    },

    /// Show the namespaces, properties and type tags of a schema.
    Schema {
        #[arg(long, value_enum, default_value_t = SchemaKind::Paper)]
        schema: SchemaKind,
    },
}

#[derive(Args)]
struct ReadArgs {
    /// Schema the file is validated against
    #[arg(long, value_enum, default_value_t = SchemaKind::Paper)]
    schema: SchemaKind,
    /// Field delimiter (single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Trim whitespace around fields
    #[arg(long)]
    trim: bool,
    /// Skip lines starting with this character
    #[arg(long)]
    comment: Option<char>,
    /// Parse rows on the current thread only
    #[arg(long)]
    sequential: bool,
}

impl ReadArgs {
    fn options(&self) -> Result<CsvReadOptions> {
        Ok(CsvReadOptions {
            delimiter: ascii_byte(self.delimiter, "delimiter")?,
            trim: self.trim,
            comment: self
                .comment
                .map(|c| ascii_byte(c, "comment"))
                .transpose()?,
            ..CsvReadOptions::default()
        })
    }
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    ensure!(c.is_ascii(), "{what} must be an ASCII character, got {c:?}");
    Ok(c as u8)
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaKind {
    /// Paper bulk import (`paper:*`, `contribution:*`, `orkg:*`)
    Paper,
}

impl SchemaKind {
    fn build(self) -> Result<CsvSchema> {
        match self {
            SchemaKind::Paper => schemes::paper_csv().context("building paper schema"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

/// Written by `import`.
#[derive(Serialize)]
struct TypedImport<'a> {
    headers: &'a [CsvHeader],
    records: &'a [TypedCsvRecord],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let ok = match cli.command {
        Commands::Validate {
            input,
            read,
            format,
        } => cmd_validate(&input, &read, format)?,
        Commands::Import { input, out, read } => cmd_import(&input, &out, &read)?,
        Commands::Schema { schema } => {
            cmd_schema(schema)?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn run_pipeline(input: &Path, read: &ReadArgs) -> Result<ImportReport> {
    let options = read.options()?;
    let schema = read.schema.build()?;
    tracing::debug!(
        schema = ?read.schema,
        ?options,
        parallel = !read.sequential,
        "resolved read options"
    );
    let source = read_csv_path(input, &options)
        .with_context(|| format!("reading {}", input.display()))?;
    Ok(Pipeline::new(&schema)
        .parallel(!read.sequential)
        .run(&source))
}

fn cmd_validate(input: &Path, read: &ReadArgs, format: OutputFormat) -> Result<bool> {
    if format == OutputFormat::Text {
        println!("{} {}", "Validating".green().bold(), input.display());
    }

    let report = run_pipeline(input, read)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report),
    }
    Ok(report.is_valid())
}

fn cmd_import(input: &Path, out: &Path, read: &ReadArgs) -> Result<bool> {
    println!("{} {}", "Importing".green().bold(), input.display());

    let report = run_pipeline(input, read)?;
    if !report.is_valid() {
        print_summary(&report);
        println!("{}", "Nothing written.".yellow());
        return Ok(false);
    }

    let typed = TypedImport {
        headers: &report.headers,
        records: &report.records,
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, serde_json::to_string_pretty(&typed)?)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(
        out = %out.display(),
        records = report.records.len(),
        "typed import written"
    );

    println!(
        "  {} {} ({} records)",
        "→".cyan(),
        out.display(),
        report.records.len()
    );
    Ok(true)
}

fn cmd_schema(kind: SchemaKind) -> Result<()> {
    let schema = kind.build()?;

    println!("{}", "Header namespaces".green().bold());
    for namespace in schema.headers.namespaces() {
        print_namespace(namespace);
    }
    let pass_through: Vec<_> = schema.headers.pass_through_names().collect();
    if !pass_through.is_empty() {
        println!("  {} {}", "pass-through:".dimmed(), pass_through.join(", "));
    }

    println!("{}", "Value namespaces".green().bold());
    for namespace in schema.values.namespaces() {
        print_namespace(namespace);
    }

    println!("{}", "Type tags".green().bold());
    for (tag, ty) in &schema.type_mappings {
        println!("  <{}> {}", tag.yellow(), ty);
    }
    Ok(())
}

fn print_namespace(namespace: &Namespace) {
    let kind = if namespace.closed { "closed" } else { "open" };
    let ty = namespace
        .column_value_type
        .as_ref()
        .map(|t| format!(" {t}"))
        .unwrap_or_default();
    println!("  {} ({kind}{ty})", namespace.name.yellow());
    for property in namespace.properties.values() {
        let checked = property
            .validator
            .as_ref()
            .map(|v| format!(" [{}]", v.description()))
            .unwrap_or_default();
        println!("    {}: {}{}", property.name.cyan(), property.ty, checked.dimmed());
    }
}

fn print_summary(report: &ImportReport) {
    println!("  Columns: {}", report.headers.len());
    println!("  Rows: {}", report.rows_read);
    println!("  Valid rows: {}", report.valid_rows());

    if report.is_valid() {
        println!("{}", "Valid.".green());
        return;
    }

    if report.header_failed() {
        println!("  {}", "Header rejected; rows were not checked.".red());
    } else {
        println!("  Invalid rows: {}", report.invalid_rows().to_string().red());
    }
    for problem in &report.problems {
        print_problem(problem);
    }
    println!(
        "{}",
        format!("{} problem(s) found.", report.problems.len()).red().bold()
    );
}

fn print_problem(problem: &RowProblem) {
    let location = match problem.item_number {
        Some(item) => format!("line {} (item {item})", problem.line_number),
        None => format!("line {} (header)", problem.line_number),
    };
    println!(
        "    {} {}: {}",
        "✗".red(),
        location.yellow(),
        problem.problem.detail
    );
}
