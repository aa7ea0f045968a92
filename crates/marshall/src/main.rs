//! marshall CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "marshall")]
#[command(version)]
#[command(about = "Read and write XML documents through flat identifiers", long_about = None)]
struct Cli {
    /// Schema tables (TOML); defaults to the built-in SKY query schema
    #[arg(long, global = true, value_name = "FILE")]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every identifier of a document with its current value
    Show {
        /// Document to read
        file: PathBuf,

        /// Print the document in canonical form instead
        #[arg(long)]
        xml: bool,
    },

    /// Print the values of one or more identifiers
    Get {
        /// Document to read
        file: PathBuf,

        /// Identifiers to read
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Change identifiers of an existing document
    Set {
        /// Document to read
        file: PathBuf,

        /// Assignments (KEY=VALUE)
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Write the result to FILE instead of standard output
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Replace FILE if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Create a document from assignments
    New {
        /// Assignments (KEY=VALUE)
        assignments: Vec<String>,

        /// Write the result to FILE instead of standard output
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Replace FILE if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the output path a SKY query will produce
    OutputName {
        /// Query document
        file: PathBuf,
    },

    /// Pipe a SKY query into the SKY client
    Query {
        /// Query document
        file: PathBuf,

        /// Program that reads the query on standard input
        #[arg(long, default_value = "sky")]
        program: String,

        /// Extra arguments for the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        program_args: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marshall=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let schema = cli.schema.as_deref();

    match cli.command {
        Commands::Show { file, xml } => commands::show::execute(schema, &file, xml),
        Commands::Get { file, identifiers } => {
            commands::get::execute(schema, &file, &identifiers)
        }
        Commands::Set {
            file,
            assignments,
            output,
            overwrite,
        } => commands::set::execute(commands::set::SetArgs {
            schema,
            file: &file,
            assignments: &assignments,
            output: output.as_deref(),
            overwrite,
        }),
        Commands::New {
            assignments,
            output,
            overwrite,
        } => commands::new::execute(schema, &assignments, output.as_deref(), overwrite),
        Commands::OutputName { file } => commands::output_name::execute(schema, &file),
        Commands::Query {
            file,
            program,
            program_args,
        } => commands::query::execute(schema, &file, &program, &program_args),
    }
}
