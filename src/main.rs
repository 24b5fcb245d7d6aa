use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use datastep_lang::cli::{self, CheckOptions, CheckResult, CliError, RunCommand};
use datastep_lang::{Grammar, OutputFormat, RunOptions, request::DEFAULT_LIMIT};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(ClapParser)]
#[command(name = "datastep")]
#[command(about = "datastep - Run SAS-style DATA and PROC scripts over CSV and spreadsheet files")]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script
    Run {
        /// Script file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Result format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Rows shown by PROC PRINT without OBS
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Draw a chart for every PROC REG
        #[arg(long)]
        plot: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Directory relative SET paths resolve against
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Dataset to load when a PROC step runs before any DATA step
        #[arg(long)]
        source: Option<String>,
    },

    /// Run a JSON request ({"code": ..., "output_format": ..., ...})
    Request {
        /// Request file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Directory relative SET paths resolve against
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Validate a script without reading any data
    Check {
        /// Script file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Print the planned steps
        #[arg(long)]
        plan: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'datastep docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let grammar = Grammar::new();

    let result = match cli.command {
        Commands::Run {
            file,
            format,
            limit,
            plot,
            pretty,
            base_dir,
            source,
        } => read_input(file).and_then(|code| {
            let command = RunCommand {
                code,
                options: RunOptions {
                    output_format: format,
                    limit,
                    plot,
                },
                base_dir,
                source,
            };
            let response = cli::execute_run(&grammar, &command)?;
            print_json(&response, pretty)
        }),
        Commands::Request {
            file,
            pretty,
            base_dir,
        } => read_input(file).and_then(|json| {
            let response = cli::execute_request(&grammar, &json, base_dir.as_ref())?;
            print_json(&response, pretty)
        }),
        Commands::Check { file, plan } => read_input(file).and_then(|code| {
            let options = CheckOptions {
                code,
                show_plan: plan,
            };
            match cli::execute_check(&grammar, &options)? {
                CheckResult::Valid { steps } => println!("Script is valid ({} steps)", steps),
                CheckResult::Plan(steps) => {
                    for (i, step) in steps.iter().enumerate() {
                        println!("{}. {:#?}", i + 1, step);
                    }
                }
            }
            Ok(())
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// File contents, or stdin when no file is given and stdin is piped.
fn read_input(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}
