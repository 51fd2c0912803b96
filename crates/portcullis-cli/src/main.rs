//! Portcullis CLI - run BuildConfig and Route manifests through their lifecycle strategies

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
mod error;
mod exit_codes;
mod manifest;
mod selector;

use config::Config;
use display::OutputFormat;

#[derive(Parser)]
#[command(name = "portcullis")]
#[command(author = "Portcullis Contributors")]
#[command(version)]
#[command(about = "Apply create/update lifecycle strategies to BuildConfig and Route manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/portcullis/config.yaml)
    #[arg(long, global = true, env = "PORTCULLIS_CONFIG")]
    config: Option<PathBuf>,

    /// Namespace of the request
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Output format (create/update default: yaml, match default: name)
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an object through the create hooks
    Create {
        /// Manifest file
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,
    },

    /// Run an object through the update hooks against its stored copy
    Update {
        /// Manifest of the stored object
        #[arg(long)]
        old: PathBuf,

        /// Manifest of the submitted object
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,

        /// Update through the status subresource
        #[arg(long)]
        status: bool,
    },

    /// Filter objects by labels and fields
    Match {
        /// Manifest file (multi-document or kind: List)
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,

        /// Label requirement: key=value, key!=value, key, !key
        #[arg(short = 'l', long = "selector")]
        labels: Vec<String>,

        /// Field requirement: field=value, field!=value
        #[arg(short = 'F', long = "field-selector")]
        fields: Vec<String>,
    },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PORTCULLIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let namespace = cli.namespace.as_deref();

    match cli.command {
        Commands::Create { file } => {
            let config = Config::load(cli.config.as_deref())?;
            let output = cli.output.unwrap_or_default();
            commands::create::run(&config, &file, namespace, output)
        }

        Commands::Update { old, file, status } => {
            let config = Config::load(cli.config.as_deref())?;
            let output = cli.output.unwrap_or_default();
            commands::update::run(&config, &old, &file, status, namespace, output)
        }

        Commands::Match {
            file,
            labels,
            fields,
        } => {
            let output = cli.output.unwrap_or(OutputFormat::Name);
            commands::matching::run(&file, &labels, &fields, output)
        }
    }
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
