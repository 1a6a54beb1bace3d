mod calendar;
mod categorizer;
mod cli;
mod dates;
mod error;
mod models;
mod publish;
mod reader;
mod routes;
mod runner;
mod settings;
mod sink;
mod source;
mod transforms;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            source_dir,
            output_dir,
            sink,
        } => cli::init::run(source_dir, output_dir, sink),
        Commands::Run {
            today,
            source_dir,
            sink,
            dry_run,
            keep_going,
        } => cli::run::run(today.as_deref(), source_dir, sink, dry_run, keep_going),
        Commands::Routes => cli::routes::list(),
        Commands::Transform {
            file,
            transform,
            today,
            out_dir,
        } => cli::transform::run(&file, transform.as_deref(), today.as_deref(), out_dir),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
