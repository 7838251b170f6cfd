use anyhow::Result;
use clap::Parser;
use skyjournal::cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(!cli.no_color)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Build a context once, pass everywhere
    let ctx = cli.context();

    match cli.command {
        Commands::Import(args) => skyjournal::import_run(args, &ctx),
        Commands::Export(args) => skyjournal::export_run(args, &ctx),
        Commands::Classify(args) => skyjournal::classify_run(args, &ctx),
        Commands::Init(args) => skyjournal::infra::config_init(args, &ctx),
        Commands::Completions(args) => skyjournal::completion::run(args, &ctx),
    }
}
