#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use clap::Parser;
use stashgen::cli::Args;
use stashgen::generator::{Generator, GeneratorConfig};
use tracing::Level;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = if let Some(path) = &args.generator {
        tracing::info!("Loading generator config from: {}", path);
        GeneratorConfig::load(path).await?
    } else {
        tracing::debug!("No generator config given, using defaults");
        GeneratorConfig::default()
    };

    if let Some(source) = args.source {
        config.source = source;
    }

    let generator = Generator::new(config);

    match generator.generate_to_file(args.output.as_deref()).await? {
        Some(_) => tracing::info!("Config generation complete!"),
        None => tracing::info!("Nothing to write"),
    }
    Ok(())
}
