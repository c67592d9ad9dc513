use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wikiscrape::config::load_config;
use wikiscrape::fetch::HttpSource;
use wikiscrape::pipeline::{RunOptions, cache_status, reset_cache, run};

#[derive(Parser, Debug)]
#[command(name = "wikiscrape", about = "Wiki vehicle and apartment table scraper")]
struct Cli {
    /// TOML configuration; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    Status,
    ResetCache,
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging.level)?;

    match cli.command {
        Commands::Run { force } => {
            let source = HttpSource::new(&config.fetch)?;
            let report = run(&config, &source, &RunOptions { force })?;

            for dataset in &report.datasets {
                info!(
                    dataset = %dataset.dataset,
                    items = dataset.items,
                    count_changed = dataset.count_changed,
                    refreshed = dataset.refreshed,
                    enriched = dataset.enriched,
                    without_page = dataset.without_page,
                    fetched = dataset.pages_fetched,
                    csv = dataset.csv_path.as_deref().unwrap_or_default(),
                    "dataset summary"
                );
            }
        }
        Commands::Status => {
            let status = cache_status(&config)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::ResetCache => {
            reset_cache(&config)?;
            info!("cache reset");
        }
        Commands::Validate => {
            println!("OK");
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
