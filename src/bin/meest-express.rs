use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use meest_express::config::loader;
use meest_express::observability::metrics::get_metrics;
use meest_express::utils::logging::{self, LogLevel};
use meest_express::{FilterSet, MeestExpress};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config; without it everything is read from the environment
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics to stderr before exiting
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a valid token, authenticating only if the cached one expired
    Token,
    /// Search branches; prints `[]` when the search fails
    Branches {
        /// Search filter as `field=value`, e.g. `cityDescr=Київ`. Repeatable.
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("expected field=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = loader::run(args.config.as_deref()).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build client
    // -------------------------------

    let mut meest = MeestExpress::new(&service_config)?;
    info!(base_url = %service_config.api.base_url, "client ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Token => {
            let token = meest.get_token().await?;
            println!("{}", token);
        }
        Command::Branches { filters } => {
            let filters = FilterSet::from_input(filters);
            let branches = meest.get_branches(&filters).await;
            println!("{}", serde_json::to_string_pretty(&branches)?);
        }
    }

    if args.print_metrics {
        eprintln!("{}", get_metrics().await.encode()?);
    }
    Ok(())
}
