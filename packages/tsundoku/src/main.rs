use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_client::Provider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tsundoku::shell::{commands, Shell};
use tsundoku::{Config, Extractor, HttpFetcher, StoreKind, Strategy, Triage};

#[derive(Parser)]
#[command(name = "tsundoku")]
#[command(about = "Read-it-later shelf: fetch, summarize, and keep articles")]
#[command(version)]
struct Cli {
    /// Where the shelf lives (overrides TSUNDOKU_STORE)
    #[arg(long, global = true)]
    store: Option<StoreKind>,

    /// How the model is asked for structure (overrides TSUNDOKU_STRATEGY)
    #[arg(long, global = true)]
    strategy: Option<Strategy>,

    /// Generation backend (overrides TSUNDOKU_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<Provider>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Shell,

    /// Fetch, summarize and shelve one article
    Add { url: String },

    /// Show the shelf, newest first
    List,

    /// Delete the article shown as number N by `list`
    Delete { number: usize },

    /// Delete every article
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so the interactive UI stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,tsundoku=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    if let Some(strategy) = cli.strategy {
        config.extractor = config.extractor.with_strategy(strategy);
    }
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }

    let generator = config.build_generator()?;
    let store = config.connect_store().await?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;

    tracing::info!(
        provider = %config.provider,
        model = generator.model(),
        strategy = %config.extractor.strategy,
        store = store.name(),
        "Starting tsundoku"
    );

    let triage = Triage::new(
        Arc::new(fetcher),
        Extractor::new(generator, config.extractor),
        store,
    );

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            Shell::new(triage).run().await?;
            Ok(true)
        }
        Commands::Add { url } => Ok(commands::add(&triage, &url).await),
        Commands::List => Ok(commands::list(&triage).await),
        Commands::Delete { number } => Ok(commands::delete(&triage, number).await),
        Commands::Clear { yes } => commands::clear(&triage, yes).await,
    }
}
