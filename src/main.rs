mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use plexherald::{
    config,
    metadata::{Enricher, TmdbProvider},
    notify::Notifier,
    plex::PlexClient,
    poller::Poller,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "plexherald=debug".to_string()
        } else {
            "plexherald=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start(cli.config.as_deref()))
        }
        Commands::Check => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check(cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::Version => {
            println!("plexherald {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    tracing::info!("Starting plexherald");

    let plex = PlexClient::new(&config.plex.base_url, &config.plex.token);
    match plex.check_connection().await {
        Ok(true) => tracing::info!("Plex server reachable at {}", plex.base_url()),
        Ok(false) => tracing::warn!(
            "Plex server at {} answered with an error; polling will keep retrying",
            plex.base_url()
        ),
        Err(e) => tracing::warn!(
            "Plex server at {} not reachable ({e:#}); polling will keep retrying",
            plex.base_url()
        ),
    }

    let enricher = config
        .tmdb
        .api_key
        .as_deref()
        .map(|key| Enricher::new(Arc::new(TmdbProvider::new(key.to_string()))));
    if enricher.is_none() {
        tracing::info!("TMDB API key not set; enrichment disabled");
    }

    let notifier = Notifier::new(config.slack.webhook_url.as_deref());
    if !notifier.has_targets() {
        tracing::info!("Slack webhook not set; notifications disabled");
    }

    // Shutdown channel for the poller task
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    let poller = Poller::new(&config, plex, enricher, notifier);
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(()).await;
    let _ = poller_handle.await;

    Ok(())
}

async fn check(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking integrations...\n");

    let plex = PlexClient::new(&config.plex.base_url, &config.plex.token);
    match plex.check_connection().await {
        Ok(true) => println!("✓ Plex - {}", plex.base_url()),
        Ok(false) => println!("✗ Plex - {} (server returned an error)", plex.base_url()),
        Err(e) => println!("✗ Plex - {} ({e:#})", plex.base_url()),
    }

    match config.tmdb.api_key {
        Some(_) => println!("✓ TMDB - API key configured"),
        None => println!("- TMDB - not configured, enrichment disabled"),
    }

    match config.slack.webhook_url {
        Some(_) => println!("✓ Slack - webhook configured"),
        None => println!("- Slack - not configured, notifications disabled"),
    }

    Ok(())
}

fn validate(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            let config = config::load_config_or_default(None)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    println!("  Plex: {}", config.plex.base_url);
    println!("  Libraries: {}", config.plex.library_ids.len());
    println!("  Interval: {} minutes", config.poller.interval_minutes);
    println!("  State file: {:?}", config.poller.state_path);
    println!("  Enrichment: {}", config.tmdb.api_key.is_some());
    println!("  Notifications: {}", config.slack.webhook_url.is_some());
}
