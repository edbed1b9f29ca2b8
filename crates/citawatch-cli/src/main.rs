use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use citawatch_api::Orchestrator;
use citawatch_core::AppConfig;
use citawatch_notify::{LogNotifier, Notifier, TelegramNotifier};
use citawatch_scraper::PortalScraper;

#[derive(Debug, Parser)]
#[command(name = "citawatch")]
#[command(about = "Checks medical appointment availability and notifies when slots open")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one availability sweep across the configured services.
    Check {
        /// Restrict the sweep to a single service.
        #[arg(long, value_enum)]
        service: Option<Service>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Service {
    Api,
    Portal,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = citawatch_core::load_app_config().context("failed to load configuration")?;

    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let service = match cli.command {
        Some(Commands::Check { service }) => service,
        None => None,
    };

    run_check(config, service).await
}

async fn run_check(config: AppConfig, service: Option<Service>) -> anyhow::Result<()> {
    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(
            TelegramNotifier::new(telegram).context("failed to build Telegram notifier")?,
        ),
        None => {
            tracing::info!("Telegram is not configured; notifications go to the log");
            Arc::new(LogNotifier)
        }
    };

    // Run-level cancellation: Ctrl-C stops scheduling of not-yet-started
    // jobs; in-flight jobs finish or hit their own timeouts.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received; cancelling remaining jobs");
            let _ = cancel_tx.send(true);
        }
    });

    if service.is_none() || service == Some(Service::Api) {
        match &config.api {
            Some(api_config) => {
                match Orchestrator::new(api_config.clone(), Arc::clone(&notifier)) {
                    Ok(orchestrator) => {
                        if let Err(e) = orchestrator.run(cancel_rx.clone()).await {
                            tracing::error!(error = %e, "booking API sweep finished with an error");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to build the booking API client");
                    }
                }
            }
            None => tracing::info!("booking API is not configured; skipping"),
        }
    }

    if service.is_none() || service == Some(Service::Portal) {
        match &config.portal {
            Some(portal_config) => {
                let scraper = PortalScraper::new(portal_config.clone(), Arc::clone(&notifier));
                if let Err(e) = scraper.run(cancel_rx).await {
                    tracing::error!(error = %e, "portal sweep finished with an error");
                }
            }
            None => tracing::info!("portal is not configured; skipping"),
        }
    }

    Ok(())
}
