mod api;
mod config;
mod error;
mod routes;

use anyhow::Context;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use api::RouterClient;
use config::{Action, Config};
use error::AppError;
use routes::reconcile::{Reconciliation, reconcile};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            if let Some(app_err) = err.downcast_ref::<AppError>() {
                if !matches!(app_err, AppError::ConfigurationInvalid(_)) {
                    eprintln!("{}", app_err.user_message());
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Configuration is validated before the first request is sent.
async fn run() -> anyhow::Result<()> {
    let config = Config::load().context("configuration")?;

    // Logs go to stderr, stdout only carries route descriptions
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &config.source {
        tracing::info!("Loaded configuration from: {}", path.display());
    }
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!("{:?}", config.router);

    let client = RouterClient::new(&config.router)?;
    let session = client
        .login(&config.router.user, &config.router.password)
        .await
        .context("login")?;
    let existing = client
        .fetch_routes(&session)
        .await
        .context("query routes")?;

    match &config.action {
        Action::List => {
            for route in &existing {
                println!("{}", route);
            }
        }
        Action::Apply(desired) => {
            let Reconciliation { route, created } = reconcile(desired, &existing);
            if created {
                tracing::info!(
                    "No route to {}/{} via {} yet, adding it as slot {:?}",
                    route.network(),
                    route.subnet_mask(),
                    route.gateway(),
                    route.index()
                );
            } else {
                tracing::info!("Updating existing route (active: {})", route.is_active());
            }
            client
                .apply_route(&session, &route)
                .await
                .context("apply route")?;
            println!("{}", route);
        }
    }

    Ok(())
}
