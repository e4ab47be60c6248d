use anyhow::Result;
use goodhuman_bot::bootstrap;
use goodhuman_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use goodhuman_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

async fn run() -> Result<()> {
    // Logging needs the config, so load it first and hand the same value to bootstrap.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let mut context = app.context;

    tracing::info!(
        event_name = "system.bot.started",
        correlation_id = "bootstrap",
        subreddit = %app.config.bot.subreddit,
        poll_interval_secs = app.config.bot.poll_interval_secs,
        "goodhuman-bot started"
    );
    let outcome = app.run_loop.run(&mut context, wait_for_shutdown()).await;

    tracing::info!(
        event_name = "system.bot.stopping",
        correlation_id = "shutdown",
        "goodhuman-bot stopping"
    );
    context.teardown().await;

    outcome?;
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(
            event_name = "system.bot.signal_unavailable",
            correlation_id = "shutdown",
            error = %error,
            "could not listen for ctrl-c; running until a fatal error"
        );
        std::future::pending::<()>().await;
    }
}
