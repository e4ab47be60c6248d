use std::sync::Arc;
use std::time::Duration;

use goodhuman_core::config::{AppConfig, ConfigError, LoadOptions};
use goodhuman_core::signature::Signature;
use goodhuman_reddit::{HttpRedditClient, RedditError, SubredditCommentFeed};
use thiserror::Error;
use tracing::info;

use crate::dedup::{DedupStore, StoreInitError};
use crate::runner::{BotContext, RunLoop};
use crate::stream::StreamProcessor;
use crate::watcher::ReplyWatcher;

pub struct Application {
    pub config: AppConfig,
    pub context: BotContext,
    pub run_loop: RunLoop,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreInitError),
    #[error("reddit client setup failed: {0}")]
    Reddit(#[source] RedditError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Wires the bot from an already loaded config. Welcome messages are resolved
/// before the database is touched so a bad message file fails fast.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        subreddit = %config.bot.subreddit,
        "starting bot bootstrap"
    );
    let messages = config.welcome_messages()?;

    let store = DedupStore::initialize(&config.database).await?;

    let client =
        Arc::new(HttpRedditClient::from_config(&config.reddit).map_err(BootstrapError::Reddit)?);
    let feed = SubredditCommentFeed::new(client.clone(), config.bot.subreddit.clone());
    let processor = StreamProcessor::new(
        Signature::new(&config.bot.signature),
        &config.bot.ignore_subreddits,
        config.reddit.username.clone(),
    );
    let watcher = ReplyWatcher::new(messages);
    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        username = %config.reddit.username,
        ignored_subreddits = config.bot.ignore_subreddits.len(),
        "bot wired"
    );

    let context = BotContext::new(client, Box::new(feed), store, processor, watcher);
    let run_loop = RunLoop::new(Duration::from_secs(config.bot.poll_interval_secs));
    Ok(Application { config, context, run_loop })
}
