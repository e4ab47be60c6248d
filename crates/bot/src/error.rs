use goodhuman_db::RepositoryError;
use goodhuman_reddit::RedditError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Reddit(#[from] RedditError),
    #[error("dedup store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl CycleError {
    /// Only platform hiccups are retried; everything else stops the bot.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reddit(error) => error.is_transient(),
            Self::Store(_) => false,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Reddit(error) if error.is_transient() => "reddit_transient",
            Self::Reddit(_) => "reddit_fatal",
            Self::Store(_) => "store",
        }
    }
}
