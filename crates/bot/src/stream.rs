use std::collections::HashSet;

use tracing::{debug, info};

use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::DedupKind;
use goodhuman_core::messages::ACKNOWLEDGEMENT;
use goodhuman_core::signature::Signature;
use goodhuman_reddit::feed::BoundedIdSet;
use goodhuman_reddit::{CommentFeed, RedditApi};

use crate::dedup::DedupStore;
use crate::error::CycleError;

/// Comment ids the processor remembers across passes before forgetting the oldest.
pub const SEEN_CAPACITY: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    Exhausted,
    AlreadySeen(CommentId),
    AlreadyReplied(CommentId),
}

impl StreamEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::AlreadySeen(_) => "already_seen",
            Self::AlreadyReplied(_) => "already_replied",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamPassSummary {
    pub scanned: usize,
    pub replied: usize,
    pub end: StreamEnd,
}

/// Thanks transcribers: replies once to every signed comment in the feed.
pub struct StreamProcessor {
    signature: Signature,
    ignored: HashSet<String>,
    bot_username: String,
    acknowledgement: String,
    seen: BoundedIdSet,
}

impl StreamProcessor {
    /// `ignore_subreddits` is compared case-insensitively.
    pub fn new(
        signature: Signature,
        ignore_subreddits: &[String],
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            signature,
            ignored: ignore_subreddits.iter().map(|name| name.to_lowercase()).collect(),
            bot_username: bot_username.into(),
            acknowledgement: ACKNOWLEDGEMENT.to_owned(),
            seen: BoundedIdSet::new(SEEN_CAPACITY),
        }
    }

    pub fn seen(&self) -> usize {
        self.seen.len()
    }

    /// Consumes one batch from `feed`, stopping early at the first comment
    /// already handled in an earlier pass or recorded as replied.
    ///
    /// A comment is remembered and committed to the feed only once it has
    /// been handled, so a failed call leaves it for the next pass.
    pub async fn run_pass(
        &mut self,
        feed: &mut dyn CommentFeed,
        api: &dyn RedditApi,
        store: &mut DedupStore,
        correlation_id: &str,
    ) -> Result<StreamPassSummary, CycleError> {
        let batch = feed.next_batch().await?;
        let mut scanned = 0;
        let mut replied = 0;

        for comment in batch {
            scanned += 1;

            if self.ignored.contains(&comment.subreddit.to_lowercase()) {
                feed.commit(&comment.id);
                continue;
            }
            if self.seen.contains(comment.id.as_str()) {
                feed.commit(&comment.id);
                return Ok(StreamPassSummary {
                    scanned,
                    replied,
                    end: StreamEnd::AlreadySeen(comment.id),
                });
            }
            if !self.signature.matches(&comment.body) {
                self.handled(feed, &comment.id);
                continue;
            }
            if comment.is_authored_by(&self.bot_username) {
                debug!(
                    event_name = "bot.stream.own_comment_skipped",
                    correlation_id,
                    comment_id = %comment.id,
                    "skipping the bot's own comment"
                );
                self.handled(feed, &comment.id);
                continue;
            }
            if store.is_replied(&comment.id).await? {
                self.handled(feed, &comment.id);
                return Ok(StreamPassSummary {
                    scanned,
                    replied,
                    end: StreamEnd::AlreadyReplied(comment.id),
                });
            }

            api.reply(&comment.id, &self.acknowledgement).await?;
            store.record_comment(&comment, DedupKind::Replied).await?;
            self.handled(feed, &comment.id);
            replied += 1;
            info!(
                event_name = "bot.stream.replied",
                correlation_id,
                comment_id = %comment.id,
                subreddit = %comment.subreddit,
                author = comment.author_name(),
                "thanked transcriber"
            );
        }

        Ok(StreamPassSummary { scanned, replied, end: StreamEnd::Exhausted })
    }

    fn handled(&mut self, feed: &mut dyn CommentFeed, id: &CommentId) {
        self.seen.insert(id.as_str());
        feed.commit(id);
    }
}
