use tracing::info;

use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::DedupKind;
use goodhuman_core::messages::WelcomeMessages;
use goodhuman_core::signature::is_thanks;
use goodhuman_reddit::feed::MAX_PAGE_SIZE;
use goodhuman_reddit::RedditApi;

use crate::dedup::DedupStore;
use crate::error::CycleError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEnd {
    Exhausted,
    AlreadyThanked(CommentId),
    AlreadyRead(CommentId),
}

impl WatchEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::AlreadyThanked(_) => "already_thanked",
            Self::AlreadyRead(_) => "already_read",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchPassSummary {
    pub inspected: usize,
    pub thanked: usize,
    pub end: WatchEnd,
}

/// Answers "thank you" replies to the bot with a random welcome message.
pub struct ReplyWatcher {
    messages: WelcomeMessages,
    inbox_limit: u32,
}

impl ReplyWatcher {
    pub fn new(messages: WelcomeMessages) -> Self {
        Self { messages, inbox_limit: MAX_PAGE_SIZE }
    }

    /// Walks the inbox newest first and stops at the first reply that is
    /// already read or already thanked in this process.
    pub async fn run_pass(
        &self,
        api: &dyn RedditApi,
        store: &mut DedupStore,
        correlation_id: &str,
    ) -> Result<WatchPassSummary, CycleError> {
        let inbox = api.comment_replies(self.inbox_limit).await?;
        let mut inspected = 0;
        let mut thanked = 0;

        for reply in inbox {
            inspected += 1;

            if store.is_thanked(&reply.id) {
                return Ok(WatchPassSummary {
                    inspected,
                    thanked,
                    end: WatchEnd::AlreadyThanked(reply.id),
                });
            }
            if !reply.is_new {
                return Ok(WatchPassSummary {
                    inspected,
                    thanked,
                    end: WatchEnd::AlreadyRead(reply.id),
                });
            }

            api.mark_read(&reply.id).await?;
            if !is_thanks(&reply.body) {
                continue;
            }

            let welcome = self.messages.choose(&mut rand::thread_rng()).to_owned();
            api.reply(&reply.id, &welcome).await?;
            store.record_reply(&reply, DedupKind::Thanked).await?;
            thanked += 1;
            info!(
                event_name = "bot.inbox.welcomed",
                correlation_id,
                comment_id = %reply.id,
                author = reply.author_name(),
                "answered thanks"
            );
        }

        Ok(WatchPassSummary { inspected, thanked, end: WatchEnd::Exhausted })
    }
}
