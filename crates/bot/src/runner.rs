use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use goodhuman_reddit::{CommentFeed, RedditApi};

use crate::dedup::DedupStore;
use crate::error::CycleError;
use crate::stream::{StreamPassSummary, StreamProcessor};
use crate::watcher::{ReplyWatcher, WatchPassSummary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleSummary {
    pub inbox: WatchPassSummary,
    pub stream: StreamPassSummary,
}

/// Owns everything a cycle touches, including the dedup caches.
pub struct BotContext {
    api: Arc<dyn RedditApi>,
    feed: Box<dyn CommentFeed>,
    store: DedupStore,
    processor: StreamProcessor,
    watcher: ReplyWatcher,
}

impl BotContext {
    pub fn new(
        api: Arc<dyn RedditApi>,
        feed: Box<dyn CommentFeed>,
        store: DedupStore,
        processor: StreamProcessor,
        watcher: ReplyWatcher,
    ) -> Self {
        Self { api, feed, store, processor, watcher }
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Inbox first, then the comment stream.
    pub async fn run_cycle(&mut self, correlation_id: &str) -> Result<CycleSummary, CycleError> {
        let inbox =
            self.watcher.run_pass(self.api.as_ref(), &mut self.store, correlation_id).await?;
        let stream = self
            .processor
            .run_pass(self.feed.as_mut(), self.api.as_ref(), &mut self.store, correlation_id)
            .await?;
        Ok(CycleSummary { inbox, stream })
    }

    pub async fn teardown(self) {
        self.store.teardown().await;
    }
}

pub struct RunLoop {
    interval: Duration,
}

impl RunLoop {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs cycles until `shutdown` resolves or a cycle fails with a
    /// non-transient error. Shutdown is only observed between cycles so a
    /// reply is never left unrecorded.
    pub async fn run<F>(&self, context: &mut BotContext, shutdown: F) -> Result<u64, CycleError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0_u64;

        loop {
            let correlation_id = Uuid::new_v4().to_string();
            cycles += 1;

            match context.run_cycle(&correlation_id).await {
                Ok(summary) => info!(
                    event_name = "bot.cycle.completed",
                    correlation_id = %correlation_id,
                    cycle = cycles,
                    inbox_inspected = summary.inbox.inspected,
                    inbox_thanked = summary.inbox.thanked,
                    inbox_end = summary.inbox.end.as_str(),
                    stream_scanned = summary.stream.scanned,
                    stream_replied = summary.stream.replied,
                    stream_end = summary.stream.end.as_str(),
                    "bot cycle completed"
                ),
                Err(cycle_error) if cycle_error.is_transient() => warn!(
                    event_name = "bot.cycle.transient_failure",
                    correlation_id = %correlation_id,
                    cycle = cycles,
                    error_class = cycle_error.class(),
                    error = %cycle_error,
                    "transient failure; retrying next cycle"
                ),
                Err(cycle_error) => {
                    error!(
                        event_name = "bot.cycle.failed",
                        correlation_id = %correlation_id,
                        cycle = cycles,
                        error_class = cycle_error.class(),
                        error = %cycle_error,
                        "bot cycle failed"
                    );
                    return Err(cycle_error);
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        event_name = "bot.loop.shutdown_requested",
                        correlation_id = "shutdown",
                        cycles,
                        "stopping bot loop"
                    );
                    return Ok(cycles);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use goodhuman_core::domain::comment::CommentId;
    use goodhuman_core::domain::dedup::DedupKind;
    use goodhuman_core::messages::WelcomeMessages;
    use goodhuman_core::signature::Signature;
    use goodhuman_db::{DedupRepository, InMemoryDedupRepository};
    use goodhuman_reddit::{RedditError, SubredditCommentFeed};

    use super::{BotContext, RunLoop};
    use crate::dedup::DedupStore;
    use crate::stream::StreamProcessor;
    use crate::testing::{comment, inbox_reply, ScriptedReddit};
    use crate::watcher::ReplyWatcher;

    const SIGNED: &str = "^^I'm a human volunteer content transcriber for Reddit";

    fn context(api: Arc<ScriptedReddit>, repository: Arc<InMemoryDedupRepository>) -> BotContext {
        let messages = WelcomeMessages::new(vec!["You're welcome!".to_owned()]).expect("messages");
        BotContext::new(
            api.clone(),
            Box::new(SubredditCommentFeed::new(api, "all")),
            DedupStore::with_repository(repository),
            StreamProcessor::new(Signature::default(), &[], "you_are_good_human"),
            ReplyWatcher::new(messages),
        )
    }

    #[tokio::test]
    async fn cycle_answers_the_inbox_and_the_stream() {
        let api = Arc::new(ScriptedReddit::default());
        let repository = Arc::new(InMemoryDedupRepository::default());
        api.set_inbox(vec![inbox_reply("r1", "human_bob", "thank you!", true)]).await;
        api.post_comments([comment("c1", "human_bob", "pics", SIGNED)]).await;
        let mut context = context(api.clone(), repository.clone());

        let summary = context.run_cycle("cycle-1").await.expect("cycle");

        assert_eq!(summary.inbox.thanked, 1);
        assert_eq!(summary.stream.replied, 1);
        assert_eq!(api.replies().await.len(), 2);
        assert_eq!(repository.count(DedupKind::Replied).await.expect("count"), 1);
        assert_eq!(repository.count(DedupKind::Thanked).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn backlog_beyond_one_listing_page_is_answered() {
        let api = Arc::new(ScriptedReddit::default());
        let repository = Arc::new(InMemoryDedupRepository::default());
        api.post_comments([comment("c0", "someone", "pics", "first!")]).await;
        let mut context = context(api.clone(), repository.clone());
        context.run_cycle("cycle-1").await.expect("first cycle");

        api.post_comments((0..150).map(|index| {
            let body = if index == 10 { SIGNED } else { "just chatting" };
            comment(&format!("n{index}"), "human_bob", "pics", body)
        }))
        .await;
        let summary = context.run_cycle("cycle-2").await.expect("second cycle");

        assert_eq!(summary.stream.scanned, 150);
        assert_eq!(summary.stream.replied, 1);
        assert_eq!(api.replies().await[0].0, CommentId::new("n10"));
        assert_eq!(repository.count(DedupKind::Replied).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn comments_after_a_failed_reply_are_answered_next_cycle() {
        let api = Arc::new(ScriptedReddit::default());
        let repository = Arc::new(InMemoryDedupRepository::default());
        api.post_comments([
            comment("b1", "human_bob", "pics", SIGNED),
            comment("b2", "human_eve", "pics", SIGNED),
        ])
        .await;
        api.push_reply_failure(RedditError::Request("connection reset".to_owned())).await;
        let mut context = context(api.clone(), repository.clone());

        let error = context.run_cycle("cycle-1").await.expect_err("reply fails");
        assert!(error.is_transient());

        let summary = context.run_cycle("cycle-2").await.expect("retry cycle");

        assert_eq!(summary.stream.replied, 2);
        let replied: Vec<CommentId> = api.replies().await.into_iter().map(|(id, _)| id).collect();
        assert_eq!(replied, vec![CommentId::new("b1"), CommentId::new("b2")]);
        assert_eq!(repository.count(DedupKind::Replied).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn listing_failure_still_answers_the_inbox() {
        let api = Arc::new(ScriptedReddit::default());
        api.set_inbox(vec![inbox_reply("r1", "human_bob", "thanks!", true)]).await;
        api.push_listing_failure(RedditError::Status { status: 503, body: String::new() }).await;
        let mut context = context(api.clone(), Arc::new(InMemoryDedupRepository::default()));

        let error = context.run_cycle("cycle-1").await.expect_err("listing fails");

        assert!(error.is_transient());
        assert_eq!(api.marked_read().await, vec![CommentId::new("r1")]);
        assert_eq!(api.replies().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_until_shutdown() {
        let api = Arc::new(ScriptedReddit::default());
        api.push_inbox_failure(RedditError::Status { status: 503, body: String::new() }).await;
        api.push_inbox_failure(RedditError::Request("connection reset".to_owned())).await;
        let mut context = context(api, Arc::new(InMemoryDedupRepository::default()));

        let cycles = RunLoop::new(Duration::from_secs(30))
            .run(&mut context, tokio::time::sleep(Duration::from_secs(65)))
            .await
            .expect("transient failures never stop the loop");

        assert_eq!(cycles, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failures_stop_the_loop() {
        let api = Arc::new(ScriptedReddit::default());
        api.push_inbox_failure(RedditError::Status { status: 403, body: "forbidden".to_owned() })
            .await;
        let mut context = context(api, Arc::new(InMemoryDedupRepository::default()));

        let error = RunLoop::new(Duration::from_secs(30))
            .run(&mut context, std::future::pending::<()>())
            .await
            .expect_err("403 is fatal");

        assert!(!error.is_transient());
        assert!(error.to_string().contains("403"));
    }
}
