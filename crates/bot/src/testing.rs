//! In-process stand-ins for Reddit, used to drive the bot without a network.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use goodhuman_core::domain::comment::{Comment, CommentId, InboxReply};
use goodhuman_reddit::{CommentFeed, CommentPage, RedditApi, RedditError};

#[derive(Default)]
struct ScriptedState {
    /// Comments in arrival order.
    listing: Vec<Comment>,
    listing_failures: VecDeque<RedditError>,
    inbox: Vec<InboxReply>,
    inbox_failures: VecDeque<RedditError>,
    reply_failures: VecDeque<RedditError>,
    replies: Vec<(CommentId, String)>,
    marked_read: Vec<CommentId>,
}

/// Scripted Reddit account.
///
/// The comment listing and the inbox are standing views. The listing pages
/// newest first with an `after` cursor; `mark_read` clears the unread flag on
/// every matching inbox entry. Queued failures are returned before any
/// successful call of the same kind.
#[derive(Default)]
pub struct ScriptedReddit {
    state: Mutex<ScriptedState>,
}

impl ScriptedReddit {
    /// Appends comments to the listing; the last one is the newest.
    pub async fn post_comments(&self, comments: impl IntoIterator<Item = Comment>) {
        self.state.lock().await.listing.extend(comments);
    }

    pub async fn push_listing_failure(&self, error: RedditError) {
        self.state.lock().await.listing_failures.push_back(error);
    }

    pub async fn set_inbox(&self, replies: Vec<InboxReply>) {
        self.state.lock().await.inbox = replies;
    }

    pub async fn push_inbox_failure(&self, error: RedditError) {
        self.state.lock().await.inbox_failures.push_back(error);
    }

    pub async fn push_reply_failure(&self, error: RedditError) {
        self.state.lock().await.reply_failures.push_back(error);
    }

    pub async fn replies(&self) -> Vec<(CommentId, String)> {
        self.state.lock().await.replies.clone()
    }

    pub async fn marked_read(&self) -> Vec<CommentId> {
        self.state.lock().await.marked_read.clone()
    }
}

#[async_trait]
impl RedditApi for ScriptedReddit {
    async fn new_comments(
        &self,
        _subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CommentPage, RedditError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.listing_failures.pop_front() {
            return Err(error);
        }

        let newest_first: Vec<&Comment> = state.listing.iter().rev().collect();
        let start = after
            .and_then(|after| {
                newest_first.iter().position(|comment| comment.id.fullname() == after)
            })
            .map_or(0, |position| position + 1);
        let comments: Vec<Comment> = newest_first
            .iter()
            .skip(start)
            .take(limit as usize)
            .map(|comment| (*comment).clone())
            .collect();
        let after = match comments.last() {
            Some(last) if start + comments.len() < newest_first.len() => Some(last.id.fullname()),
            _ => None,
        };
        Ok(CommentPage { comments, after })
    }

    async fn comment_replies(&self, limit: u32) -> Result<Vec<InboxReply>, RedditError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.inbox_failures.pop_front() {
            return Err(error);
        }
        Ok(state.inbox.iter().take(limit as usize).cloned().collect())
    }

    async fn reply(&self, parent: &CommentId, text: &str) -> Result<(), RedditError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.reply_failures.pop_front() {
            return Err(error);
        }
        state.replies.push((parent.clone(), text.to_owned()));
        Ok(())
    }

    async fn mark_read(&self, id: &CommentId) -> Result<(), RedditError> {
        let mut state = self.state.lock().await;
        for reply in state.inbox.iter_mut().filter(|reply| &reply.id == id) {
            reply.is_new = false;
        }
        state.marked_read.push(id.clone());
        Ok(())
    }
}

/// Feed that replays fixed batches verbatim, then reports nothing new.
/// Commits are recorded rather than acted on.
#[derive(Default)]
pub struct ScriptedFeed {
    batches: VecDeque<Vec<Comment>>,
    committed: Vec<CommentId>,
}

impl ScriptedFeed {
    pub fn new(batches: impl IntoIterator<Item = Vec<Comment>>) -> Self {
        Self { batches: batches.into_iter().collect(), committed: Vec::new() }
    }

    pub fn committed(&self) -> &[CommentId] {
        &self.committed
    }
}

#[async_trait]
impl CommentFeed for ScriptedFeed {
    async fn next_batch(&mut self) -> Result<Vec<Comment>, RedditError> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn commit(&mut self, id: &CommentId) {
        self.committed.push(id.clone());
    }
}

pub fn comment(id: &str, author: &str, subreddit: &str, body: &str) -> Comment {
    Comment {
        id: CommentId::new(id),
        body: body.to_owned(),
        author: Some(author.to_owned()),
        subreddit: subreddit.to_owned(),
    }
}

pub fn inbox_reply(id: &str, author: &str, body: &str, is_new: bool) -> InboxReply {
    InboxReply {
        id: CommentId::new(id),
        body: body.to_owned(),
        author: Some(author.to_owned()),
        subreddit: "TranscribersOfReddit".to_owned(),
        is_new,
    }
}
