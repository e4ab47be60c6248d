use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use goodhuman_core::domain::comment::{Comment, CommentId};

use crate::client::RedditApi;
use crate::error::RedditError;

/// Largest page Reddit serves for a listing.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Reddit stops paging a listing after this many items.
pub const MAX_LISTING_DEPTH: usize = 1000;
/// Committed ids remembered by a feed; three pages are enough to bridge deleted comments.
pub const DELIVERED_WINDOW: usize = 301;

/// Cursor over a live comment stream.
///
/// Each batch holds the comments that arrived after the last committed one,
/// in arrival order (oldest first). An empty batch means nothing new arrived.
/// Comments that are never committed are handed out again by the next batch.
#[async_trait]
pub trait CommentFeed: Send {
    async fn next_batch(&mut self) -> Result<Vec<Comment>, RedditError>;

    /// Marks `id` and everything older in the last batch as handled.
    fn commit(&mut self, id: &CommentId);
}

/// Insertion-ordered set that forgets its oldest entries beyond `capacity`.
#[derive(Debug)]
pub struct BoundedIdSet {
    capacity: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl BoundedIdSet {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), order: VecDeque::new(), members: HashSet::new() }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        self.order.push_back(id.to_owned());
        self.members.insert(id.to_owned());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Follows `/r/{subreddit}/comments`.
///
/// Before anything is committed a batch is the newest page only. After that
/// the feed pages back until it meets a committed comment, up to
/// `MAX_LISTING_DEPTH` comments.
pub struct SubredditCommentFeed {
    api: Arc<dyn RedditApi>,
    subreddit: String,
    page_size: u32,
    delivered: BoundedIdSet,
    /// Ids of the last batch not yet committed, oldest first.
    pending: VecDeque<CommentId>,
}

impl SubredditCommentFeed {
    pub fn new(api: Arc<dyn RedditApi>, subreddit: impl Into<String>) -> Self {
        Self {
            api,
            subreddit: subreddit.into(),
            page_size: MAX_PAGE_SIZE,
            delivered: BoundedIdSet::new(DELIVERED_WINDOW),
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl CommentFeed for SubredditCommentFeed {
    async fn next_batch(&mut self) -> Result<Vec<Comment>, RedditError> {
        let catching_up = !self.delivered.is_empty();
        let mut newest_first: Vec<Comment> = Vec::new();
        let mut collected: HashSet<CommentId> = HashSet::new();
        let mut after: Option<String> = None;
        let mut pages = 0;
        let mut reached_boundary = false;

        loop {
            let page =
                self.api.new_comments(&self.subreddit, self.page_size, after.as_deref()).await?;
            pages += 1;

            for comment in page.comments {
                if self.delivered.contains(comment.id.as_str()) {
                    reached_boundary = true;
                    break;
                }
                if newest_first.len() < MAX_LISTING_DEPTH && collected.insert(comment.id.clone())
                {
                    newest_first.push(comment);
                }
            }

            if reached_boundary || !catching_up || newest_first.len() >= MAX_LISTING_DEPTH {
                break;
            }
            match page.after {
                Some(next) => after = Some(next),
                None => break,
            }
        }

        if catching_up && !reached_boundary {
            warn!(
                event_name = "reddit.feed.gap",
                subreddit = %self.subreddit,
                pages,
                fetched = newest_first.len(),
                "last committed comment not found in the listing; older comments were missed"
            );
        }

        newest_first.reverse();
        self.pending = newest_first.iter().map(|comment| comment.id.clone()).collect();

        debug!(
            event_name = "reddit.feed.batch",
            subreddit = %self.subreddit,
            pages,
            delivered = newest_first.len(),
            "fetched comment batch"
        );
        Ok(newest_first)
    }

    fn commit(&mut self, id: &CommentId) {
        let Some(position) = self.pending.iter().position(|pending| pending == id) else {
            return;
        };
        for committed in self.pending.drain(..=position) {
            self.delivered.insert(committed.as_str());
        }
    }
}
