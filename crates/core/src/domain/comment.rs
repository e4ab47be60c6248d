use std::fmt;

use serde::{Deserialize, Serialize};

/// Author name recorded for comments whose account no longer exists.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Base-36 Reddit id of a comment, without the `t1_` kind prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fullname used by the Reddit API when addressing a comment.
    pub fn fullname(&self) -> String {
        format!("t1_{}", self.0)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub author: Option<String>,
    pub subreddit: String,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or(DELETED_AUTHOR)
    }

    pub fn is_authored_by(&self, username: &str) -> bool {
        self.author.as_deref().is_some_and(|author| author.eq_ignore_ascii_case(username))
    }
}

/// A reply to one of the bot's own comments, as delivered by the inbox.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxReply {
    pub id: CommentId,
    pub body: String,
    pub author: Option<String>,
    pub subreddit: String,
    pub is_new: bool,
}

impl InboxReply {
    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or(DELETED_AUTHOR)
    }
}
