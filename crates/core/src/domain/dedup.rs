use serde::{Deserialize, Serialize};

use crate::domain::comment::{Comment, CommentId, InboxReply};

/// Namespace of a dedup record. The two kinds never share entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKind {
    Replied,
    Thanked,
}

impl DedupKind {
    pub const ALL: [DedupKind; 2] = [DedupKind::Replied, DedupKind::Thanked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replied => "replied",
            Self::Thanked => "thanked",
        }
    }

    /// Table holding records of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Replied => "repliedcomments",
            Self::Thanked => "thankedcomments",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRecord {
    pub comment_id: CommentId,
    pub author: String,
    pub subreddit: String,
    pub kind: DedupKind,
}

impl DedupRecord {
    pub fn for_comment(comment: &Comment, kind: DedupKind) -> Self {
        Self {
            comment_id: comment.id.clone(),
            author: comment.author_name().to_string(),
            subreddit: comment.subreddit.clone(),
            kind,
        }
    }

    pub fn for_reply(reply: &InboxReply, kind: DedupKind) -> Self {
        Self {
            comment_id: reply.id.clone(),
            author: reply.author_name().to_string(),
            subreddit: reply.subreddit.clone(),
            kind,
        }
    }
}
