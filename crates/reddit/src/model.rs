use serde::Deserialize;

use goodhuman_core::domain::comment::{Comment, CommentId, InboxReply, DELETED_AUTHOR};

use crate::error::RedditError;

const COMMENT_KIND: &str = "t1";

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub new: bool,
}

impl CommentData {
    fn author(&self) -> Option<String> {
        self.author.clone().filter(|author| author != DELETED_AUTHOR && !author.is_empty())
    }

    pub fn into_comment(self) -> Comment {
        Comment {
            author: self.author(),
            id: CommentId(self.id),
            body: self.body,
            subreddit: self.subreddit.unwrap_or_default(),
        }
    }

    pub fn into_inbox_reply(self) -> InboxReply {
        InboxReply {
            author: self.author(),
            id: CommentId(self.id),
            body: self.body,
            subreddit: self.subreddit.unwrap_or_default(),
            is_new: self.new,
        }
    }
}

/// One page of a comment listing, newest first. `after` is the fullname to
/// pass back for the next, older page; `None` on the last page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub after: Option<String>,
}

impl Listing<CommentData> {
    /// Comment children in listing order; other kinds (private messages, posts) are dropped.
    pub fn into_comments(self) -> impl Iterator<Item = CommentData> {
        self.data
            .children
            .into_iter()
            .filter(|thing| thing.kind == COMMENT_KIND)
            .map(|thing| thing.data)
    }

    pub fn into_comment_page(self) -> CommentPage {
        let after = self.data.after.clone().filter(|after| !after.is_empty());
        let comments = self.into_comments().map(CommentData::into_comment).collect();
        CommentPage { comments, after }
    }
}

/// Envelope returned by `api_type=json` write endpoints.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub json: WriteResult,
}

#[derive(Debug, Deserialize)]
pub struct WriteResult {
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
}

impl WriteResponse {
    /// Reddit reports write failures as `[[code, message, field], ...]` in a 200 body.
    pub fn into_result(self) -> Result<(), RedditError> {
        let Some(first) = self.json.errors.into_iter().next() else {
            return Ok(());
        };
        let text = |index: usize| {
            first.get(index).and_then(serde_json::Value::as_str).unwrap_or_default().to_owned()
        };
        Err(RedditError::Api { code: text(0), message: text(1) })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}
