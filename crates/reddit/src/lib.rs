//! Reddit integration - the platform side of the bot
//!
//! This crate provides everything the bot needs from Reddit:
//! - **API** (`client`) - `RedditApi` trait and the OAuth-backed `HttpRedditClient`
//! - **Feed** (`feed`) - cursor over a subreddit's newest comments
//! - **Model** (`model`) - listing payloads and their conversion to domain types
//! - **Errors** (`error`) - `RedditError`, split into transient and fatal failures
//!
//! # Getting Started
//!
//! 1. Create a "script" app at https://www.reddit.com/prefs/apps
//! 2. Set env vars: `GOODHUMAN_REDDIT_CLIENT_ID`, `GOODHUMAN_REDDIT_CLIENT_SECRET`,
//!    `GOODHUMAN_REDDIT_USERNAME`, `GOODHUMAN_REDDIT_PASSWORD`
//!
//! # Architecture
//!
//! ```text
//! /r/{sub}/comments → SubredditCommentFeed → stream processor
//! /message/comments → RedditApi::comment_replies → reply watcher
//!                          ↓
//!          RedditApi::reply / RedditApi::mark_read
//! ```

pub mod client;
pub mod error;
pub mod feed;
pub mod model;

pub use client::{HttpRedditClient, RedditApi};
pub use error::RedditError;
pub use feed::{CommentFeed, SubredditCommentFeed};
pub use model::CommentPage;
