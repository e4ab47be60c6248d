pub mod config;
pub mod domain;
pub mod messages;
pub mod signature;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::comment::{Comment, CommentId, InboxReply};
pub use domain::dedup::{DedupKind, DedupRecord};
pub use messages::{WelcomeMessages, ACKNOWLEDGEMENT};
pub use signature::Signature;
