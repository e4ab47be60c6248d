//! The good-human bot thanks volunteer transcribers on Reddit and answers the
//! "thank you" replies it gets back, never acting on the same comment twice.
//!
//! ```text
//! RunLoop ─┬─ ReplyWatcher ── inbox ──┐
//!          └─ StreamProcessor ─ feed ─┴─ DedupStore (caches + SQLite)
//! ```

pub mod bootstrap;
pub mod dedup;
pub mod error;
pub mod runner;
pub mod stream;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod watcher;

pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use dedup::DedupStore;
pub use error::CycleError;
pub use runner::{BotContext, RunLoop};
pub use stream::StreamProcessor;
pub use watcher::ReplyWatcher;
