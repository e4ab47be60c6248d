use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

pub const ACKNOWLEDGEMENT: &str = "good human\n\n---\n\n^(I am a bot and I thank these amazing humans who are transcribing for the community)";

#[derive(Debug, Error)]
pub enum MessagesError {
    #[error("could not read welcome messages `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse welcome messages `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("welcome message list is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct WelcomeMessagesFile {
    messages: Vec<String>,
}

/// Non-empty pool of replies sent to people who thank the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WelcomeMessages {
    messages: Vec<String>,
}

impl WelcomeMessages {
    pub fn new(messages: Vec<String>) -> Result<Self, MessagesError> {
        let messages: Vec<String> =
            messages.into_iter().filter(|message| !message.trim().is_empty()).collect();
        if messages.is_empty() {
            return Err(MessagesError::Empty);
        }
        Ok(Self { messages })
    }

    /// Reads a `{"messages": [...]}` document.
    pub fn from_json_file(path: &Path) -> Result<Self, MessagesError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| MessagesError::Read { path: path.to_path_buf(), source })?;
        let file: WelcomeMessagesFile = serde_json::from_str(&raw)
            .map_err(|source| MessagesError::Parse { path: path.to_path_buf(), source })?;
        Self::new(file.messages)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.messages
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // non-empty by construction
        self.messages.choose(rng).map(String::as_str).unwrap_or(ACKNOWLEDGEMENT)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    use super::{MessagesError, WelcomeMessages};

    #[test]
    fn rejects_empty_or_blank_lists() {
        assert!(matches!(WelcomeMessages::new(vec![]), Err(MessagesError::Empty)));
        assert!(matches!(
            WelcomeMessages::new(vec!["  ".to_string()]),
            Err(MessagesError::Empty)
        ));
    }

    #[test]
    fn loads_messages_document() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("welcome_messages.json");
        fs::write(&path, r#"{"messages": ["You're welcome!", "Anytime, human."]}"#)
            .expect("write messages");

        let messages = WelcomeMessages::from_json_file(&path).expect("load messages");
        assert_eq!(messages.as_slice().len(), 2);
    }

    #[test]
    fn malformed_document_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("welcome_messages.json");
        fs::write(&path, r#"["not", "an", "object"]"#).expect("write messages");

        let error = WelcomeMessages::from_json_file(&path).expect_err("should fail");
        assert!(error.to_string().contains("welcome_messages.json"));
    }

    #[test]
    fn choice_is_always_from_the_pool() {
        let messages = WelcomeMessages::new(vec![
            "You're welcome!".to_string(),
            "Anytime, human.".to_string(),
            "Keep transcribing!".to_string(),
        ])
        .expect("messages");
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let chosen = messages.choose(&mut rng);
            assert!(messages.as_slice().iter().any(|message| message == chosen));
        }
    }
}
