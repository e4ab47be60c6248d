//! Detection of the transcription-volunteer signature and of "thank you" replies.
//!
//! Matching is loose: each token of the reference phrase only has
//! to appear somewhere in the body, in any order. Volunteers paste the footer
//! inside longer sentences and sometimes reorder or reformat it.

pub const DEFAULT_SIGNATURE: &str = "human volunteer content transcriber for Reddit";

const THANKS_MARKER: &str = "thank";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    tokens: Vec<String>,
}

impl Default for Signature {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE)
    }
}

impl Signature {
    pub fn new(phrase: &str) -> Self {
        let tokens = phrase.to_lowercase().split_whitespace().map(str::to_owned).collect();
        Self { tokens }
    }

    /// Every token must occur as a substring of the lower-cased body.
    pub fn matches(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.tokens.iter().all(|token| body.contains(token.as_str()))
    }
}

pub fn is_thanks(body: &str) -> bool {
    body.to_lowercase().contains(THANKS_MARKER)
}
