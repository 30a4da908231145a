//! # Tokenizer
//!
//! Text is lowercased; then every maximal run of characters outside
//! ``[a-z0-9]`` is treated as a single separator. Empty fragments are
//! discarded; so an empty (or all-punctuation) text yields no tokens.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::Token;

/// The pattern for a single token, applied to lowercased text.
pub const TOKEN_PATTERN: &str = r"[a-z0-9]+";

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("regex pattern compilation failed"));

/// Text to [`Token`] splitter.
#[derive(Debug, Clone)]
pub struct TextTokenizer {
    regex: Regex,
}

impl Default for TextTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTokenizer {
    /// Create a new tokenizer.
    pub fn new() -> Self {
        Self {
            regex: TOKEN_REGEX.clone(),
        }
    }

    /// Tokenize `text` into an ordered token sequence.
    ///
    /// ## Arguments
    /// * `text` - raw text; may be empty.
    ///
    /// ## Returns
    /// The tokens, in text order; may be empty.
    pub fn tokenize(
        &self,
        text: &str,
    ) -> Vec<Token> {
        let lowered = text.to_lowercase();
        self.regex
            .find_iter(&lowered)
            .map(|m| Token::from_valid(m.as_str()))
            .collect()
    }

    /// Lazily tokenize already-lowercased text.
    ///
    /// Input characters outside ``[a-z0-9]`` (including uppercase)
    /// are treated as separators.
    pub fn tokenize_iter<'a>(
        &'a self,
        lowered: &'a str,
    ) -> impl Iterator<Item = Token> + 'a {
        self.regex
            .find_iter(lowered)
            .map(|m| Token::from_valid(m.as_str()))
    }
}

/// Tokenize `text` with the default [`TextTokenizer`].
pub fn tokenize(text: &str) -> Vec<Token> {
    TextTokenizer::new().tokenize(text)
}
