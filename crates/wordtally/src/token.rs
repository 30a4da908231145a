//! # Tokens

use core::{borrow::Borrow, fmt, ops::Deref};

use compact_str::CompactString;

/// A normalized word.
///
/// Invariant: non-empty; and only contains the ASCII characters ``[a-z0-9]``.
///
/// Ordering is byte-lexicographic; which, given the invariant,
/// is the same as lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(CompactString);

impl Token {
    /// Is `c` a valid token character?
    pub fn is_token_byte(c: u8) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit()
    }

    /// Build a token, checking the invariant.
    ///
    /// ## Returns
    /// `None` if `word` is empty or contains characters outside ``[a-z0-9]``.
    pub fn try_new(word: &str) -> Option<Self> {
        if !word.is_empty() && word.bytes().all(Self::is_token_byte) {
            Some(Self(CompactString::new(word)))
        } else {
            None
        }
    }

    /// Build a token from a fragment already known to satisfy the invariant.
    pub(crate) fn from_valid(word: &str) -> Self {
        debug_assert!(Self::try_new(word).is_some(), "invalid token: {word:?}");
        Self(CompactString::new(word))
    }

    /// View the token as a `&str`.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The length of the token, in bytes (== chars).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Token {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// `CompactString` hashes as `str`; so this is consistent with `Hash`/`Eq`.
impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Token {
    type Error = InvalidToken;

    fn try_from(word: &str) -> Result<Self, Self::Error> {
        Self::try_new(word).ok_or_else(|| InvalidToken(word.to_string()))
    }
}

/// A string which does not satisfy the [`Token`] invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token: {0:?}")]
pub struct InvalidToken(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WTHashMap;

    #[test]
    fn test_try_new() {
        assert_eq!(Token::try_new("cat").unwrap().as_str(), "cat");
        assert_eq!(Token::try_new("r2d2").unwrap().as_str(), "r2d2");
        assert_eq!(Token::try_new("1342").unwrap().len(), 4);

        assert!(Token::try_new("").is_none());
        assert!(Token::try_new("Cat").is_none());
        assert!(Token::try_new("don't").is_none());
        assert!(Token::try_new("two words").is_none());
        assert!(Token::try_new("café").is_none());
    }

    #[test]
    fn test_try_from() {
        assert!(Token::try_from("the").is_ok());
        assert_eq!(
            Token::try_from("The").unwrap_err(),
            InvalidToken("The".to_string())
        );
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut tokens: Vec<Token> = ["the", "cat", "ran", "a", "10", "9"]
            .iter()
            .map(|w| Token::try_new(w).unwrap())
            .collect();
        tokens.sort();

        let words: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(words, vec!["10", "9", "a", "cat", "ran", "the"]);
    }

    #[test]
    fn test_borrow_lookup() {
        let mut map: WTHashMap<Token, u64> = Default::default();
        map.insert(Token::try_new("cat").unwrap(), 3);

        assert_eq!(map.get("cat"), Some(&3));
        assert_eq!(map.get("dog"), None);
    }
}
