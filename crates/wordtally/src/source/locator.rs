use core::{fmt, str::FromStr};
use std::path::PathBuf;

/// Where to read source text from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocator {
    /// An ``http://`` or ``https://`` URL.
    Url(String),

    /// A local file.
    Path(PathBuf),

    /// Standard input; spelled ``-``.
    Stdin,
}

impl SourceLocator {
    /// Is this a remote source?
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceLocator::Url(_))
    }
}

/// The locator string was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("empty source locator")]
pub struct EmptyLocator;

impl FromStr for SourceLocator {
    type Err = EmptyLocator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyLocator);
        }
        if s == "-" {
            return Ok(SourceLocator::Stdin);
        }

        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(SourceLocator::Url(s.to_string()))
        } else {
            Ok(SourceLocator::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SourceLocator::Url(url) => write!(f, "{url}"),
            SourceLocator::Path(path) => write!(f, "{}", path.display()),
            SourceLocator::Stdin => write!(f, "<stdin>"),
        }
    }
}
