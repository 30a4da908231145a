use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use crate::{errors::FetchError, source::SourceLocator};

/// A provider of source text.
pub trait TextSource {
    /// Fetch the full text named by `locator`.
    fn fetch(
        &mut self,
        locator: &SourceLocator,
    ) -> Result<String, FetchError>;
}

/// Options for [`DefaultTextSource`].
#[derive(Clone, Default, Debug)]
pub struct SourceOptions {
    /// Disk cache options for URL sources.
    #[cfg(feature = "download")]
    pub cache: crate::cache::TextCacheOptions,

    /// Refuse to download; URL sources must already be cached.
    pub offline: bool,
}

impl SourceOptions {
    /// Set the cache options.
    #[cfg(feature = "download")]
    pub fn with_cache(
        mut self,
        cache: crate::cache::TextCacheOptions,
    ) -> Self {
        self.cache = cache;
        self
    }

    /// Set offline mode.
    pub fn with_offline(
        mut self,
        offline: bool,
    ) -> Self {
        self.offline = offline;
        self
    }
}

/// Decode fetched bytes as UTF-8.
///
/// Invalid sequences become U+FFFD, which the tokenizer treats as a separator.
fn decode(
    bytes: Vec<u8>,
    locator: &SourceLocator,
) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "{locator} is not valid utf-8 (invalid byte at offset {}); decoding lossily",
                e.utf8_error().valid_up_to()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

fn io_error(
    source: io::Error,
    locator: &SourceLocator,
) -> FetchError {
    match source.kind() {
        io::ErrorKind::NotFound => FetchError::NotFound {
            locator: locator.to_string(),
        },
        io::ErrorKind::TimedOut => FetchError::Timeout {
            locator: locator.to_string(),
        },
        _ => FetchError::Io {
            locator: locator.to_string(),
            source,
        },
    }
}

#[cfg(feature = "download")]
fn cache_error(
    err: crate::cache::CacheError,
    locator: &SourceLocator,
) -> FetchError {
    use crate::cache::CacheError;

    match err {
        CacheError::NotCached(path) => FetchError::NotCached {
            locator: locator.to_string(),
            path,
        },
        CacheError::InvalidUrl(url) => FetchError::Unsupported {
            locator: locator.to_string(),
            reason: format!("cannot cache {url}"),
        },
        CacheError::NotFound { .. } => FetchError::NotFound {
            locator: locator.to_string(),
        },
        CacheError::Timeout { .. } => FetchError::Timeout {
            locator: locator.to_string(),
        },
        CacheError::Download { message, .. } => FetchError::Network {
            locator: locator.to_string(),
            message,
        },
        CacheError::Io(source) => io_error(source, locator),
    }
}

/// Read all of `reader` as text.
///
/// Bytes which are not valid UTF-8 are replaced, never rejected.
pub fn read_text<R: Read>(
    mut reader: R,
    locator: &SourceLocator,
) -> Result<String, FetchError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| io_error(e, locator))?;
    Ok(decode(buf, locator))
}

fn read_path(
    path: &Path,
    locator: &SourceLocator,
) -> Result<String, FetchError> {
    let bytes = fs::read(path).map_err(|e| io_error(e, locator))?;
    Ok(decode(bytes, locator))
}

/// The standard [`TextSource`].
///
/// * Paths are read from disk.
/// * ``-`` reads standard input.
/// * URLs go through the [`TextCache`](crate::cache::TextCache) when the
///   ``download`` feature is enabled; the cache is opened on first use.
pub struct DefaultTextSource {
    options: SourceOptions,

    #[cfg(feature = "download")]
    cache: Option<crate::cache::TextCache>,
}

impl Default for DefaultTextSource {
    fn default() -> Self {
        Self::new(SourceOptions::default())
    }
}

impl DefaultTextSource {
    /// Create a new source.
    pub fn new(options: SourceOptions) -> Self {
        Self {
            options,
            #[cfg(feature = "download")]
            cache: None,
        }
    }

    /// Get the options.
    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    #[cfg(feature = "download")]
    fn fetch_url(
        &mut self,
        url: &str,
        locator: &SourceLocator,
    ) -> Result<String, FetchError> {
        use crate::cache::TextCache;

        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => {
                let cache = TextCache::new(self.options.cache.clone()).map_err(|e| {
                    FetchError::Unsupported {
                        locator: locator.to_string(),
                        reason: format!("{e:#}"),
                    }
                })?;
                log::debug!("text cache: {}", cache.cache_dir().display());
                cache
            }
        };
        let cache = self.cache.insert(cache);

        let path = cache
            .load_cached_path(url, !self.options.offline)
            .map_err(|e| cache_error(e, locator))?;

        read_path(&path, locator)
    }

    #[cfg(not(feature = "download"))]
    fn fetch_url(
        &mut self,
        _url: &str,
        locator: &SourceLocator,
    ) -> Result<String, FetchError> {
        Err(FetchError::Unsupported {
            locator: locator.to_string(),
            reason: "built without the \"download\" feature".to_string(),
        })
    }
}

impl TextSource for DefaultTextSource {
    fn fetch(
        &mut self,
        locator: &SourceLocator,
    ) -> Result<String, FetchError> {
        let text = match locator {
            SourceLocator::Url(url) => self.fetch_url(url, locator),
            SourceLocator::Path(path) => read_path(path, locator),
            SourceLocator::Stdin => read_text(io::stdin().lock(), locator),
        }?;
        log::info!("fetched {} bytes from {locator}", text.len());
        Ok(text)
    }
}
