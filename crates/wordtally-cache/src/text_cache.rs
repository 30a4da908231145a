//! # Text Cache

use std::{
    error::Error,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use reqwest::{StatusCode, blocking::Client};

use crate::{WORDTALLY_CACHE_CONFIG, cache_key};

/// Default per-request download timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Suffix of in-progress downloads; renamed into place on success.
const PARTIAL_SUFFIX: &str = "~partial";

/// Errors from [`TextCache::load_cached_path`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The URL could not be mapped to a cache path.
    #[error("unsupported url: {0}")]
    InvalidUrl(String),

    /// The file is not cached, and downloading was not allowed.
    #[error("cached file not found: {}", .0.display())]
    NotCached(PathBuf),

    /// The server reported that the resource does not exist.
    #[error("{url} not found (HTTP {status})")]
    NotFound {
        /// The requested URL.
        url: String,

        /// The HTTP status code.
        status: u16,
    },

    /// The request, or the server behind a gateway, timed out.
    #[error("download of {url} timed out")]
    Timeout {
        /// The requested URL.
        url: String,
    },

    /// Any other download failure.
    #[error("download of {url} failed: {message}")]
    Download {
        /// The requested URL.
        url: String,

        /// A description of the failure.
        message: String,
    },

    /// Local filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CacheError {
    /// Classify a non-success HTTP status.
    ///
    /// * ``404``, ``410`` are [`CacheError::NotFound`].
    /// * ``408``, ``504`` are [`CacheError::Timeout`].
    /// * Everything else is [`CacheError::Download`].
    pub fn from_status<U: ToString>(
        url: U,
        status: StatusCode,
    ) -> Self {
        let url = url.to_string();
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => Self::NotFound {
                url,
                status: status.as_u16(),
            },
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::Timeout { url },
            _ => Self::Download {
                url,
                message: format!("HTTP status {status}"),
            },
        }
    }

    /// Classify a transport error from the http client.
    pub fn from_request<U: ToString>(
        url: U,
        err: reqwest::Error,
    ) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::from_status(url, status);
        }

        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Download {
            url: url.to_string(),
            message,
        }
    }

    /// Is this a download timeout?
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Did the server report the resource missing?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Options for [`TextCache`].
#[derive(Clone, Default, Debug)]
pub struct TextCacheOptions {
    /// Optional path to the cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Optional per-request download timeout.
    ///
    /// Defaults to [`DEFAULT_DOWNLOAD_TIMEOUT`].
    pub timeout: Option<Duration>,

    /// Optional [`Client`] builder; overrides `timeout`.
    pub client: Option<fn() -> Client>,
}

impl TextCacheOptions {
    /// Set the cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(
        mut self,
        cache_dir: Option<P>,
    ) -> Self {
        self.cache_dir = cache_dir.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Set the download timeout.
    pub fn with_timeout(
        mut self,
        timeout: Option<Duration>,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the http client builder.
    pub fn with_client(
        mut self,
        client: Option<fn() -> Client>,
    ) -> Self {
        self.client = client;
        self
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Disk cache for downloaded texts.
///
/// Leverages a blocking [`Client`] for downloading files,
/// and [`PathResolver`](`crate::path_resolver::PathResolver`) for resolving
/// the cache path appropriate for a user/system combo, and any environment overrides.
pub struct TextCache {
    /// Cache directory.
    cache_dir: PathBuf,

    /// Connection pool for downloading files.
    client: Client,
}

impl TextCache {
    /// Construct a new [`TextCache`].
    pub fn new(options: TextCacheOptions) -> anyhow::Result<Self> {
        let cache_dir = WORDTALLY_CACHE_CONFIG
            .resolve_cache_dir(options.cache_dir)
            .context("failed to resolve cache directory")?;

        let client = match options.client {
            Some(builder) => builder(),
            None => Client::builder()
                .timeout(options.timeout.unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT))
                .build()
                .context("failed to build http client")?,
        };

        Ok(Self { cache_dir, client })
    }

    /// Get the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the cache path for the given key.
    ///
    /// * Does not check that the path exists.
    /// * Does not initialize the containing directories.
    pub fn cache_path<C, F>(
        &self,
        context: &[C],
        file: F,
    ) -> PathBuf
    where
        C: AsRef<Path>,
        F: AsRef<Path>,
    {
        cache_key::extend_path(&self.cache_dir, context, file)
    }

    /// Get the cache path for a URL.
    pub fn url_path(
        &self,
        url: &str,
    ) -> Result<PathBuf, CacheError> {
        let (context, file) =
            cache_key::url_cache_key(url).ok_or_else(|| CacheError::InvalidUrl(url.to_string()))?;
        Ok(self.cache_path(&context, file))
    }

    /// Load a cached text file, or download it if it is not present.
    ///
    /// # Arguments
    /// * `url` - the source URL.
    /// * `download` - whether a cache miss may download.
    ///
    /// # Errors
    /// * [`CacheError::NotCached`] on a miss when `download` is `false`.
    /// * [`CacheError::NotFound`], [`CacheError::Timeout`], or
    ///   [`CacheError::Download`] if the download fails; no partial file is left behind.
    pub fn load_cached_path(
        &mut self,
        url: &str,
        download: bool,
    ) -> Result<PathBuf, CacheError> {
        let path = self.url_path(url)?;

        if path.exists() {
            log::debug!("cache hit: {}", path.display());
            return Ok(path);
        }

        if !download {
            return Err(CacheError::NotCached(path));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!("downloading {url} to {}", path.display());

        let partial = partial_path(&path);
        match self.download_to(url, &partial) {
            Ok(bytes) => {
                fs::rename(&partial, &path)?;
                log::debug!("downloaded {bytes} bytes from {url}");
                Ok(path)
            }
            Err(err) => {
                if partial.exists()
                    && let Err(e) = fs::remove_file(&partial)
                {
                    log::warn!("failed to remove partial download {}: {e}", partial.display());
                }
                Err(err)
            }
        }
    }

    fn download_to(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<u64, CacheError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| CacheError::from_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::from_status(url, status));
        }

        let mut writer = io::BufWriter::new(fs::File::create(dest)?);
        let bytes = response
            .copy_to(&mut writer)
            .map_err(|e| CacheError::from_request(url, e))?;
        writer.flush()?;

        Ok(bytes)
    }
}
