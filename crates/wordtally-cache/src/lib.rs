//! # wordtally-cache
//!
//! Downloads source texts into a per-user cache directory,
//! and serves repeat requests from disk.
#![warn(missing_docs)]

use crate::path_resolver::PathResolver;

pub mod cache_key;
pub mod path_resolver;
pub mod text_cache;

pub use text_cache::{CacheError, TextCache, TextCacheOptions};

/// Environment variable key to override the default cache directory.
pub const WORDTALLY_CACHE_DIR: &str = "WORDTALLY_CACHE_DIR";

/// Default [`PathResolver`] for wordtally.
pub const WORDTALLY_CACHE_CONFIG: PathResolver = PathResolver {
    qualifier: "io.crates.wordtally",
    organization: "",
    application: "wordtally",
    cache_env_vars: &[WORDTALLY_CACHE_DIR],
};
