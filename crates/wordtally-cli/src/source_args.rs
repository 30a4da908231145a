use std::time::Duration;

use wordtally::{
    DefaultTextSource,
    SourceLocator,
    SourceOptions,
    cache::TextCacheOptions,
};

/// The default source: Project Gutenberg's "Pride and Prejudice".
pub const DEFAULT_SOURCE_URL: &str = "https://www.gutenberg.org/files/1342/1342-0.txt";

/// Source text argument group.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// URL, path, or "-" for stdin.
    #[arg(default_value = DEFAULT_SOURCE_URL)]
    pub source: SourceLocator,

    /// Cache directory for downloaded texts; defaults to $WORDTALLY_CACHE_DIR,
    /// then the user cache dir.
    #[arg(long, default_value = None)]
    cache_dir: Option<String>,

    /// Never download; URL sources must already be cached.
    #[arg(long)]
    offline: bool,

    /// Download timeout, in seconds.
    #[arg(long, default_value = None)]
    fetch_timeout_secs: Option<u64>,
}

impl SourceArgs {
    /// Build the text source.
    pub fn init_source(&self) -> DefaultTextSource {
        let cache = TextCacheOptions::default()
            .with_cache_dir(self.cache_dir.as_ref())
            .with_timeout(self.fetch_timeout_secs.map(Duration::from_secs));

        DefaultTextSource::new(
            SourceOptions::default()
                .with_cache(cache)
                .with_offline(self.offline),
        )
    }
}
