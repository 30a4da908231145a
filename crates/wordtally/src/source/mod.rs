//! # Text Sources
//!
//! Fetching the text to count; the tokenizer only ever sees the text.

mod locator;
mod text_source;

#[doc(inline)]
pub use locator::{EmptyLocator, SourceLocator};
#[doc(inline)]
pub use text_source::{DefaultTextSource, SourceOptions, TextSource, read_text};
