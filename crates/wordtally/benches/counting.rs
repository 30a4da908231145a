#![allow(missing_docs)]

use std::{num::NonZeroUsize, sync::Arc};

use divan::{Bencher, black_box, counter::BytesCount};
use wordtally::{
    MapBackend,
    MapExecutor,
    Token,
    TokenCounter,
    WordCountOptions,
    WordCountPipeline,
    counting::ChunkCounter,
    partition,
    tokenize,
};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const WORKERS: &[usize] = &[1, 2, 4, 8, 16];

static WORDS: &[&str] = &[
    "it", "is", "a", "truth", "universally", "acknowledged", "that", "single", "man", "in",
    "possession", "of", "good", "fortune", "must", "be", "want", "wife", "however", "little",
    "known", "the", "feelings", "or", "views", "such", "may", "on", "his", "first", "entering",
    "neighbourhood", "this", "so", "well", "fixed", "minds", "surrounding", "families", "he",
    "considered", "rightful", "property", "some", "one", "other", "their", "daughters", "1813",
];

/// A deterministic pseudo-text; Zipf-ish via a skewed index.
fn corpus(words: usize) -> String {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut text = String::with_capacity(words * 8);
    for i in 0..words {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let r = (state % 1000) as usize;
        let idx = (r * r / 1000) * WORDS.len() / 1000;
        text.push_str(WORDS[idx]);
        text.push_str(if i % 12 == 11 { ".\n" } else { " " });
    }
    text
}

fn text() -> String {
    corpus(200_000)
}

#[divan::bench]
fn tokenize_text(bencher: Bencher) {
    let text = text();
    bencher
        .counter(BytesCount::new(text.len()))
        .bench(|| tokenize(black_box(&text)));
}

mod map_reduce {
    use super::*;

    fn bench_backend(
        bencher: Bencher,
        backend: MapBackend,
        workers: usize,
    ) {
        let text = text();
        let tokens: Arc<[Token]> = tokenize(&text).into();
        let workers = NonZeroUsize::new(workers).unwrap();
        let chunks = partition(tokens.len(), workers);
        let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(TokenCounter);
        let executor = MapExecutor::new(backend);

        bencher.counter(BytesCount::new(text.len())).bench(|| {
            executor
                .run_map(black_box(&tokens), &chunks, &counter)
                .unwrap()
                .finish()
                .unwrap()
        });
    }

    #[divan::bench(args = WORKERS)]
    fn threads(
        bencher: Bencher,
        workers: usize,
    ) {
        bench_backend(bencher, MapBackend::Threads, workers);
    }

    #[cfg(feature = "rayon")]
    #[divan::bench(args = WORKERS)]
    fn rayon(
        bencher: Bencher,
        workers: usize,
    ) {
        bench_backend(bencher, MapBackend::Rayon, workers);
    }
}

#[divan::bench(args = WORKERS)]
fn pipeline(
    bencher: Bencher,
    workers: usize,
) {
    let text = text();
    let options = WordCountOptions::default().with_workers(NonZeroUsize::new(workers));
    let pipeline: WordCountPipeline = WordCountPipeline::new(options);
    let top_n = NonZeroUsize::new(10).unwrap();

    bencher
        .counter(BytesCount::new(text.len()))
        .bench(|| pipeline.run(black_box(&text), top_n).unwrap());
}
