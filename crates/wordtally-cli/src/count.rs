use std::{io::Write, num::NonZeroUsize, time::Duration};

use wordtally::{
    MapBackend,
    PipelineOutcome,
    TextSource,
    WordCountOptions,
    WordCountPipeline,
    rank_all,
};

use crate::{
    input_output::OutputArgs,
    render::{ChartRenderer, DEFAULT_CHART_WIDTH, OutputFormat, render_json, render_tsv},
    source_args::SourceArgs,
};

/// Map stage backend selector.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendArg {
    /// One named OS thread per chunk.
    Threads,

    /// A dedicated rayon pool.
    #[default]
    Rayon,
}

impl From<BackendArg> for MapBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Threads => MapBackend::Threads,
            BackendArg::Rayon => MapBackend::Rayon,
        }
    }
}

/// Args for counting words.
#[derive(clap::Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Number of words to show.
    #[arg(long, default_value = "10")]
    top: NonZeroUsize,

    /// Show every word; overrides --top.
    #[arg(long)]
    all: bool,

    /// Number of map workers; defaults to the available parallelism.
    #[arg(long, default_value = None)]
    workers: Option<NonZeroUsize>,

    /// Map stage backend.
    #[arg(long, value_enum, default_value_t = BackendArg::default())]
    backend: BackendArg,

    /// Fail if the map stage takes longer than this many milliseconds.
    #[arg(long, default_value = None)]
    map_timeout_ms: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::default())]
    format: OutputFormat,

    /// Chart bar width; 0 prints the counts without bars.
    #[arg(long, default_value_t = DEFAULT_CHART_WIDTH)]
    width: usize,
}

impl CountArgs {
    fn options(&self) -> WordCountOptions {
        WordCountOptions::default()
            .with_workers(self.workers)
            .with_backend(self.backend.into())
            .with_map_timeout(self.map_timeout_ms.map(Duration::from_millis))
    }

    /// Run the count.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut source = self.source.init_source();
        let text = source.fetch(&self.source.source)?;

        let pipeline: WordCountPipeline = WordCountPipeline::new(self.options());
        let outcome = pipeline.run(&text, self.top)?;

        let mut writer = self.output.open_writer()?;
        self.write_outcome(&outcome, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_outcome(
        &self,
        outcome: &PipelineOutcome,
        writer: &mut dyn Write,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let report = match outcome {
            PipelineOutcome::Empty => {
                writeln!(writer, "No words found.")?;
                return Ok(());
            }
            PipelineOutcome::Ranked(report) => report,
        };

        log::info!(
            "{} tokens, {} distinct, {} worker(s); trace: {:?}",
            report.token_count,
            report.total.len(),
            report.workers,
            report.trace
        );

        let all;
        let ranked = if self.all {
            all = rank_all(&report.total);
            &all
        } else {
            &report.ranked
        };

        match self.format {
            OutputFormat::Chart => ChartRenderer { width: self.width }.render(ranked, writer)?,
            OutputFormat::Tsv => render_tsv(ranked, writer)?,
            OutputFormat::Json => render_json(ranked, report.token_count, writer)?,
        }
        Ok(())
    }
}
