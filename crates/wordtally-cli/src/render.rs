use std::io::Write;

use wordtally::RankedList;

/// The default bar width, in cells.
pub const DEFAULT_CHART_WIDTH: usize = 50;

const BAR_CELL: char = '█';

/// Output formats.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Horizontal bar chart.
    #[default]
    Chart,

    /// ``word<TAB>count`` lines.
    Tsv,

    /// A JSON document.
    Json,
}

/// The chart/document title.
pub fn title(ranked: &RankedList) -> String {
    let n = ranked.requested.map_or(ranked.len(), |n| n.get());
    format!("Top {n} Words")
}

/// Renders a ranked list as a horizontal text bar chart, largest first.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    /// The width of the longest bar, in cells.
    pub width: usize,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl ChartRenderer {
    /// Scale `count` against `max` to a bar length.
    ///
    /// Any non-zero count gets at least one cell; a zero width draws no bars.
    fn bar_len(
        &self,
        count: u64,
        max: u64,
    ) -> usize {
        if self.width == 0 || count == 0 || max == 0 {
            return 0;
        }
        let scaled = (count as f64 / max as f64 * self.width as f64).round() as usize;
        scaled.clamp(1, self.width)
    }

    /// Render `ranked` to `writer`.
    pub fn render(
        &self,
        ranked: &RankedList,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", title(ranked))?;

        let max = ranked.max_count().unwrap_or(0);
        let label_width = ranked.iter().map(|e| e.token.len()).max().unwrap_or(0);
        let count_width = max.to_string().len();

        for entry in ranked {
            let bar: String = core::iter::repeat_n(BAR_CELL, self.bar_len(entry.count, max)).collect();
            let line = format!(
                "{:<label_width$} | {:>count_width$} {}",
                entry.token.as_str(),
                entry.count,
                bar,
            );
            writeln!(writer, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Render `ranked` as ``word<TAB>count`` lines.
pub fn render_tsv(
    ranked: &RankedList,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    for entry in ranked {
        writeln!(writer, "{}\t{}", entry.token, entry.count)?;
    }
    Ok(())
}

/// Render `ranked` as a JSON document.
pub fn render_json(
    ranked: &RankedList,
    total_tokens: usize,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let words: Vec<serde_json::Value> = ranked
        .iter()
        .map(|e| serde_json::json!({ "word": e.token.as_str(), "count": e.count }))
        .collect();

    let doc = serde_json::json!({
        "title": title(ranked),
        "total_tokens": total_tokens,
        "words": words,
    });

    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)?;
    Ok(())
}
