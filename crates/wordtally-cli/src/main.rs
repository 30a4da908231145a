mod count;
mod input_output;
mod logging;
mod render;
mod source_args;

use std::process::ExitCode;

use clap::Parser;
use wordtally::{FetchError, WordtallyError};

use crate::{count::CountArgs, logging::LogArgs};

/// Exit code for source fetch failures.
const EXIT_FETCH: u8 = 2;

/// Exit code for map/reduce failures.
const EXIT_PIPELINE: u8 = 3;

/// Count the most frequent words in a text.
#[derive(clap::Parser, Debug)]
#[command(name = "wordtally", version)]
pub struct Args {
    #[command(flatten)]
    logging: LogArgs,

    #[command(flatten)]
    count: CountArgs,
}

/// Describe `err`, and pick an exit code for it.
fn diagnose(err: &(dyn std::error::Error + 'static)) -> (String, u8) {
    if let Some(err) = err.downcast_ref::<FetchError>() {
        (format!("could not fetch source text: {err}"), EXIT_FETCH)
    } else if let Some(err) = err.downcast_ref::<WordtallyError>() {
        let kind = match err {
            WordtallyError::WorkerFailure { .. } => "map stage failed",
            WordtallyError::AggregationPrecondition(_) | WordtallyError::CountOverflow { .. } => {
                "aggregation failed"
            }
            _ => "internal error",
        };
        (format!("{kind}: {err}"), EXIT_PIPELINE)
    } else {
        (format!("{err}"), 1)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = args.logging.setup_logging(2) {
        eprintln!("error: failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    match args.count.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = diagnose(err.as_ref());
            log::debug!("{err:?}");
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}
