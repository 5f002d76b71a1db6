use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use clap::{Args, ValueEnum};
use comtrace_link::resolve_inputs;

use crate::csv::CsvWriter;
use crate::exit::{io_error, pipeline_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_summary, OutputFormat};

mod frames;
mod traffic;

/// What the output file holds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One row per decoded frame, with the capture time window it spans.
    #[default]
    Frames,
    /// One row per burst of capture entries on a link.
    Traffic,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Capture file path pattern (e.g. "logs/*.log").
    pub pattern: String,
    /// CSV file to write.
    pub output: PathBuf,
    /// Output mode.
    #[arg(long, value_enum, default_value = "frames")]
    pub mode: Mode,
    /// Traffic mode: merge entries on a link within this long of the burst start (e.g. 1s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "1s")]
    pub tolerance: String,
    /// Omit the CSV header row.
    #[arg(long)]
    pub no_header: bool,
}

pub fn run(args: ConvertArgs, format: OutputFormat) -> CliResult<i32> {
    let tolerance = parse_duration(&args.tolerance)?;
    let inputs = resolve_inputs(&args.pattern).map_err(pipeline_error)?;
    tracing::debug!(files = inputs.len(), pattern = %args.pattern, "inputs resolved");

    let summary = match args.mode {
        Mode::Frames => frames::run(&args, &inputs)?,
        Mode::Traffic => traffic::run(&args, &inputs, tolerance)?,
    };
    print_summary(&summary, format);

    if summary.aborted.is_empty() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

type OutputWriter = CsvWriter<BufWriter<File>>;

fn create_output(path: &Path) -> CliResult<OutputWriter> {
    let file = File::create(path).map_err(|err| write_error(path, err))?;
    Ok(CsvWriter::new(BufWriter::new(file)))
}

fn finish_output(writer: OutputWriter, path: &Path) -> CliResult<()> {
    writer.into_inner().map_err(|err| write_error(path, err))?;
    Ok(())
}

fn write_error(path: &Path, err: io::Error) -> CliError {
    io_error(&format!("write {}", path.display()), err)
}

fn parse_duration(input: &str) -> CliResult<TimeDelta> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: i64 = number
        .parse()
        .ok()
        .filter(|value| *value >= 0)
        .ok_or_else(|| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    let delta = match unit {
        "ms" => TimeDelta::try_milliseconds(value),
        _ => TimeDelta::try_seconds(value),
    };
    delta.ok_or_else(|| CliError::new(USAGE, format!("duration out of range: {input}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), TimeDelta::seconds(2));
        assert_eq!(parse_duration("150ms").unwrap(), TimeDelta::milliseconds(150));
        assert_eq!(parse_duration("3").unwrap(), TimeDelta::seconds(3));
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
        assert_eq!(parse_duration("1.5s").unwrap_err().code, USAGE);
    }
}
