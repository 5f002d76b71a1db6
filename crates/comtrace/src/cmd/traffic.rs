use std::path::PathBuf;

use chrono::TimeDelta;
use comtrace_capture::{coalesce_traffic, CaptureConfig};
use comtrace_link::{collect_entries, hex_string, TIMESTAMP_FORMAT};

use super::{create_output, finish_output, write_error, ConvertArgs};
use crate::exit::CliResult;
use crate::output::{AbortedFile, RunSummary};

const HEADER: [&str; 5] = ["time", "source", "dest", "length", "raw"];

pub fn run(args: &ConvertArgs, inputs: &[PathBuf], tolerance: TimeDelta) -> CliResult<RunSummary> {
    let mut summary = RunSummary::new("traffic", &args.output);
    let mut entries = Vec::new();
    for path in inputs {
        summary.files += 1;
        let (mut found, error) = collect_entries(path, CaptureConfig::default());
        tracing::info!(path = %path.display(), entries = found.len(), "capture scanned");
        entries.append(&mut found);
        if let Some(error) = error {
            tracing::error!(path = %path.display(), "capture aborted: {error}");
            summary.aborted.push(AbortedFile {
                path: path.display().to_string(),
                error: error.to_string(),
            });
        }
    }

    let mut writer = create_output(&args.output)?;
    if !args.no_header {
        writer
            .write_row(HEADER)
            .map_err(|err| write_error(&args.output, err))?;
    }
    for burst in coalesce_traffic(entries, tolerance) {
        writer
            .write_row([
                burst.time.format(TIMESTAMP_FORMAT).to_string(),
                burst.source,
                burst.dest,
                burst.payload.len().to_string(),
                hex_string(&burst.payload),
            ])
            .map_err(|err| write_error(&args.output, err))?;
        summary.records += 1;
    }
    finish_output(writer, &args.output)?;

    Ok(summary)
}
