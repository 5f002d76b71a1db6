use std::path::PathBuf;

use comtrace_link::{Pipeline, TIMESTAMP_FORMAT};

use super::{create_output, finish_output, write_error, ConvertArgs};
use crate::exit::CliResult;
use crate::output::{AbortedFile, LinkSummary, RunSummary};

const HEADER: [&str; 5] = ["start_time", "end_time", "source", "dest", "raw"];

pub fn run(args: &ConvertArgs, inputs: &[PathBuf]) -> CliResult<RunSummary> {
    let mut pipeline = Pipeline::new();
    pipeline.process_files(inputs);
    let output = pipeline.finish();

    let mut writer = create_output(&args.output)?;
    if !args.no_header {
        writer
            .write_row(HEADER)
            .map_err(|err| write_error(&args.output, err))?;
    }
    for record in &output.records {
        writer
            .write_row([
                record.start.format(TIMESTAMP_FORMAT).to_string(),
                record.end.format(TIMESTAMP_FORMAT).to_string(),
                record.source.clone(),
                record.dest.clone(),
                record.raw_hex(),
            ])
            .map_err(|err| write_error(&args.output, err))?;
    }
    finish_output(writer, &args.output)?;

    let mut summary = RunSummary::new("frames", &args.output);
    summary.files = output.files;
    summary.records = output.records.len();
    summary.aborted = output.failures.iter().map(AbortedFile::from).collect();
    summary.links = output.links.iter().map(LinkSummary::from).collect();
    summary.garbage_spans = output.garbage.len();
    Ok(summary)
}
