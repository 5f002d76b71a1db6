use std::io::IsTerminal;
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use comtrace_link::{FileFailure, LinkReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub mode: &'static str,
    pub output: String,
    pub files: usize,
    pub records: usize,
    pub aborted: Vec<AbortedFile>,
    pub links: Vec<LinkSummary>,
    pub garbage_spans: usize,
}

impl RunSummary {
    pub fn new(mode: &'static str, output: &Path) -> Self {
        Self {
            mode,
            output: output.display().to_string(),
            files: 0,
            records: 0,
            aborted: Vec::new(),
            links: Vec::new(),
            garbage_spans: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AbortedFile {
    pub path: String,
    pub error: String,
}

impl From<&FileFailure> for AbortedFile {
    fn from(failure: &FileFailure) -> Self {
        Self {
            path: failure.path.display().to_string(),
            error: failure.error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub source: String,
    pub dest: String,
    pub entries: usize,
    pub bytes_in: usize,
    pub frames: usize,
    pub resyncs: usize,
    pub garbage_bytes: usize,
    pub buffered: usize,
}

impl From<&LinkReport> for LinkSummary {
    fn from(report: &LinkReport) -> Self {
        Self {
            source: report.key.source.clone(),
            dest: report.key.dest.clone(),
            entries: report.stats.entries,
            bytes_in: report.stats.bytes_in,
            frames: report.stats.frames,
            resyncs: report.stats.resyncs,
            garbage_bytes: report.stats.garbage_bytes,
            buffered: report.buffered,
        }
    }
}

pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MODE", "FILES", "ABORTED", "RECORDS", "OUTPUT"])
                .add_row(vec![
                    summary.mode.to_string(),
                    summary.files.to_string(),
                    summary.aborted.len().to_string(),
                    summary.records.to_string(),
                    summary.output.clone(),
                ]);
            println!("{table}");

            if !summary.links.is_empty() {
                let mut links = Table::new();
                links
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec![
                        "SOURCE", "DEST", "ENTRIES", "BYTES", "FRAMES", "RESYNCS", "GARBAGE",
                        "BUFFERED",
                    ]);
                for link in &summary.links {
                    links.add_row(vec![
                        link.source.clone(),
                        link.dest.clone(),
                        link.entries.to_string(),
                        link.bytes_in.to_string(),
                        link.frames.to_string(),
                        link.resyncs.to_string(),
                        link.garbage_bytes.to_string(),
                        link.buffered.to_string(),
                    ]);
                }
                println!("{links}");
            }

            if !summary.aborted.is_empty() {
                let mut aborted = Table::new();
                aborted
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["ABORTED FILE", "REASON"]);
                for file in &summary.aborted {
                    aborted.add_row(vec![file.path.clone(), file.error.clone()]);
                }
                println!("{aborted}");
            }
        }
        OutputFormat::Pretty => {
            println!(
                "mode={} files={} aborted={} records={} output={}",
                summary.mode,
                summary.files,
                summary.aborted.len(),
                summary.records,
                summary.output
            );
            for link in &summary.links {
                println!(
                    "link {} -> {}: entries={} bytes={} frames={} resyncs={} garbage={} buffered={}",
                    link.source,
                    link.dest,
                    link.entries,
                    link.bytes_in,
                    link.frames,
                    link.resyncs,
                    link.garbage_bytes,
                    link.buffered
                );
            }
            for file in &summary.aborted {
                println!("aborted {}: {}", file.path, file.error);
            }
        }
    }
}
