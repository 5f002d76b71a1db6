use std::path::{Path, PathBuf};

use comtrace_capture::{CaptureConfig, CaptureError, TraceEntries, TraceEntry};

use crate::assembler::Assembler;
use crate::config::AssemblerConfig;
use crate::error::{PipelineError, Result};
use crate::link::LinkReport;
use crate::record::{GarbageSpan, OutputRecord};

/// Expand a path pattern into the capture files it matches, sorted by path.
pub fn resolve_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("skipping unreadable input: {err}");
                None
            }
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(PipelineError::NoInputs {
            pattern: pattern.to_string(),
        });
    }
    Ok(paths)
}

/// Read a capture file as text with line endings normalized to `\n`.
///
/// Bytes that are not valid UTF-8 are replaced; they can only occur in the
/// free-text parts of a capture.
pub fn load_capture(path: &Path) -> Result<String> {
    let raw = std::fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&raw).replace("\r\n", "\n"))
}

/// A capture file whose processing stopped early.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Everything a pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Records from all files, sorted.
    pub records: Vec<OutputRecord>,
    pub failures: Vec<FileFailure>,
    pub garbage: Vec<GarbageSpan>,
    pub links: Vec<LinkReport>,
    pub files: usize,
}

/// Converts capture files into output records.
///
/// Files are fed through one shared [`Assembler`], so link state carries over
/// from one file to the next. A malformed file stops at its first bad block;
/// records completed before that point are kept and the remaining files are
/// still processed.
#[derive(Debug, Default)]
pub struct Pipeline {
    assembler: Assembler,
    capture: CaptureConfig,
    records: Vec<OutputRecord>,
    failures: Vec<FileFailure>,
    files: usize,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(CaptureConfig::default(), AssemblerConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(capture: CaptureConfig, assembler: AssemblerConfig) -> Self {
        Self {
            assembler: Assembler::with_config(assembler),
            capture,
            records: Vec::new(),
            failures: Vec::new(),
            files: 0,
        }
    }

    /// Process files in the given order, recording failures instead of
    /// stopping. Returns the number of files that failed.
    pub fn process_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let mut failed = 0;
        for path in paths {
            let path = path.as_ref();
            if let Err(error) = self.process_file(path) {
                tracing::error!(path = %path.display(), "capture aborted: {error}");
                self.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    error,
                });
                failed += 1;
            }
        }
        failed
    }

    /// Process one file. Returns the number of records it completed.
    pub fn process_file(&mut self, path: &Path) -> Result<usize> {
        self.files += 1;
        let text = load_capture(path)?;
        let produced = self
            .process_text(&text)
            .map_err(|source| PipelineError::Capture {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.display(), records = produced, "capture processed");
        Ok(produced)
    }

    /// Process the text of one capture. Records completed before a fatal
    /// block error are kept.
    pub fn process_text(&mut self, text: &str) -> std::result::Result<usize, CaptureError> {
        let mut produced = 0;
        for entry in TraceEntries::with_config(text, self.capture) {
            produced += self.assembler.ingest_into(entry?, &mut self.records);
        }
        Ok(produced)
    }

    /// Records collected so far, in production order.
    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    /// Finish the run, sorting the records.
    pub fn finish(mut self) -> PipelineOutput {
        self.records.sort();
        PipelineOutput {
            links: self.assembler.report(),
            garbage: self.assembler.take_garbage(),
            records: self.records,
            failures: self.failures,
            files: self.files,
        }
    }
}

/// Collect the trace entries of one file, in order.
///
/// On a malformed block the entries before it are returned together with
/// the error.
pub fn collect_entries(
    path: &Path,
    config: CaptureConfig,
) -> (Vec<TraceEntry>, Option<PipelineError>) {
    let text = match load_capture(path) {
        Ok(text) => text,
        Err(err) => return (Vec::new(), Some(err)),
    };

    let mut entries = Vec::new();
    for entry in TraceEntries::with_config(&text, config) {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(source) => {
                let err = PipelineError::Capture {
                    path: path.to_path_buf(),
                    source,
                };
                return (entries, Some(err));
            }
        }
    }
    (entries, None)
}
