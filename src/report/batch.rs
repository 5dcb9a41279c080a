use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::model::ImageSpec;
use crate::store::ImageStore;

use super::{info_line, total_line, verbose_lines};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub verbose: bool,
    /// Decode every image and total the in-memory sizes.
    pub sum: bool,
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub reported: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
    spec: &'a ImageSpec,
}

/// Prints a description of each file to `out` and one error line per failure
/// to `err`. Failures never stop the batch.
///
/// Only headers are read unless `options.sum` is set; then pixels are decoded
/// too, and only images that decode completely count toward the total. Each
/// record leaves the store once its file is done.
pub fn report_files<W: Write, E: Write>(
    store: &mut ImageStore,
    paths: &[PathBuf],
    options: ReportOptions,
    out: &mut W,
    err: &mut E,
) -> io::Result<ReportSummary> {
    let mut summary = ReportSummary::default();

    for path in paths {
        let index = store.register(path.clone(), false);
        let reported = report_one(store, index, path, options, out, err);
        store.remove(index).map_err(io::Error::other)?;
        match reported? {
            Some(bytes) => {
                summary.reported += 1;
                if options.sum {
                    summary.total_bytes += bytes;
                }
            }
            None => summary.failed += 1,
        }
    }

    if options.sum {
        writeln!(out, "{}", total_line(summary.total_bytes))?;
    }
    debug!(
        "reported {} file(s), {} failure(s)",
        summary.reported, summary.failed
    );
    Ok(summary)
}

/// Reports one registered file. Returns its in-memory size, or `None` after
/// printing an error line.
fn report_one<W: Write, E: Write>(
    store: &mut ImageStore,
    index: usize,
    path: &Path,
    options: ReportOptions,
    out: &mut W,
    err: &mut E,
) -> io::Result<Option<u64>> {
    let name = path.to_string_lossy().to_string();

    if let Err(error) = store.ensure_spec(index) {
        let message = store.take_error(index).unwrap_or_else(|| error.to_string());
        writeln!(err, "iinfo: Could not open \"{name}\" : {message}")?;
        return Ok(None);
    }

    if options.sum {
        if let Err(error) = store.ensure_pixels(index, false, None) {
            let message = store.take_error(index).unwrap_or_else(|| error.to_string());
            writeln!(err, "iinfo: Could not read \"{name}\" : {message}")?;
            return Ok(None);
        }
    }

    let Some(spec) = store.get(index).and_then(|record| record.spec()) else {
        return Ok(None);
    };
    let bytes = spec.image_bytes();
    if options.json {
        let entry = JsonEntry {
            file: &name,
            bytes: options.sum.then_some(bytes),
            spec,
        };
        let json = serde_json::to_string(&entry).map_err(io::Error::other)?;
        writeln!(out, "{json}")?;
    } else {
        writeln!(out, "{}", info_line(&name, spec, options.sum))?;
        if options.verbose {
            for line in verbose_lines(spec) {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(Some(bytes))
}
