mod batch;
mod format;


pub use batch::{ReportOptions, ReportSummary, report_files};
pub use format::{info_line, total_line, verbose_lines};
