//! Output formatting and response shaping

pub mod formatter;
pub mod report;

pub use formatter::{save_report_to_file, ReportGenerator};
pub use report::{AnalysisResponse, RankResponse};
