//! Library side of the `intake` binary: logging setup, the check pipeline and
//! the JSON report.

pub mod logging;
pub mod pipeline;
pub mod report;

pub use pipeline::{CheckOutcome, check_submission, load_bundle};
pub use report::{JsonReport, write_json_report};
