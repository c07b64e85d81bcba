pub mod dataset;
pub mod finding;
pub mod request;
pub mod result;

pub use dataset::DatasetSpec;
pub use finding::{Category, Finding, RowId, Severity};
pub use request::FindingRequest;
pub use result::RuleResult;
