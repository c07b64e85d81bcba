//! Rule modules for chemistry and field sampling submissions.
//!
//! Each module composes the primitives from `intake-validate` into the checks
//! for one dataset type. [`engine_for`] builds a ready [`RuleEngine`] by
//! dataset name.
//!
//! [`RuleEngine`]: intake_validate::RuleEngine

pub mod chemistry;
pub mod field;
pub mod registry;

pub use chemistry::ChemistryModule;
pub use field::{FieldGrabModule, FieldTrawlModule, is_valid_time, minutes_between};
pub use registry::{CHEMISTRY, FIELD_GRAB, FIELD_TRAWL, builtin_datasets, engine_for, modules_for};
