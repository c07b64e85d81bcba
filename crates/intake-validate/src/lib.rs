//! Validation primitives and the rule-module engine.
//!
//! Rule modules read submission tables through [`ColumnReader`], call the
//! primitives in this crate, and return a [`RuleResult`](intake_model::RuleResult).
//! Primitives fail with [`CheckError`] only on authoring defects: a missing
//! column, a malformed argument, or a grouping that produced nothing.

pub mod column_reader;
pub mod context;
pub mod cross_table;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod lookup;
pub mod presence;
pub mod recorder;
pub mod row_check;
pub mod spatial;
pub mod stats;

pub use column_reader::{ColumnReader, RowView, filter_rows, require_columns};
pub use context::ValidationContext;
pub use cross_table::{NULL_KEY, TableRef, missing_matches, missing_matches_on};
pub use engine::{ModuleRun, ModuleStatus, RuleEngine, RuleModule, ValidationRun};
pub use error::{CheckError, Result};
pub use grouping::{GroupKey, Groups, group_rows};
pub use lookup::{
    LookupOptions, MissingPolicy, Normalization, invalid_lookup_rows, invalid_multi_value_rows,
    split_tokens,
};
pub use presence::{RequireAnyPerGroup, RequiredPerGroup};
pub use recorder::{FindingSink, record};
pub use row_check::flag_rows;
pub use spatial::{AssignmentColumns, Geometry, SpatialOutcome, in_assigned_region};
pub use stats::{
    FailingGroup, PERCENT_RECOVERY_COLUMN, Recovery, RecoveryColumns, ReplicateGroup,
    RpdOutcome, Unevaluable, is_spike_or_reference, pass_rate, percent_recovery, replicate_rpd,
    rpd,
};
