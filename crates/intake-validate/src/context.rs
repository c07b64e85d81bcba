//! Explicit per-run state handed to every rule module.

use intake_model::{Finding, FindingRequest, RowId};
use intake_reference::{BoundaryLookup, ReferenceSource};

use crate::recorder::{FindingSink, record};

/// Everything a rule module may read besides the submission tables.
///
/// Shared by reference across worker threads for the whole run.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    submission_id: String,
    reference: &'a dyn ReferenceSource,
    boundaries: Option<&'a BoundaryLookup>,
    sink: Option<FindingSink>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(submission_id: impl Into<String>, reference: &'a dyn ReferenceSource) -> Self {
        Self {
            submission_id: submission_id.into(),
            reference,
            boundaries: None,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_boundaries(mut self, boundaries: &'a BoundaryLookup) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: FindingSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn reference(&self) -> &'a dyn ReferenceSource {
        self.reference
    }

    pub fn boundaries(&self) -> Option<&'a BoundaryLookup> {
        self.boundaries
    }

    pub fn sink(&self) -> Option<&FindingSink> {
        self.sink.as_ref()
    }

    /// Record through this context's sink.
    pub fn record<I>(&self, request: &FindingRequest, rows: I) -> Option<Finding>
    where
        I: IntoIterator<Item = RowId>,
    {
        record(request, rows, self.sink())
    }

    /// A copy of this context whose findings go to `sink` instead.
    pub(crate) fn redirected(&self, sink: FindingSink) -> Self {
        Self {
            sink: Some(sink),
            ..self.clone()
        }
    }

    /// Forward a finding built outside the recorder to the sink.
    pub(crate) fn publish(&self, finding: &Finding) {
        if let Some(sink) = &self.sink {
            let _ = sink.send(finding.clone());
        }
    }
}

impl std::fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("submission_id", &self.submission_id)
            .field("boundaries", &self.boundaries.map(BoundaryLookup::len))
            .field("streaming", &self.sink.is_some())
            .finish()
    }
}
