//! Finding recorder.

use crossbeam_channel::Sender;
use tracing::trace;

use intake_model::{Finding, FindingRequest, RowId};

/// Cross-worker channel that receives a copy of every recorded finding.
pub type FindingSink = Sender<Finding>;

/// Materialize `request` for `rows`.
///
/// Returns `None` for an empty row set. When a sink is given the finding is
/// also sent to it; a disconnected receiver is ignored.
pub fn record<I>(request: &FindingRequest, rows: I, sink: Option<&FindingSink>) -> Option<Finding>
where
    I: IntoIterator<Item = RowId>,
{
    let finding = request.finding(rows)?;
    trace!(
        table = finding.table(),
        rows = finding.rows().len(),
        severity = finding.severity().label(),
        "recorded finding"
    );
    if let Some(sink) = sink
        && sink.send(finding.clone()).is_err()
    {
        trace!("finding sink disconnected");
    }
    Some(finding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::Category;

    #[test]
    fn empty_rows_record_nothing() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let request = FindingRequest::error("tbl_chembatch", Category::Logic);
        assert!(record(&request, Vec::new(), Some(&tx)).is_none());
        drop(tx);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn recorded_finding_is_streamed() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let request = FindingRequest::warning("tbl_chemresults", Category::Value)
            .with_columns("Result")
            .with_message("check the result");
        let finding = record(&request, [RowId(3), RowId(1), RowId(3)], Some(&tx)).unwrap();
        assert_eq!(finding.rows().len(), 2);
        drop(tx);
        let streamed: Vec<Finding> = rx.iter().collect();
        assert_eq!(streamed, vec![finding]);
    }

    #[test]
    fn disconnected_sink_is_not_an_error() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let request = FindingRequest::error("t", Category::Format);
        assert!(record(&request, [RowId(0)], Some(&tx)).is_some());
    }
}
