use intake_model::{Category, DatasetSpec, FindingRequest, RowId, RuleResult, Severity};

#[test]
fn empty_rows_produce_no_finding() {
    let request = FindingRequest::error("tbl_chemresults", Category::Logic);
    assert!(request.finding(Vec::<RowId>::new()).is_none());
}

#[test]
fn finding_deduplicates_and_orders_rows() {
    let request = FindingRequest::error("tbl_chemresults", Category::Value)
        .with_columns("Result")
        .with_message("Result must be positive");
    let finding = request
        .finding([RowId(4), RowId(1), RowId(4)])
        .expect("finding");
    let rows: Vec<u32> = finding.rows().iter().map(|r| r.get()).collect();
    assert_eq!(rows, vec![1, 4]);
    assert_eq!(finding.columns(), "Result");
    assert_eq!(finding.category(), Category::Value);
    assert!(!finding.is_core_error());
}

#[test]
fn builder_updates_do_not_leak_between_findings() {
    let base = FindingRequest::warning("tbl_grabevent", Category::Location);
    let first = base.clone().with_message("outside").with_columns("latitude");
    let second = base.with_message("unresolved");

    assert_eq!(first.columns(), "latitude");
    assert_eq!(second.columns(), "");
    assert_eq!(second.message(), "unresolved");
}

#[test]
fn group_key_is_carried_as_structured_data() {
    let finding = FindingRequest::error("tbl_chemresults", Category::MissingData)
        .with_group([("analysisbatchid", "B-17"), ("analyteclass", "Metal")])
        .finding([RowId(0)])
        .expect("finding");
    assert_eq!(
        finding.group().get("analysisbatchid").map(String::as_str),
        Some("B-17")
    );
}

#[test]
fn rule_result_routes_by_severity() {
    let mut result = RuleResult::new();
    result.extend([
        FindingRequest::error("a", Category::Logic).finding([RowId(0)]),
        FindingRequest::warning("b", Category::Value).finding([RowId(1)]),
        FindingRequest::error("a", Category::Logic).finding(Vec::new()),
    ]);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.warning_count(), 1);
    assert!(result.has_errors());
    assert_eq!(result.by_table().len(), 2);
}

#[test]
fn severity_parses_case_insensitively() {
    assert_eq!(Severity::parse(" Warning "), Some(Severity::Warning));
    assert_eq!(Severity::parse("fatal"), None);
}

#[test]
fn dataset_reports_missing_tables() {
    let spec = DatasetSpec::new("chemistry", ["tbl_chembatch", "tbl_chemresults"]);
    let missing = spec.missing_tables(["TBL_CHEMBATCH"]);
    assert_eq!(missing, vec!["tbl_chemresults".to_string()]);
}

#[test]
fn result_serializes_rows_as_integers() {
    let mut result = RuleResult::new();
    result.extend([FindingRequest::error("t", Category::Format).finding([RowId(3)])]);
    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["errors"][0]["rows"][0], 3);
    assert_eq!(json["errors"][0]["category"], "format");
}
