use intake_ingest::assign_row_id;
use intake_model::{Category, FindingRequest};
use intake_validate::{RequiredPerGroup, TableRef, missing_matches, rpd};
use polars::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn rpd_of_equal_values_is_zero(x in 1e-6f64..1e9) {
        prop_assert_eq!(rpd(&[x, x]), Some(0.0));
    }

    #[test]
    fn rpd_is_symmetric(a in 1e-6f64..1e9, b in 1e-6f64..1e9) {
        prop_assert_eq!(rpd(&[a, b]), rpd(&[b, a]));
    }

    #[test]
    fn missing_matches_is_reflexive(
        rows in proptest::collection::vec((0u8..4, proptest::option::of(0u8..3)), 1..40)
    ) {
        let labs: Vec<String> = rows.iter().map(|(lab, _)| format!("L{lab}")).collect();
        let batches: Vec<Option<i64>> = rows.iter().map(|(_, b)| b.map(i64::from)).collect();
        let df = df! { "lab" => labs, "batch" => batches }.unwrap();
        let df = assign_row_id("t", df).unwrap();
        let table = TableRef::new("t", &df);

        prop_assert!(missing_matches(table, table, &["lab", "batch"]).unwrap().is_empty());
        prop_assert!(missing_matches(table, table, &["batch"]).unwrap().is_empty());
    }

    #[test]
    fn groups_covering_required_values_are_never_flagged(
        groups in proptest::collection::vec(0u8..5, 1..30),
        extra in proptest::collection::vec("[a-z]{1,3}", 0..5),
    ) {
        let required = ["Result", "Method blank"];
        let mut batch = Vec::new();
        let mut sampletype = Vec::new();
        for g in &groups {
            for value in required.iter().map(|s| (*s).to_string()).chain(extra.iter().cloned()) {
                batch.push(format!("B{g}"));
                sampletype.push(value);
            }
        }
        let df = df! { "batch" => batch, "sampletype" => sampletype }.unwrap();
        let df = assign_row_id("t", df).unwrap();
        let request = FindingRequest::error("t", Category::MissingData);

        let findings = RequiredPerGroup::new(&["batch"], "sampletype", required)
            .check("t", &df, &request, None)
            .unwrap();
        prop_assert!(findings.is_empty());
    }
}
