//! Dataset name to rule modules.

use intake_model::DatasetSpec;
use intake_validate::{RuleEngine, RuleModule};

use crate::chemistry::{self, ChemistryModule};
use crate::field::{self, FieldGrabModule, FieldTrawlModule};

pub const CHEMISTRY: &str = "chemistry";
pub const FIELD_GRAB: &str = "field_grab";
pub const FIELD_TRAWL: &str = "field_trawl";

/// Dataset types with built-in rule modules, with the tables they need.
pub fn builtin_datasets() -> Vec<DatasetSpec> {
    vec![
        DatasetSpec::new(CHEMISTRY, [chemistry::BATCH, chemistry::RESULTS]),
        DatasetSpec::new(FIELD_GRAB, [field::OCCUPATION, field::GRAB]),
        DatasetSpec::new(FIELD_TRAWL, [field::OCCUPATION, field::TRAWL]),
    ]
}

/// Rule modules for `dataset`; empty for an unknown dataset type.
pub fn modules_for(dataset: &str) -> Vec<Box<dyn RuleModule>> {
    match dataset.trim().to_lowercase().as_str() {
        CHEMISTRY => vec![Box::new(ChemistryModule)],
        FIELD_GRAB => vec![Box::new(FieldGrabModule)],
        FIELD_TRAWL => vec![Box::new(FieldTrawlModule)],
        _ => Vec::new(),
    }
}

/// Engine with every module registered for `dataset`, if any.
pub fn engine_for(dataset: &str) -> Option<RuleEngine> {
    let modules = modules_for(dataset);
    if modules.is_empty() {
        return None;
    }
    let mut engine = RuleEngine::new();
    for module in modules {
        engine.register(module);
    }
    Some(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_dataset_has_an_engine() {
        for spec in builtin_datasets() {
            let engine = engine_for(&spec.name).expect("engine");
            assert!(!engine.is_empty(), "{}", spec.name);
        }
    }

    #[test]
    fn module_tables_are_declared_by_the_dataset() {
        for spec in builtin_datasets() {
            for module in modules_for(&spec.name) {
                for table in module.tables() {
                    assert!(spec.tables.iter().any(|t| t == table), "{table}");
                }
            }
        }
    }

    #[test]
    fn lookup_ignores_case_and_rejects_unknown() {
        assert!(engine_for(" Chemistry ").is_some());
        assert!(engine_for("toxicity").is_none());
    }
}
