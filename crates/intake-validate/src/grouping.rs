//! Partitioning rows by a caller-supplied key.

use std::collections::BTreeMap;
use std::fmt;

use crate::column_reader::ColumnReader;
use crate::error::{CheckError, Result};

/// Values of the key columns for one group, in key-column order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pairs: Vec<(String, String)>,
}

impl GroupKey {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (column, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{column} {value}")?;
        }
        Ok(())
    }
}

/// Row positions partitioned by key, in key order.
#[derive(Debug, Clone)]
pub struct Groups {
    groups: BTreeMap<GroupKey, Vec<usize>>,
}

impl Groups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl IntoIterator for Groups {
    type Item = (GroupKey, Vec<usize>);
    type IntoIter = std::collections::btree_map::IntoIter<GroupKey, Vec<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group the rows at `positions` by `key_columns`.
///
/// Rows with a missing value in any key column belong to no group. If rows
/// were given but none could be grouped, the key cannot describe this table
/// and [`CheckError::EmptyGrouping`] is returned.
pub fn group_rows<I>(reader: &ColumnReader<'_>, key_columns: &[&str], positions: I) -> Result<Groups>
where
    I: IntoIterator<Item = usize>,
{
    if key_columns.is_empty() {
        return Err(CheckError::invalid_argument(format!(
            "grouping {} requires at least one key column",
            reader.table()
        )));
    }

    let mut seen = 0usize;
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for idx in positions {
        seen += 1;
        if key_columns.iter().any(|c| reader.is_missing(c, idx)) {
            continue;
        }
        let pairs = key_columns
            .iter()
            .map(|c| ((*c).to_string(), reader.get_string(c, idx)))
            .collect();
        groups.entry(GroupKey { pairs }).or_default().push(idx);
    }

    if seen > 0 && groups.is_empty() {
        return Err(CheckError::EmptyGrouping {
            table: reader.table().to_string(),
            keys: key_columns.iter().map(|c| (*c).to_string()).collect(),
        });
    }
    Ok(Groups { groups })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_ingest::assign_row_id;
    use polars::prelude::*;

    #[test]
    fn rows_with_missing_keys_are_not_grouped() {
        let df = df! {
            "analysisbatchid" => &[Some("B1"), Some("B1"), None, Some("B2")],
            "analyteclass" => &["Metal", "Metal", "Metal", "PAH"],
        }
        .unwrap();
        let df = assign_row_id("r", df).unwrap();
        let reader = ColumnReader::new("r", &df);
        let groups = group_rows(&reader, &["analysisbatchid", "analyteclass"], 0..4).unwrap();

        let collected: Vec<(String, Vec<usize>)> = groups
            .iter()
            .map(|(k, rows)| (k.to_string(), rows.to_vec()))
            .collect();
        assert_eq!(
            collected,
            vec![
                ("analysisbatchid B1 and analyteclass Metal".to_string(), vec![0, 1]),
                ("analysisbatchid B2 and analyteclass PAH".to_string(), vec![3]),
            ]
        );
    }

    #[test]
    fn all_keys_missing_is_an_empty_grouping() {
        let df = df! { "batch" => &[None::<&str>, None] }.unwrap();
        let df = assign_row_id("r", df).unwrap();
        let reader = ColumnReader::new("r", &df);
        assert!(matches!(
            group_rows(&reader, &["batch"], 0..2),
            Err(CheckError::EmptyGrouping { .. })
        ));
        assert!(group_rows(&reader, &["batch"], std::iter::empty()).unwrap().is_empty());
    }
}
