use serde::{Deserialize, Serialize};

/// A dataset type: the set of tables one upload of that type must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub tables: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DatasetSpec {
    pub fn new<I, S>(name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tables: tables.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    /// Required tables absent from `available`, in declaration order.
    pub fn missing_tables<'a, I>(&self, available: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available: Vec<&str> = available.into_iter().collect();
        self.tables
            .iter()
            .filter(|table| !available.iter().any(|name| name.eq_ignore_ascii_case(table)))
            .cloned()
            .collect()
    }
}
