use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields one source found for a number. Values are strings, lists of
/// strings, or small objects (search hits).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceResult {
    pub fields: BTreeMap<String, Value>,
}

impl SourceResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Inserts a list field only when it has entries.
    pub fn insert_list<T: Into<Value>>(&mut self, name: &str, items: Vec<T>) {
        if !items.is_empty() {
            let values: Vec<Value> = items.into_iter().map(Into::into).collect();
            self.fields.insert(name.to_string(), Value::Array(values));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `None` when there is nothing usable to report.
    pub fn into_non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Per-source results of one lookup run. Sources that failed, timed out or
/// found nothing have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateReport {
    entries: BTreeMap<String, SourceResult>,
}

impl AggregateReport {
    /// Drops empty results while building, so an empty entry can never exist.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (String, SourceResult)>,
    {
        let entries = results
            .into_iter()
            .filter(|(_, result)| !result.is_empty())
            .collect();
        Self { entries }
    }

    pub fn get(&self, source: &str) -> Option<&SourceResult> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }
}

/// What happened to one dispatched source. Kept for diagnostics only; the
/// report itself records nothing for non-`Found` outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SourceOutcome {
    Found,
    Empty,
    Failed(String),
    TimedOut,
}

impl SourceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SourceOutcome::Failed(_) | SourceOutcome::TimedOut)
    }
}
