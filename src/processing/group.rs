//! Hashable grouping keys and first-appearance ordered groups.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::Value;

/// Hashable identity of a [`Value`].
///
/// Floats compare by bit pattern (with `-0.0` folded into `0.0`), so every float groups with
/// itself, NaN included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&Value> for GroupKey {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Int64(i) => Self::Int(*i),
            Value::Float64(f) => Self::Float(if *f == 0.0 { 0 } else { f.to_bits() }),
            Value::Bool(b) => Self::Bool(*b),
            Value::Utf8(s) => Self::Text(s.clone()),
            Value::DateTime(dt) => Self::DateTime(*dt),
        }
    }
}

/// Groups keyed by value, kept in order of first appearance.
#[derive(Debug)]
pub(crate) struct Groups<T> {
    index: HashMap<GroupKey, usize>,
    entries: Vec<(Value, T)>,
}

impl<T: Default> Groups<T> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Accumulator for `key`, created on first sight.
    pub(crate) fn entry(&mut self, key: &Value) -> &mut T {
        let next = self.entries.len();
        let idx = *self.index.entry(GroupKey::from(key)).or_insert(next);
        if idx == next {
            self.entries.push((key.clone(), T::default()));
        }
        &mut self.entries[idx].1
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(Value, T)> {
        self.entries.iter()
    }

    pub(crate) fn into_entries(self) -> Vec<(Value, T)> {
        self.entries
    }
}
