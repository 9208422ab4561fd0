// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable row identifier. Assigned once by the record store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing run of ASCII digits, e.g. `4021` for `A-4021`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        let digits_start = self
            .0
            .char_indices()
            .rev()
            .take_while(|(_, ch)| ch.is_ascii_digit())
            .last()
            .map(|(index, _)| index)?;
        self.0[digits_start..].parse().ok()
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::RowId;

    #[test]
    fn numeric_suffix_reads_trailing_digits() {
        assert_eq!(RowId::from("A-1021").numeric_suffix(), Some(1021));
        assert_eq!(RowId::from("32484").numeric_suffix(), Some(32484));
        assert_eq!(RowId::from("imp-").numeric_suffix(), None);
        assert_eq!(RowId::from("D-10x").numeric_suffix(), None);
    }
}
