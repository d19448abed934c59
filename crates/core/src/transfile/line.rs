// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lenient key/value view of a transfile line
//!
//! Unlike [`TransfileData`](super::TransfileData), a `Line` never fails to
//! parse. It backs job creation, where the raw text travels through the WAL
//! and is re-read long after validation.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    raw: String,
    fields: BTreeMap<String, String>,
    modified: bool,
}

impl Line {
    /// Read `key=value` segments from `raw`, ignoring segments without `=`
    ///
    /// A repeated key keeps its last value.
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .split(',')
            .filter_map(|segment| segment.split_once('='))
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            raw: raw.to_string(),
            fields,
            modified: false,
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The trimmed value of `key`, or `None` when absent or blank
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.field(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The line as text: the original when untouched, sorted pairs otherwise
    pub fn as_line(&self) -> String {
        if !self.modified {
            return self.raw.clone();
        }
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_line())
    }
}

#[cfg(test)]
#[path = "line_tests.rs"]
mod tests;
