// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single `key=value` segments of a transfile line

use super::TransfileError;
use crate::jobspec::JobType;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// Allow expect here as the patterns are compile-time constants
#[allow(clippy::expect_used)]
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static DATAFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{6}\.[A-Za-z0-9._-]*$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]*$").expect("constant regex pattern is valid"));

/// Placeholder left in templates by submitters who never filled them in
const PLACEHOLDER: &str = "xxx";

/// The one-character keys a transfile line may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    /// `b`
    Destination,
    /// `f`
    Datafile,
    /// `t`
    TechnicalProtocol,
    /// `o`
    LibraryFormat,
    /// `c`
    Charset,
    /// `m`
    PrimaryEmail,
    /// `M`
    SecondaryEmail,
    /// `i`
    Initials,
    /// `j`
    JobType,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::Destination,
        FieldKey::Datafile,
        FieldKey::TechnicalProtocol,
        FieldKey::LibraryFormat,
        FieldKey::Charset,
        FieldKey::PrimaryEmail,
        FieldKey::SecondaryEmail,
        FieldKey::Initials,
        FieldKey::JobType,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_char() == c)
    }

    pub fn as_char(&self) -> char {
        match self {
            FieldKey::Destination => 'b',
            FieldKey::Datafile => 'f',
            FieldKey::TechnicalProtocol => 't',
            FieldKey::LibraryFormat => 'o',
            FieldKey::Charset => 'c',
            FieldKey::PrimaryEmail => 'm',
            FieldKey::SecondaryEmail => 'M',
            FieldKey::Initials => 'i',
            FieldKey::JobType => 'j',
        }
    }

    /// Whether `content` is acceptable for this key
    fn accepts(&self, content: &str) -> bool {
        match self {
            FieldKey::Destination
            | FieldKey::TechnicalProtocol
            | FieldKey::LibraryFormat
            | FieldKey::Charset => TOKEN.is_match(content) && content != PLACEHOLDER,
            FieldKey::Datafile => DATAFILE.is_match(content),
            FieldKey::PrimaryEmail | FieldKey::SecondaryEmail => EMAIL.is_match(content),
            FieldKey::Initials => INITIALS.is_match(content),
            FieldKey::JobType => content.parse::<JobType>().is_ok(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A validated `key=value` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransfileField {
    key: FieldKey,
    content: String,
}

impl TransfileField {
    /// Build a field, validating `content` against the key's constraint
    pub fn new(key: FieldKey, content: impl Into<String>) -> Result<Self, TransfileError> {
        let content = content.into();
        if content.chars().any(char::is_whitespace) {
            return Err(TransfileError::Whitespace(format!("{}={}", key, content)));
        }
        if !key.accepts(&content) {
            return Err(TransfileError::InvalidValue {
                key,
                value: content,
            });
        }
        Ok(Self { key, content })
    }

    /// Parse a single segment such as `f=123456.file`
    pub fn parse(segment: &str) -> Result<Self, TransfileError> {
        let Some((key, content)) = segment.split_once('=') else {
            return Err(TransfileError::MissingSeparator(segment.to_string()));
        };
        if key.is_empty() {
            return Err(TransfileError::MissingKey(segment.to_string()));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(TransfileError::Whitespace(segment.to_string()));
        }
        let mut chars = key.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => FieldKey::from_char(c),
            _ => None,
        }
        .ok_or_else(|| TransfileError::InvalidKey(key.to_string()))?;

        Self::new(key, content)
    }

    pub fn key(&self) -> FieldKey {
        self.key
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for TransfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.content)
    }
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;
