// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strictly validated transfile lines

use super::field::{FieldKey, TransfileField};
use super::TransfileError;
use crate::jobspec::JobType;
use std::fmt;

/// A transfile line whose every field passed validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransfileData {
    fields: Vec<TransfileField>,
}

impl TransfileData {
    /// Parse a line requiring `b` first and `f` present
    ///
    /// A wholly empty line is valid and carries no fields.
    pub fn parse(line: &str) -> Result<Self, TransfileError> {
        let data = Self::parse_partial(line)?;
        if !data.is_empty() && data.field(FieldKey::Datafile).is_none() {
            return Err(TransfileError::MissingDatafile);
        }
        Ok(data)
    }

    /// Parse a line requiring `b` first but tolerating a missing `f`
    pub fn parse_partial(line: &str) -> Result<Self, TransfileError> {
        if line.is_empty() {
            return Ok(Self::default());
        }

        let mut fields: Vec<TransfileField> = Vec::new();
        for (position, segment) in line.split(',').enumerate() {
            if segment.is_empty() {
                return Err(TransfileError::EmptySegment { position });
            }
            let field = TransfileField::parse(segment)?;
            if fields.iter().any(|f| f.key() == field.key()) {
                return Err(TransfileError::DuplicateKey(field.key()));
            }
            fields.push(field);
        }

        match fields.first() {
            Some(first) if first.key() == FieldKey::Destination => Ok(Self { fields }),
            _ if fields.iter().any(|f| f.key() == FieldKey::Destination) => {
                Err(TransfileError::DestinationNotFirst)
            }
            _ => Err(TransfileError::MissingDestination),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[TransfileField] {
        &self.fields
    }

    pub fn field(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key() == key)
            .map(TransfileField::content)
    }

    pub fn destination(&self) -> Option<&str> {
        self.field(FieldKey::Destination)
    }

    pub fn datafile(&self) -> Option<&str> {
        self.field(FieldKey::Datafile)
    }

    pub fn job_type(&self) -> Option<JobType> {
        self.field(FieldKey::JobType).and_then(|j| j.parse().ok())
    }
}

impl fmt::Display for TransfileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
