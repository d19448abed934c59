// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transfiles: line-oriented job declarations terminated by `slut`

mod data;
mod field;
mod line;

pub use data::TransfileData;
pub use field::{FieldKey, TransfileField};
pub use line::Line;

use crate::encoding::{self, Charset};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Sentinel line marking a completely written transfile
pub const END_MARKER: &str = "slut";
const LEGACY_END_MARKER: &str = "finish";

/// Operator message for a transfile without content
pub const EMPTY_CONTENT_CAUSE: &str = "Transfil har intet indhold";
/// Operator message for a transfile that never received its end marker
pub const MISSING_END_MARKER_CAUSE: &str = "Transfil mangler slut-linje";
/// Operator message for a line without a datafile declaration
pub const MISSING_DATAFILE_CAUSE: &str = "Datafil angivelse mangler i transfilen";

/// Operator message for a line that failed validation (`line` is 1-based)
pub fn invalid_line_cause(line: usize, reason: &TransfileError) -> String {
    format!("Transfil indeholder ugyldig linje {}: {}", line, reason)
}

/// Validation failures of a single line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransfileError {
    #[error("empty field at position {position}")]
    EmptySegment { position: usize },

    #[error("field '{0}' has no '=' separator")]
    MissingSeparator(String),

    #[error("field '{0}' has no key")]
    MissingKey(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("whitespace in field '{0}'")]
    Whitespace(String),

    #[error("duplicate key '{0}'")]
    DuplicateKey(FieldKey),

    #[error("destination (b) must be the first field")]
    DestinationNotFirst,

    #[error("missing destination (b)")]
    MissingDestination,

    #[error("missing datafile (f)")]
    MissingDatafile,

    #[error("invalid value '{value}' for key '{key}'")]
    InvalidValue { key: FieldKey, value: String },
}

/// Failures of [`parse_stream`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The end marker has not been written yet
    #[error("unexpected end of file before '{END_MARKER}'")]
    UnexpectedEndOfFile,

    #[error("invalid line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: TransfileError,
    },
}

fn is_end_marker(line: &str) -> bool {
    let line = line.trim_end();
    line == END_MARKER || line == LEGACY_END_MARKER
}

/// Parse strictly validated lines from raw transfile bytes
///
/// Bytes are split as ISO-8859-1, which never fails. A missing end marker is
/// reported before any line error so a file still being written can be
/// retried later.
pub fn parse_stream(bytes: &[u8]) -> Result<Vec<TransfileData>, StreamError> {
    let text = encoding::decode(bytes, Charset::Latin1);
    let lines: Vec<&str> = text.lines().collect();
    let Some(end) = lines.iter().position(|l| is_end_marker(l)) else {
        return Err(StreamError::UnexpectedEndOfFile);
    };

    let mut parsed = Vec::new();
    for (index, line) in lines[..end].iter().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let data = TransfileData::parse(line).map_err(|source| StreamError::InvalidLine {
            line: index + 1,
            source,
        })?;
        parsed.push(data);
    }
    Ok(parsed)
}

/// A transfile read from disk
#[derive(Debug, Clone)]
pub struct Transfile {
    path: PathBuf,
    name: String,
    raw: Vec<u8>,
    charset: Charset,
    content: String,
    lines: Vec<Line>,
    complete: bool,
    modified: SystemTime,
    cause: Option<String>,
}

impl Transfile {
    /// Read and parse the transfile at `path`
    pub fn open(path: &Path, fallback: Charset) -> std::io::Result<Self> {
        let raw = fs::read(path)?;
        let modified = fs::metadata(path)?.modified()?;
        Ok(Self::from_bytes(path.to_path_buf(), raw, fallback, modified))
    }

    pub fn from_bytes(path: PathBuf, raw: Vec<u8>, fallback: Charset, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let charset = encoding::detect_or(&raw, fallback);
        let content = encoding::decode(&raw, charset);

        let mut lines = Vec::new();
        let mut complete = false;
        let mut cause = None;
        for (index, text) in content.lines().enumerate() {
            // Leading whitespace is part of the first key and fails validation
            let text = text.trim_end();
            if is_end_marker(text) {
                complete = true;
                break;
            }
            if text.is_empty() {
                continue;
            }
            if cause.is_none() {
                if let Err(e) = TransfileData::parse_partial(text) {
                    cause = Some(invalid_line_cause(index + 1, &e));
                }
            }
            lines.push(Line::parse(text));
        }

        Self {
            path,
            name,
            raw,
            charset,
            content,
            lines,
            complete,
            modified,
            cause,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// The decoded text of the whole file
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Non-empty lines preceding the end marker
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Whether the file has any non-whitespace content at all
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// The first line validation failure, as operator text
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.cause.is_none()
    }

    /// Incomplete and untouched for at least `threshold`
    pub fn is_stalled(&self, now: SystemTime, threshold: Duration) -> bool {
        !self.complete
            && now
                .duration_since(self.modified)
                .is_ok_and(|age| age >= threshold)
    }
}

#[cfg(test)]
#[path = "transfile_tests.rs"]
mod tests;
