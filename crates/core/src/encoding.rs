// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Character set detection for transfile bytes
//!
//! Detection looks at byte-order marks first, then at zero-byte patterns that
//! betray BOM-less UTF-16/32, then at UTF-8 validity. Plain ASCII and invalid
//! UTF-8 produce no verdict; callers fall back to a configured single-byte
//! charset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Number of leading bytes inspected when sniffing
pub const SAMPLE_LEN: usize = 4096;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];

/// Character sets a transfile may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Charset {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
    /// ISO-8859-1
    Latin1,
    /// ISO-8859-9
    Latin5,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown charset: {0}")]
pub struct UnknownCharset(pub String);

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Utf16Be => "utf-16be",
            Charset::Utf16Le => "utf-16le",
            Charset::Utf32Be => "utf-32be",
            Charset::Utf32Le => "utf-32le",
            Charset::Latin1 => "iso-8859-1",
            Charset::Latin5 => "iso-8859-9",
        }
    }

    fn bom(&self) -> &'static [u8] {
        match self {
            Charset::Utf8 => BOM_UTF8,
            Charset::Utf16Be => BOM_UTF16_BE,
            Charset::Utf16Le => BOM_UTF16_LE,
            Charset::Utf32Be => BOM_UTF32_BE,
            Charset::Utf32Le => BOM_UTF32_LE,
            Charset::Latin1 | Charset::Latin5 => &[],
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = UnknownCharset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "utf8" => Ok(Charset::Utf8),
            "utf16be" => Ok(Charset::Utf16Be),
            "utf16le" => Ok(Charset::Utf16Le),
            "utf32be" => Ok(Charset::Utf32Be),
            "utf32le" => Ok(Charset::Utf32Le),
            "iso88591" | "latin1" => Ok(Charset::Latin1),
            "iso88599" | "latin5" => Ok(Charset::Latin5),
            _ => Err(UnknownCharset(s.to_string())),
        }
    }
}

impl TryFrom<String> for Charset {
    type Error = UnknownCharset;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Charset> for String {
    fn from(charset: Charset) -> Self {
        charset.name().to_string()
    }
}

/// Detect the charset of `bytes`, or `None` when no multi-byte signal exists
pub fn detect(bytes: &[u8]) -> Option<Charset> {
    let sample = &bytes[..bytes.len().min(SAMPLE_LEN)];

    // UTF-32LE's BOM starts with UTF-16LE's, so order matters
    for charset in [
        Charset::Utf32Le,
        Charset::Utf32Be,
        Charset::Utf8,
        Charset::Utf16Be,
        Charset::Utf16Le,
    ] {
        if sample.starts_with(charset.bom()) {
            return Some(charset);
        }
    }

    sniff_utf32(sample)
        .or_else(|| sniff_utf16(sample))
        .or_else(|| sniff_utf8(sample))
}

/// Detect the charset of `bytes`, using `fallback` when there is no verdict
pub fn detect_or(bytes: &[u8], fallback: Charset) -> Charset {
    detect(bytes).unwrap_or(fallback)
}

/// Detect the charset of a file, reading at most [`SAMPLE_LEN`] bytes
pub fn detect_file(path: &Path) -> std::io::Result<Option<Charset>> {
    let mut sample = Vec::with_capacity(SAMPLE_LEN);
    File::open(path)?
        .take(SAMPLE_LEN as u64)
        .read_to_end(&mut sample)?;
    Ok(detect(&sample))
}

fn sniff_utf32(sample: &[u8]) -> Option<Charset> {
    let quads = sample.chunks_exact(4);
    if sample.is_empty() || !quads.remainder().is_empty() {
        return None;
    }
    let count = quads.len();
    let be = sample
        .chunks_exact(4)
        .filter(|q| q[0] == 0 && q[1] == 0 && (q[2] != 0 || q[3] != 0))
        .count();
    let le = sample
        .chunks_exact(4)
        .filter(|q| q[3] == 0 && q[2] == 0 && (q[0] != 0 || q[1] != 0))
        .count();
    if be == count {
        Some(Charset::Utf32Be)
    } else if le == count {
        Some(Charset::Utf32Le)
    } else {
        None
    }
}

fn sniff_utf16(sample: &[u8]) -> Option<Charset> {
    let pairs = sample.len() / 2;
    if pairs == 0 {
        return None;
    }
    let even_zero = sample
        .chunks_exact(2)
        .filter(|p| p[0] == 0 && p[1] != 0)
        .count();
    let odd_zero = sample
        .chunks_exact(2)
        .filter(|p| p[1] == 0 && p[0] != 0)
        .count();

    let ratio = |n: usize| n as f64 / pairs as f64;
    if ratio(even_zero) > 0.4 && ratio(odd_zero) < 0.05 {
        Some(Charset::Utf16Be)
    } else if ratio(odd_zero) > 0.4 && ratio(even_zero) < 0.05 {
        Some(Charset::Utf16Le)
    } else {
        None
    }
}

fn sniff_utf8(sample: &[u8]) -> Option<Charset> {
    let valid = match std::str::from_utf8(sample) {
        Ok(_) => sample.len(),
        // A sequence cut off by the sample boundary is not evidence against UTF-8
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => return None,
    };
    sample[..valid]
        .iter()
        .any(|b| !b.is_ascii())
        .then_some(Charset::Utf8)
}

/// Decode `bytes` as `charset`, dropping a matching byte-order mark
pub fn decode(bytes: &[u8], charset: Charset) -> String {
    let bytes = bytes.strip_prefix(charset.bom()).unwrap_or(bytes);
    match charset {
        Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Charset::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        Charset::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
        Charset::Utf32Be => decode_utf32(bytes, u32::from_be_bytes),
        Charset::Utf32Le => decode_utf32(bytes, u32::from_le_bytes),
        Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        Charset::Latin5 => bytes.iter().map(|&b| latin5_char(b)).collect(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|p| unit([p[0], p[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks_exact(4)
        .map(|q| char::from_u32(unit([q[0], q[1], q[2], q[3]])).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// ISO-8859-9 differs from ISO-8859-1 in six code points
fn latin5_char(b: u8) -> char {
    match b {
        0xD0 => '\u{011E}',
        0xDD => '\u{0130}',
        0xDE => '\u{015E}',
        0xF0 => '\u{011F}',
        0xFD => '\u{0131}',
        0xFE => '\u{015F}',
        _ => char::from(b),
    }
}

#[cfg(test)]
#[path = "encoding_tests.rs"]
mod tests;
