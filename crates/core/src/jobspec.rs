// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping transfile lines to job specifications

use crate::transfile::Line;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value used for any attribute the transfile line leaves out
pub const MISSING_FIELD: &str = "missing";
/// Submitter used when the transfile name carries no library number
pub const MISSING_SUBMITTER: u64 = 0;
/// Address stamped on transfiles forwarded to the shadow directory
pub const INTERNAL_ADDRESS: &str = "datain-io@dbc.dk";

const INTERNAL_DOMAIN: &str = "@dbc.dk";
const DANBIB: &str = "danbib";
const DANBIB_PACKAGING: &str = "lin";
const DANBIB_CHARSET: &str = "latin-1";
const DATAFILE_URN_PREFIX: &str = "urn:dataio-fs:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Transient,
    Persistent,
    SuperTransient,
    Test,
    Acctest,
    Infomedia,
    Periodic,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Transient => "TRANSIENT",
            JobType::Persistent => "PERSISTENT",
            JobType::SuperTransient => "SUPER_TRANSIENT",
            JobType::Test => "TEST",
            JobType::Acctest => "ACCTEST",
            JobType::Infomedia => "INFOMEDIA",
            JobType::Periodic => "PERIODIC",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = JobSpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRANSIENT" => Ok(JobType::Transient),
            "PERSISTENT" => Ok(JobType::Persistent),
            "SUPER_TRANSIENT" => Ok(JobType::SuperTransient),
            "TEST" => Ok(JobType::Test),
            "ACCTEST" => Ok(JobType::Acctest),
            "INFOMEDIA" => Ok(JobType::Infomedia),
            "PERIODIC" => Ok(JobType::Periodic),
            other => Err(JobSpecificationError::InvalidJobType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobSpecificationError {
    #[error("transfile name must not be empty")]
    EmptyTransfileName,

    #[error("file store id must not be empty")]
    EmptyFileStoreId,

    #[error("invalid job type: {0}")]
    InvalidJobType(String),
}

/// Where a job came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ancestry {
    pub transfile: String,
    pub datafile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Raw transfile bytes
    pub details: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpecification {
    pub packaging: String,
    pub format: String,
    pub charset: String,
    pub destination: String,
    pub submitter_id: u64,
    pub mail_for_notification_about_verification: String,
    pub mail_for_notification_about_processing: String,
    pub result_mail_initials: String,
    pub data_file: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub ancestry: Ancestry,
}

/// Builds [`JobSpecification`]s, appending an operator copy address to
/// notification mails when one is configured
#[derive(Debug, Clone, Default)]
pub struct JobSpecificationMapper {
    cc_mail: Option<String>,
}

impl JobSpecificationMapper {
    pub fn new(cc_mail: Option<String>) -> Self {
        let cc_mail = cc_mail
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty() && m != INTERNAL_ADDRESS);
        Self { cc_mail }
    }

    /// Map `line` of `transfile_name` to a job specification
    ///
    /// `file_store_id` is [`MISSING_FIELD`] when no datafile was uploaded.
    pub fn map(
        &self,
        line: &Line,
        transfile_name: &str,
        file_store_id: &str,
        raw_transfile: &[u8],
    ) -> Result<JobSpecification, JobSpecificationError> {
        if transfile_name.is_empty() {
            return Err(JobSpecificationError::EmptyTransfileName);
        }
        if file_store_id.is_empty() {
            return Err(JobSpecificationError::EmptyFileStoreId);
        }

        let field = |key: &str| line.non_blank(key).unwrap_or(MISSING_FIELD).to_string();
        let destination = field("b");
        let danbib = destination == DANBIB;
        let packaging = match line.non_blank("t") {
            Some(t) => t.to_string(),
            None if danbib => DANBIB_PACKAGING.to_string(),
            None => MISSING_FIELD.to_string(),
        };
        let charset = match line.non_blank("c") {
            Some(c) => c.to_string(),
            None if danbib => DANBIB_CHARSET.to_string(),
            None => MISSING_FIELD.to_string(),
        };
        let job_type = match line.non_blank("j") {
            Some(j) => j.parse()?,
            None => JobType::Persistent,
        };

        let datafile = line.non_blank("f");
        let data_file = match datafile {
            Some(_) if file_store_id != MISSING_FIELD => {
                format!("{}{}", DATAFILE_URN_PREFIX, file_store_id)
            }
            _ => MISSING_FIELD.to_string(),
        };

        Ok(JobSpecification {
            packaging,
            format: field("o"),
            charset,
            destination,
            submitter_id: submitter_number(transfile_name),
            mail_for_notification_about_verification: self.with_cc(field("m")),
            mail_for_notification_about_processing: self.with_cc(field("M")),
            result_mail_initials: field("i"),
            data_file,
            job_type,
            ancestry: Ancestry {
                transfile: transfile_name.to_string(),
                datafile: datafile.unwrap_or(MISSING_FIELD).to_string(),
                batch_id: datafile.and_then(batch_id),
                details: raw_transfile.to_vec(),
            },
        })
    }

    fn with_cc(&self, address: String) -> String {
        match &self.cc_mail {
            Some(cc) if address != MISSING_FIELD && !is_internal(&address) => {
                format!("{};{}", address, cc)
            }
            _ => address,
        }
    }
}

fn is_internal(address: &str) -> bool {
    address.to_ascii_lowercase().ends_with(INTERNAL_DOMAIN)
}

/// Library number prefix of a transfile name such as `123456.trans`
pub fn submitter_number(transfile_name: &str) -> u64 {
    transfile_name
        .split_once('.')
        .map(|(prefix, _)| prefix)
        .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|p| p.parse().ok())
        .unwrap_or(MISSING_SUBMITTER)
}

/// Second segment of a datafile name with at least three segments
fn batch_id(datafile: &str) -> Option<String> {
    let segments: Vec<&str> = datafile.split('.').collect();
    (segments.len() >= 3).then(|| segments[1].to_string())
}

#[cfg(test)]
#[path = "jobspec_tests.rs"]
mod tests;
