// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[test]
fn empty_line_has_no_fields() {
    let data = TransfileData::parse("").unwrap();
    assert!(data.is_empty());
    assert_eq!(data.destination(), None);
}

#[test]
fn parses_full_line() {
    let line = "b=danbib,f=123456.file,t=lin,o=marc2,c=latin-1,m=a@b.dk,M=c@d.dk,i=ABC,j=TEST";
    let data = TransfileData::parse(line).unwrap();
    assert_eq!(data.destination(), Some("danbib"));
    assert_eq!(data.datafile(), Some("123456.file"));
    assert_eq!(data.field(FieldKey::Charset), Some("latin-1"));
    assert_eq!(data.job_type(), Some(JobType::Test));
    assert_eq!(data.fields().len(), 9);
    assert_eq!(data.to_string(), line);
}

#[parameterized(
    leading_comma = { ",b=danbib,f=123456.file", 0 },
    interior_comma = { "b=danbib,,f=123456.file", 1 },
    trailing_comma = { "b=danbib,f=123456.file,", 2 },
)]
fn rejects_empty_segments(line: &str, expected: usize) {
    assert_eq!(
        TransfileData::parse(line),
        Err(TransfileError::EmptySegment { position: expected })
    );
}

#[test]
fn rejects_duplicate_keys() {
    assert_eq!(
        TransfileData::parse("b=danbib,f=123456.file,f=123456.other"),
        Err(TransfileError::DuplicateKey(FieldKey::Datafile))
    );
}

#[test]
fn destination_must_come_first() {
    assert_eq!(
        TransfileData::parse("f=123456.file,b=danbib"),
        Err(TransfileError::DestinationNotFirst)
    );
    assert_eq!(
        TransfileData::parse("f=123456.file,t=lin"),
        Err(TransfileError::MissingDestination)
    );
}

#[test]
fn strict_mode_requires_datafile() {
    assert_eq!(
        TransfileData::parse("b=danbib,t=lin"),
        Err(TransfileError::MissingDatafile)
    );
}

#[test]
fn partial_mode_tolerates_missing_datafile() {
    let data = TransfileData::parse_partial("b=danbib,t=lin").unwrap();
    assert_eq!(data.datafile(), None);
    assert!(TransfileData::parse_partial("t=lin,b=danbib").is_err());
}

proptest! {
    #[test]
    fn destination_not_first_always_fails(
        dest in "[a-z][a-z0-9]{0,8}",
        lib in "[0-9]{6}",
        proto in "[a-z]{1,5}",
    ) {
        let line = format!("t={},b={},f={}.file", proto, dest, lib);
        prop_assert!(TransfileData::parse(&line).is_err());
        prop_assert!(TransfileData::parse_partial(&line).is_err());
    }

    #[test]
    fn well_formed_lines_parse(
        dest in "[a-z][a-z0-9-]{0,8}",
        lib in "[0-9]{6}",
        rest in "[A-Za-z0-9._-]{0,12}",
    ) {
        prop_assume!(dest != "xxx");
        let line = format!("b={},f={}.{}", dest, lib, rest);
        let data = TransfileData::parse(&line).unwrap();
        let expected = format!("{}.{}", lib, rest);
        prop_assert_eq!(data.destination(), Some(dest.as_str()));
        prop_assert_eq!(data.datafile(), Some(expected.as_str()));
    }
}
