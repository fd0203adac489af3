//! CSV row parsing and validation
//!
//! Headers are matched by exact name to `name`, `email` and `age`. Extra
//! columns are ignored and rows may have differing lengths.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::models::NewUser;

/// Byte-order mark some spreadsheet exports put in front of the first header
const BOM: char = '\u{feff}';

/// What happened to a single CSV row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDisposition {
    Accepted(NewUser),
    /// Column absent from the header, or empty in this row
    MissingField { line: u64, field: &'static str },
    InvalidAge { line: u64, value: String },
    /// The record itself could not be decoded (e.g. invalid UTF-8)
    Unreadable { line: u64, reason: String },
}

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    email: Option<usize>,
    age: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let header = if idx == 0 {
                header.trim_start_matches(BOM)
            } else {
                header
            };
            match header {
                "name" => columns.name = Some(idx),
                "email" => columns.email = Some(idx),
                "age" => columns.age = Some(idx),
                _ => {}
            }
        }
        columns
    }

    fn classify(&self, record: &StringRecord, line: u64) -> RowDisposition {
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).filter(|v| !v.is_empty());

        let Some(name) = field(self.name) else {
            return RowDisposition::MissingField { line, field: "name" };
        };
        let Some(email) = field(self.email) else {
            return RowDisposition::MissingField { line, field: "email" };
        };
        let Some(age) = field(self.age) else {
            return RowDisposition::MissingField { line, field: "age" };
        };

        match leading_integer(age) {
            Some(age) => RowDisposition::Accepted(NewUser::new(name, email, age)),
            None => RowDisposition::InvalidAge {
                line,
                value: age.to_owned(),
            },
        }
    }
}

/// Integer prefix of `value`: optional sign then digits, after leading
/// whitespace. Anything after the digits is ignored (`"30.0"` is 30).
fn leading_integer(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let unsigned = value.trim_start_matches(['+', '-']);
    let sign_len = value.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }

    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }

    value[..sign_len + digits].parse().ok()
}

/// Parse every record of a CSV stream into a disposition.
///
/// Only header and I/O failures are errors; a bad record becomes
/// [`RowDisposition::Unreadable`] and parsing continues.
pub fn parse_users<R: Read>(reader: R) -> Result<Vec<RowDisposition>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(rdr.headers()?);
    let mut rows = Vec::new();

    for result in rdr.records() {
        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                rows.push(columns.classify(&record, line));
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                rows.push(RowDisposition::Unreadable {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<RowDisposition> {
        parse_users(input.as_bytes()).expect("parse failed")
    }

    #[test]
    fn drops_rows_with_missing_fields_or_bad_age() {
        let rows = parse("name,email,age\nAna,ana@x.com,30\nBob,,x\nCid,cid@x.com,41\n");

        assert_eq!(
            rows,
            vec![
                RowDisposition::Accepted(NewUser::new("Ana", "ana@x.com", 30)),
                RowDisposition::MissingField { line: 3, field: "email" },
                RowDisposition::Accepted(NewUser::new("Cid", "cid@x.com", 41)),
            ]
        );
    }

    #[test]
    fn strips_bom_from_first_header() {
        let rows = parse("\u{feff}name,email,age\nAna,ana@x.com,30\n");
        assert_eq!(rows, vec![RowDisposition::Accepted(NewUser::new("Ana", "ana@x.com", 30))]);
    }

    #[test]
    fn headers_match_by_name_not_position() {
        let rows = parse("age,notes,email,name\n30,hello,ana@x.com,Ana\n");
        assert_eq!(rows, vec![RowDisposition::Accepted(NewUser::new("Ana", "ana@x.com", 30))]);
    }

    #[test]
    fn headers_are_case_sensitive() {
        let rows = parse("Name,email,age\nAna,ana@x.com,30\n");
        assert_eq!(rows, vec![RowDisposition::MissingField { line: 2, field: "name" }]);
    }

    #[test]
    fn age_uses_leading_integer() {
        let rows = parse(
            "name,email,age\nA,a@x.com, 42 \nB,b@x.com,4.5\nC,c@x.com,30abc\nD,d@x.com,30.0\nE,e@x.com,-7\n",
        );

        let ages: Vec<i32> = rows
            .iter()
            .map(|row| match row {
                RowDisposition::Accepted(user) => user.age,
                other => panic!("unexpected row: {other:?}"),
            })
            .collect();
        assert_eq!(ages, vec![42, 4, 30, 30, -7]);
    }

    #[test]
    fn age_without_leading_digits_is_invalid() {
        let rows = parse(
            "name,email,age\nA,a@x.com,old\nB,b@x.com,.5\nC,c@x.com,--3\nD,d@x.com,-\nE,e@x.com,99999999999\n",
        );

        assert_eq!(
            rows,
            vec![
                RowDisposition::InvalidAge { line: 2, value: "old".into() },
                RowDisposition::InvalidAge { line: 3, value: ".5".into() },
                RowDisposition::InvalidAge { line: 4, value: "--3".into() },
                RowDisposition::InvalidAge { line: 5, value: "-".into() },
                RowDisposition::InvalidAge { line: 6, value: "99999999999".into() },
            ]
        );
    }

    #[test]
    fn short_rows_are_missing_fields() {
        let rows = parse("name,email,age\nAna,ana@x.com\n");
        assert_eq!(rows, vec![RowDisposition::MissingField { line: 2, field: "age" }]);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(parse("name,email,age\n").is_empty());
        assert!(parse("").is_empty());
    }
}
