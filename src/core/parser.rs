//! Tab-separated input parsing.
//!
//! Both input files start with a header line that is discarded. Fields are
//! taken literally (no quoting); blank lines are skipped and extra trailing
//! fields are ignored.

use crate::domain::model::{NewCustomer, StagedOrder};
use crate::utils::error::{OrderImportError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_TIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y"];

/// 將位元組轉為 UTF-8 文字並移除 BOM
pub fn decode(file: &str, bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|_| OrderImportError::EncodingError {
        path: file.to_string(),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Reads data rows with at least `min_fields` fields, paired with their
/// 1-based line numbers.
pub fn read_rows(file: &str, text: &str, min_fields: usize) -> Result<Vec<(u64, StringRecord)>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < min_fields {
            return Err(OrderImportError::parse(
                file,
                line,
                format!("expected {} tab-separated fields, found {}", min_fields, record.len()),
            ));
        }
        rows.push((line, record));
    }
    Ok(rows)
}

pub fn parse_decimal(value: &str) -> std::result::Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("'{}' is not a decimal number: {}", value, e))
}

pub fn parse_integer(value: &str) -> std::result::Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("'{}' is not an integer: {}", value, e))
}

/// 一般日期解析：RFC 3339、常見日期時間格式，最後是僅日期（午夜）
pub fn parse_date_time(value: &str) -> std::result::Result<NaiveDateTime, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("'{}' is not a recognized date/time", value))
}

fn locate(file: &str, line: u64) -> impl Fn(OrderImportError) -> OrderImportError + '_ {
    move |err| match err {
        OrderImportError::ConstraintViolation { message } => {
            OrderImportError::constraint(format!("{} line {}: {}", file, line, message))
        }
        other => other,
    }
}

/// Customer line: `name<TAB>creditLimit`.
pub fn parse_customers(file: &str, text: &str) -> Result<Vec<NewCustomer>> {
    read_rows(file, text, 2)?
        .into_iter()
        .map(|(line, record)| {
            let credit_limit =
                parse_decimal(&record[1]).map_err(|m| OrderImportError::parse(file, line, m))?;
            NewCustomer::new(&record[0], credit_limit).map_err(locate(file, line))
        })
        .collect()
}

/// Order line: `customerName<TAB>orderDate<TAB>orderValue`.
pub fn parse_orders(file: &str, text: &str) -> Result<Vec<StagedOrder>> {
    read_rows(file, text, 3)?
        .into_iter()
        .map(|(line, record)| {
            let order_date =
                parse_date_time(&record[1]).map_err(|m| OrderImportError::parse(file, line, m))?;
            let order_value =
                parse_integer(&record[2]).map_err(|m| OrderImportError::parse(file, line, m))?;
            Ok(StagedOrder {
                customer_name: record[0].to_string(),
                order_date,
                order_value: Decimal::from(order_value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_parse_customers_skips_header() {
        let text = "Name\tCreditLimit\nAlice\t1000.00\nBob\t250\n";
        let customers = parse_customers("customers.tsv", text).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name(), "Alice");
        assert_eq!(customers[0].credit_limit(), dec!(1000.00));
        assert_eq!(customers[1].credit_limit().to_string(), "250.00");
    }

    #[test]
    fn test_parse_customers_header_only() {
        assert!(parse_customers("customers.tsv", "Name\tCreditLimit\n")
            .unwrap()
            .is_empty());
        assert!(parse_customers("customers.tsv", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_handles_crlf_and_blank_lines() {
        let text = "Name\tCreditLimit\r\nAlice\t10\r\n\r\nBob\t20\r\n";
        let customers = parse_customers("customers.tsv", text).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[1].name(), "Bob");
    }

    #[test]
    fn test_parse_keeps_quotes_literal() {
        let text = "Name\tCreditLimit\n\"Acme\" Ltd\t10\n";
        let customers = parse_customers("customers.tsv", text).unwrap();
        assert_eq!(customers[0].name(), "\"Acme\" Ltd");
    }

    #[test]
    fn test_parse_customers_reports_line() {
        let text = "Name\tCreditLimit\nAlice\t10\nBob\tlots\n";
        let err = parse_customers("customers.tsv", text).unwrap_err();
        match err {
            OrderImportError::ParseError { file, line, .. } => {
                assert_eq!(file, "customers.tsv");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_customers_missing_field() {
        let err = parse_customers("customers.tsv", "Name\tCreditLimit\nAlice\n").unwrap_err();
        assert!(matches!(err, OrderImportError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_parse_customers_constraint_has_location() {
        let text = format!("Name\tCreditLimit\n{}\t10\n", "x".repeat(101));
        let err = parse_customers("customers.tsv", &text).unwrap_err();
        match err {
            OrderImportError::ConstraintViolation { message } => {
                assert!(message.starts_with("customers.tsv line 2:"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_orders() {
        let text = "Customer\tDate\tValue\nAlice\t2024-01-31\t150\nBob\t2024-02-01 13:45:00\t-5\tnote\n";
        let orders = parse_orders("orders.tsv", text).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].customer_name, "Alice");
        assert_eq!(orders[0].order_value, dec!(150));
        assert_eq!(orders[0].order_date.to_string(), "2024-01-31 00:00:00");
        assert_eq!(orders[1].order_value, dec!(-5));
    }

    #[test]
    fn test_parse_orders_rejects_fractional_value() {
        let text = "Customer\tDate\tValue\nAlice\t2024-01-31\t1.5\n";
        assert!(matches!(
            parse_orders("orders.tsv", text),
            Err(OrderImportError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_date_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_date_time("2024-01-31T10:30:00").unwrap(), expected);
        assert_eq!(parse_date_time("2024-01-31 10:30").unwrap(), expected);
        assert_eq!(parse_date_time("01/31/2024 10:30:00").unwrap(), expected);
        assert_eq!(parse_date_time("2024-01-31T12:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_date_time(" 2024-01-31T10:30:00Z ").unwrap(), expected);

        let midnight = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date_time("31 January 2024").unwrap(), midnight);
        assert_eq!(parse_date_time("January 31, 2024").unwrap(), midnight);
        assert_eq!(parse_date_time("2024/01/31").unwrap(), midnight);
    }

    #[test]
    fn test_parse_scalars() {
        assert_ok!(parse_decimal(" 12.50 "));
        assert_err!(parse_decimal("12,50"));
        assert_ok!(parse_integer("42"));
        assert_err!(parse_integer("3000000000"));
        assert_err!(parse_date_time("yesterday"));
    }

    #[test]
    fn test_decode_strips_bom() {
        let text = decode("c.tsv", b"\xef\xbb\xbfName\tCreditLimit\n".to_vec()).unwrap();
        assert!(text.starts_with("Name"));
        assert!(matches!(
            decode("c.tsv", vec![0xff, 0xfe]),
            Err(OrderImportError::EncodingError { .. })
        ));
    }
}
