use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::domain::SettlementRecord;
use crate::error::{IngestError, Result};

/// Resolved positions of every required source column within one report's
/// header row. Reports are homogeneous: resolution happens once per file,
/// before any row is read.
pub struct SchemaMapper {
    merchant_account: usize,
    psp_reference: usize,
    payment_method: usize,
    creation_date_utc: usize,
    creation_date: usize,
    gross_currency: usize,
    gross_amount: usize,
    exchange_rate: usize,
    net_currency: usize,
    net_amount: usize,
    commission: usize,
    markup: usize,
    scheme_fees: usize,
    interchange: usize,
    dcc_markup: usize,
    advanced: usize,
    record_type: usize,
    batch_number: usize,
    booking_date_utc: usize,
    booking_date: usize,
}

impl SchemaMapper {
    /// Maps the processor's column vocabulary onto the canonical schema.
    /// Every canonical field must resolve; a missing source column means the
    /// report is malformed and the whole file is rejected.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let col = |name: &'static str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(IngestError::MissingColumn(name))
        };
        Ok(Self {
            merchant_account: col("Merchant Account")?,
            psp_reference: col("Psp Reference")?,
            payment_method: col("Payment Method")?,
            creation_date_utc: col("Creation Date")?,
            creation_date: col("Creation Date (AMS)")?,
            gross_currency: col("Gross Currency")?,
            gross_amount: col("Gross Debit (GC)")?,
            exchange_rate: col("Exchange Rate")?,
            net_currency: col("Net Currency")?,
            net_amount: col("Net Credit (NC)")?,
            commission: col("Commission (NC)")?,
            markup: col("Markup (NC)")?,
            scheme_fees: col("Scheme Fees (NC)")?,
            interchange: col("Interchange (NC)")?,
            dcc_markup: col("DCC Markup (NC)")?,
            advanced: col("Advanced (NC)")?,
            record_type: col("Type")?,
            batch_number: col("Batch Number")?,
            booking_date_utc: col("Booking Date")?,
            booking_date: col("Booking Date (AMS)")?,
        })
    }

    /// Maps one raw report row onto the canonical schema. Columns outside
    /// the mapping are dropped by construction. Timestamp failures reject
    /// the file; amount failures coerce to zero.
    pub fn canonicalize(&self, row: &StringRecord) -> Result<SettlementRecord> {
        let booking_date = parse_naive("Booking Date (AMS)", field(row, self.booking_date))?;
        Ok(SettlementRecord {
            merchant_account: non_empty(field(row, self.merchant_account)),
            psp_reference: non_empty(field(row, self.psp_reference)),
            payment_method: non_empty(field(row, self.payment_method)),
            creation_date_utc: parse_utc("Creation Date", field(row, self.creation_date_utc))?,
            creation_date: parse_naive("Creation Date (AMS)", field(row, self.creation_date))?,
            gross_currency: non_empty(field(row, self.gross_currency)),
            gross_amount: coerce_decimal(field(row, self.gross_amount)),
            exchange_rate: coerce_decimal(field(row, self.exchange_rate)),
            net_currency: non_empty(field(row, self.net_currency)),
            net_amount: coerce_decimal(field(row, self.net_amount)),
            commission: coerce_decimal(field(row, self.commission)),
            markup: coerce_decimal(field(row, self.markup)),
            scheme_fees: coerce_decimal(field(row, self.scheme_fees)),
            interchange: coerce_decimal(field(row, self.interchange)),
            dcc_markup: coerce_decimal(field(row, self.dcc_markup)),
            advanced: coerce_decimal(field(row, self.advanced)),
            total_charges: Decimal::ZERO,
            record_type: non_empty(field(row, self.record_type)),
            batch_number: non_empty(field(row, self.batch_number)),
            booking_date_utc: parse_utc("Booking Date", field(row, self.booking_date_utc))?,
            booking_date,
            // Partitioning follows the business-local booking date, not UTC
            settled_date: booking_date.date(),
        })
    }
}

fn field<'a>(row: &'a StringRecord, index: usize) -> &'a str {
    row.get(index).unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Malformed or missing amount cells coerce to zero; one bad cell never
/// aborts a file.
fn coerce_decimal(value: &str) -> Decimal {
    value.trim().parse().unwrap_or(Decimal::ZERO)
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// UTC policy: offset-bearing forms are normalized to UTC; bare timestamps
/// are taken as already-UTC.
fn parse_utc(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_naive(column, value).map(|naive| naive.and_utc())
}

/// Naive policy: wall-clock timestamps kept as-is, no zone normalization.
fn parse_naive(column: &'static str, value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(IngestError::Timestamp {
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headers() -> StringRecord {
        StringRecord::from(vec![
            "Company Account",
            "Merchant Account",
            "Psp Reference",
            "Payment Method",
            "Creation Date",
            "Creation Date (AMS)",
            "Gross Currency",
            "Gross Debit (GC)",
            "Exchange Rate",
            "Net Currency",
            "Net Credit (NC)",
            "Commission (NC)",
            "Markup (NC)",
            "Scheme Fees (NC)",
            "Interchange (NC)",
            "DCC Markup (NC)",
            "Advanced (NC)",
            "Type",
            "Batch Number",
            "Booking Date",
            "Booking Date (AMS)",
        ])
    }

    fn row(psp: &str, commission: &str, markup: &str) -> StringRecord {
        StringRecord::from(vec![
            "AcmeGroup",
            "AcmeCOM",
            psp,
            "visa",
            "2025-03-01 10:00:00",
            "2025-03-01 11:00:00",
            "EUR",
            "120.00",
            "1.0837",
            "EUR",
            "117.25",
            commission,
            markup,
            "",
            "0",
            "",
            "0",
            "Settled",
            "118",
            "2025-03-03 06:00:00",
            "2025-03-03 07:30:00",
        ])
    }

    #[test]
    fn missing_column_rejects_the_file() {
        let mut partial = StringRecord::new();
        for h in headers().iter().filter(|h| *h != "Batch Number") {
            partial.push_field(h);
        }
        match SchemaMapper::from_headers(&partial) {
            Err(IngestError::MissingColumn(name)) => assert_eq!(name, "Batch Number"),
            other => panic!("expected MissingColumn, got {:?}", other.is_ok()),
        }
    }

    #[test]
    fn unmapped_source_columns_are_dropped() {
        // "Company Account" is not part of the canonical schema; resolution
        // simply never references it.
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let record = mapper.canonicalize(&row("PSP1", "0.10", "0.20")).unwrap();
        assert_eq!(record.merchant_account.as_deref(), Some("AcmeCOM"));
    }

    #[test]
    fn amounts_coerce_to_zero_when_malformed() {
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let record = mapper.canonicalize(&row("PSP1", "abc", "1.5")).unwrap();
        assert_eq!(record.commission, Decimal::ZERO);
        assert_eq!(record.markup, "1.5".parse().unwrap());
        // Empty cells coerce the same way
        assert_eq!(record.scheme_fees, Decimal::ZERO);
    }

    #[test]
    fn utc_fields_normalize_offsets() {
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let mut shifted = StringRecord::new();
        for (i, v) in row("PSP1", "0", "0").iter().enumerate() {
            shifted.push_field(if i == 4 { "2025-03-01T12:00:00+02:00" } else { v });
        }
        let record = mapper.canonicalize(&shifted).unwrap();
        assert_eq!(
            record.creation_date_utc,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn naive_fields_keep_wall_clock_time() {
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let record = mapper.canonicalize(&row("PSP1", "0", "0")).unwrap();
        assert_eq!(
            record.booking_date,
            NaiveDate::from_ymd_opt(2025, 3, 3)
                .unwrap()
                .and_hms_opt(7, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn settled_date_is_the_booking_date_calendar_day() {
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let record = mapper.canonicalize(&row("PSP1", "0", "0")).unwrap();
        assert_eq!(record.settled_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(record.settled_date, record.booking_date.date());
    }

    #[test]
    fn unparseable_utc_timestamp_rejects_the_file() {
        let mapper = SchemaMapper::from_headers(&headers()).unwrap();
        let mut bad = StringRecord::new();
        for (i, v) in row("PSP1", "0", "0").iter().enumerate() {
            bad.push_field(if i == 4 { "not-a-date" } else { v });
        }
        match mapper.canonicalize(&bad) {
            Err(IngestError::Timestamp { column, .. }) => assert_eq!(column, "Creation Date"),
            other => panic!("expected Timestamp error, got {:?}", other.is_ok()),
        }
    }
}
