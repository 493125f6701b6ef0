// Domain data shapes shared across layers

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

/// Canonical column order of the output dataset. The transformer projects
/// every surviving row onto exactly this set, in this order.
pub const FINAL_COLUMNS: [&str; 22] = [
    "merchant_account",
    "psp_reference",
    "payment_method",
    "creation_date_utc",
    "creation_date",
    "gross_currency",
    "gross_amount",
    "exchange_rate",
    "net_currency",
    "net_amount",
    "commission",
    "markup",
    "scheme_fees",
    "interchange",
    "dcc_markup",
    "advanced",
    "total_charges",
    "type",
    "batch_number",
    "booking_date_utc",
    "booking_date",
    "settled_date",
];

/// Location of one object within the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub container: String,
    pub key: String,
}

impl StoreLocation {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// One file-arrival event, decoded from the transport envelope. The transport
/// is at-least-once: the same underlying file may be delivered again.
#[derive(Debug, Clone)]
pub struct Notification {
    pub location: StoreLocation,
    pub content_token: String,
}

/// One settlement row in the canonical schema.
///
/// String fields are `None` when the source cell was empty. `psp_reference`
/// is guaranteed present only after the transformer's filter; the six charge
/// fields and the other amounts default to zero when the source cell was
/// missing or malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRecord {
    pub merchant_account: Option<String>,
    pub psp_reference: Option<String>,
    pub payment_method: Option<String>,
    pub creation_date_utc: DateTime<Utc>,
    pub creation_date: NaiveDateTime,
    pub gross_currency: Option<String>,
    pub gross_amount: Decimal,
    pub exchange_rate: Decimal,
    pub net_currency: Option<String>,
    pub net_amount: Decimal,
    pub commission: Decimal,
    pub markup: Decimal,
    pub scheme_fees: Decimal,
    pub interchange: Decimal,
    pub dcc_markup: Decimal,
    pub advanced: Decimal,
    pub total_charges: Decimal,
    pub record_type: Option<String>,
    pub batch_number: Option<String>,
    pub booking_date_utc: DateTime<Utc>,
    pub booking_date: NaiveDateTime,
    pub settled_date: NaiveDate,
}

/// Terminal status of one handled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Done,
    SkippedDuplicate,
}

/// Structured outcome emitted once per handled notification. Used for
/// observability only; never persisted as durable state.
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub source: String,
    pub content_token: String,
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub partitions: BTreeSet<NaiveDate>,
    pub status: OutcomeStatus,
}

impl IngestionOutcome {
    /// Outcome for a notification whose content token was already marked.
    pub fn skipped(location: &StoreLocation, content_token: String) -> Self {
        Self {
            source: location.to_string(),
            content_token,
            rows_read: 0,
            rows_written: 0,
            rows_dropped: 0,
            partitions: BTreeSet::new(),
            status: OutcomeStatus::SkippedDuplicate,
        }
    }
}
