use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Decimal128Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::app::ports::ObjectStorePort;
use crate::constants::{DATASET_CONTAINER, DATASET_PREFIX};
use crate::domain::{SettlementRecord, StoreLocation};
use crate::error::Result;

// Amount columns share one fixed scale, wide enough for settlement amounts
// and exchange rates.
const DECIMAL_PRECISION: u8 = 38;
const DECIMAL_SCALE: i8 = 10;

// Days between 0001-01-01 (chrono's CE epoch) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn dataset_schema() -> Arc<Schema> {
    let decimal = DataType::Decimal128(DECIMAL_PRECISION, DECIMAL_SCALE);
    let utc_ts = DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()));
    let naive_ts = DataType::Timestamp(TimeUnit::Microsecond, None);
    Arc::new(Schema::new(vec![
        Field::new("merchant_account", DataType::Utf8, true),
        Field::new("psp_reference", DataType::Utf8, false),
        Field::new("payment_method", DataType::Utf8, true),
        Field::new("creation_date_utc", utc_ts.clone(), false),
        Field::new("creation_date", naive_ts.clone(), false),
        Field::new("gross_currency", DataType::Utf8, true),
        Field::new("gross_amount", decimal.clone(), false),
        Field::new("exchange_rate", decimal.clone(), false),
        Field::new("net_currency", DataType::Utf8, true),
        Field::new("net_amount", decimal.clone(), false),
        Field::new("commission", decimal.clone(), false),
        Field::new("markup", decimal.clone(), false),
        Field::new("scheme_fees", decimal.clone(), false),
        Field::new("interchange", decimal.clone(), false),
        Field::new("dcc_markup", decimal.clone(), false),
        Field::new("advanced", decimal.clone(), false),
        Field::new("total_charges", decimal.clone(), false),
        Field::new("type", DataType::Utf8, true),
        Field::new("batch_number", DataType::Utf8, true),
        Field::new("booking_date_utc", utc_ts, false),
        Field::new("booking_date", naive_ts, false),
        Field::new("settled_date", DataType::Date32, false),
    ]))
}

/// Buffers canonical rows per settlement date, then appends one part file
/// per partition through the object store.
///
/// Append-only contract: part files get fresh names, so repeating the same
/// append adds rows without touching existing partition data. De-duplication
/// is the ledger's job, not the writer's.
pub struct PartitionedWriter {
    batches: BTreeMap<NaiveDate, Vec<SettlementRecord>>,
}

impl PartitionedWriter {
    pub fn new() -> Self {
        Self {
            batches: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, record: SettlementRecord) {
        self.batches
            .entry(record.settled_date)
            .or_default()
            .push(record);
    }

    /// Encodes and appends every buffered partition, returning the distinct
    /// partition dates touched.
    pub async fn flush(self, store: &dyn ObjectStorePort) -> Result<Vec<NaiveDate>> {
        let schema = dataset_schema();
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut touched = Vec::new();
        for (day, records) in self.batches {
            let batch = build_batch(schema.clone(), &records)?;
            let mut buf = Vec::new();
            let mut writer = ArrowWriter::try_new(&mut buf, schema.clone(), Some(props.clone()))?;
            writer.write(&batch)?;
            writer.close()?;

            let key = format!(
                "{}/settled_date={}/part-{}.parquet",
                DATASET_PREFIX,
                day,
                Uuid::new_v4()
            );
            store
                .put(&StoreLocation::new(DATASET_CONTAINER, key), &buf)
                .await?;
            touched.push(day);
        }
        Ok(touched)
    }
}

impl Default for PartitionedWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn scaled_mantissa(value: Decimal) -> i128 {
    let mut value = value;
    value.rescale(DECIMAL_SCALE as u32);
    value.mantissa()
}

fn decimal_array(values: impl Iterator<Item = Decimal>) -> Result<Decimal128Array> {
    Ok(
        Decimal128Array::from(values.map(scaled_mantissa).collect::<Vec<_>>())
            .with_precision_and_scale(DECIMAL_PRECISION, DECIMAL_SCALE)?,
    )
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn build_batch(schema: Arc<Schema>, records: &[SettlementRecord]) -> Result<RecordBatch> {
    let merchant_account = StringArray::from(
        records
            .iter()
            .map(|r| r.merchant_account.as_deref())
            .collect::<Vec<_>>(),
    );
    let psp_reference = StringArray::from(
        records
            .iter()
            .map(|r| r.psp_reference.as_deref())
            .collect::<Vec<_>>(),
    );
    let payment_method = StringArray::from(
        records
            .iter()
            .map(|r| r.payment_method.as_deref())
            .collect::<Vec<_>>(),
    );
    let creation_date_utc = TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.creation_date_utc.timestamp_micros())
            .collect::<Vec<_>>(),
    )
    .with_timezone("UTC");
    let creation_date = TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.creation_date.and_utc().timestamp_micros())
            .collect::<Vec<_>>(),
    );
    let gross_currency = StringArray::from(
        records
            .iter()
            .map(|r| r.gross_currency.as_deref())
            .collect::<Vec<_>>(),
    );
    let gross_amount = decimal_array(records.iter().map(|r| r.gross_amount))?;
    let exchange_rate = decimal_array(records.iter().map(|r| r.exchange_rate))?;
    let net_currency = StringArray::from(
        records
            .iter()
            .map(|r| r.net_currency.as_deref())
            .collect::<Vec<_>>(),
    );
    let net_amount = decimal_array(records.iter().map(|r| r.net_amount))?;
    let commission = decimal_array(records.iter().map(|r| r.commission))?;
    let markup = decimal_array(records.iter().map(|r| r.markup))?;
    let scheme_fees = decimal_array(records.iter().map(|r| r.scheme_fees))?;
    let interchange = decimal_array(records.iter().map(|r| r.interchange))?;
    let dcc_markup = decimal_array(records.iter().map(|r| r.dcc_markup))?;
    let advanced = decimal_array(records.iter().map(|r| r.advanced))?;
    let total_charges = decimal_array(records.iter().map(|r| r.total_charges))?;
    let record_type = StringArray::from(
        records
            .iter()
            .map(|r| r.record_type.as_deref())
            .collect::<Vec<_>>(),
    );
    let batch_number = StringArray::from(
        records
            .iter()
            .map(|r| r.batch_number.as_deref())
            .collect::<Vec<_>>(),
    );
    let booking_date_utc = TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.booking_date_utc.timestamp_micros())
            .collect::<Vec<_>>(),
    )
    .with_timezone("UTC");
    let booking_date = TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.booking_date.and_utc().timestamp_micros())
            .collect::<Vec<_>>(),
    );
    let settled_date = Date32Array::from(
        records
            .iter()
            .map(|r| days_since_epoch(r.settled_date))
            .collect::<Vec<_>>(),
    );

    let columns: Vec<ArrayRef> = vec![
        Arc::new(merchant_account),
        Arc::new(psp_reference),
        Arc::new(payment_method),
        Arc::new(creation_date_utc),
        Arc::new(creation_date),
        Arc::new(gross_currency),
        Arc::new(gross_amount),
        Arc::new(exchange_rate),
        Arc::new(net_currency),
        Arc::new(net_amount),
        Arc::new(commission),
        Arc::new(markup),
        Arc::new(scheme_fees),
        Arc::new(interchange),
        Arc::new(dcc_markup),
        Arc::new(advanced),
        Arc::new(total_charges),
        Arc::new(record_type),
        Arc::new(batch_number),
        Arc::new(booking_date_utc),
        Arc::new(booking_date),
        Arc::new(settled_date),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}
