use std::sync::Arc;
use std::time::Instant;

use csv::ReaderBuilder;
use tracing::{error, info, warn};

use crate::app::ports::ObjectStorePort;
use crate::domain::{IngestionOutcome, Notification, OutcomeStatus};
use crate::error::Result;
use crate::infra::ledger::MarkerLedger;
use crate::observability::metrics::ingest;
use crate::pipeline::ingestion::envelope;
use crate::pipeline::parquet_out::PartitionedWriter;
use crate::pipeline::processing::normalize::SchemaMapper;
use crate::pipeline::processing::transform::Transformer;

/// Drives one notification through the full pipeline: dedup check, fetch,
/// normalize, transform, partitioned append, ledger mark.
///
/// All client handles are owned here and passed in at construction; there is
/// no shared in-process state across notifications, so any number of
/// orchestrators can run concurrently against the same store.
pub struct IngestOrchestrator {
    store: Arc<dyn ObjectStorePort>,
    ledger: MarkerLedger,
}

impl IngestOrchestrator {
    pub fn new(store: Arc<dyn ObjectStorePort>) -> Self {
        let ledger = MarkerLedger::new(store.clone());
        Self { store, ledger }
    }

    /// Entry point for one transport delivery: decode the envelope and
    /// process the referenced file. Errors propagate to the transport, which
    /// owns retry via redelivery.
    pub async fn handle_delivery(&self, payload: &str) -> Result<IngestionOutcome> {
        let notification = match envelope::decode_notification(payload) {
            Ok(notification) => notification,
            Err(err) => {
                error!(error = %err, "transport envelope rejected");
                ingest::file_failed();
                return Err(err);
            }
        };
        self.process(notification).await
    }

    pub async fn process(&self, notification: Notification) -> Result<IngestionOutcome> {
        match self.run(notification).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(error = %err, "settlement ingestion failed");
                ingest::file_failed();
                Err(err)
            }
        }
    }

    async fn run(&self, notification: Notification) -> Result<IngestionOutcome> {
        let t0 = Instant::now();
        let Notification {
            location,
            content_token,
        } = notification;

        // A ledger lookup error fails the notification; only a positive
        // absence answer lets processing continue.
        if self
            .ledger
            .exists(&location.container, &content_token)
            .await?
        {
            warn!(
                container = %location.container,
                key = %location.key,
                token = %content_token,
                "duplicate settlement file, skipped"
            );
            ingest::file_duplicate();
            return Ok(IngestionOutcome::skipped(&location, content_token));
        }

        let bytes = self.store.get(&location).await?;

        let mut reader = ReaderBuilder::new().from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();
        let mapper = SchemaMapper::from_headers(&headers)?;

        // Single streaming pass: rows never materialize as a whole table,
        // only as per-partition batches inside the writer.
        let mut transformer = Transformer::new();
        let mut writer = PartitionedWriter::new();
        for row in reader.records() {
            let record = mapper.canonicalize(&row?)?;
            if let Some(record) = transformer.process(record) {
                writer.push(record);
            }
        }

        let partitions = writer.flush(self.store.as_ref()).await?;

        // Marking is the commit signal. If it fails after a successful
        // append, redelivery re-processes the file and appends again, which
        // the writer tolerates.
        self.ledger.mark(&location.container, &content_token).await?;

        let outcome = IngestionOutcome {
            source: location.to_string(),
            content_token,
            rows_read: transformer.rows_read(),
            rows_written: transformer.rows_written(),
            rows_dropped: transformer.rows_dropped(),
            partitions: partitions.into_iter().collect(),
            status: OutcomeStatus::Done,
        };

        ingest::file_processed();
        ingest::rows_written(outcome.rows_written);
        ingest::rows_dropped(outcome.rows_dropped);
        ingest::partitions_touched(outcome.partitions.len());
        ingest::processing_duration(t0.elapsed().as_secs_f64());

        info!(
            source = %outcome.source,
            token = %outcome.content_token,
            rows_read = outcome.rows_read,
            rows_written = outcome.rows_written,
            rows_dropped = outcome.rows_dropped,
            partitions = ?outcome.partitions,
            "settlement file processed"
        );

        Ok(outcome)
    }
}
