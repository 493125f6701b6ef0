//! Metrics for the settlement ingestion pipeline.
//!
//! Names follow the standard Prometheus conventions; the host installs
//! whatever recorder it wants, these helpers only emit.

use std::fmt;

/// Enum representing all metric names used in the system.
/// This eliminates magic strings and provides compile-time safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    IngestFilesProcessed,
    IngestFilesDuplicate,
    IngestFilesFailed,
    IngestRowsWritten,
    IngestRowsDropped,
    IngestPartitionsTouched,
    IngestProcessingDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::IngestFilesProcessed => "settlement_ingest_files_processed_total",
            MetricName::IngestFilesDuplicate => "settlement_ingest_files_duplicate_total",
            MetricName::IngestFilesFailed => "settlement_ingest_files_failed_total",
            MetricName::IngestRowsWritten => "settlement_ingest_rows_written_total",
            MetricName::IngestRowsDropped => "settlement_ingest_rows_dropped_total",
            MetricName::IngestPartitionsTouched => "settlement_ingest_partitions_touched",
            MetricName::IngestProcessingDuration => "settlement_ingest_processing_duration_seconds",
        };
        write!(f, "{}", name)
    }
}

pub mod ingest {
    use super::MetricName;

    pub fn file_processed() {
        ::metrics::counter!(MetricName::IngestFilesProcessed.to_string()).increment(1);
    }

    pub fn file_duplicate() {
        ::metrics::counter!(MetricName::IngestFilesDuplicate.to_string()).increment(1);
    }

    pub fn file_failed() {
        ::metrics::counter!(MetricName::IngestFilesFailed.to_string()).increment(1);
    }

    pub fn rows_written(count: usize) {
        ::metrics::counter!(MetricName::IngestRowsWritten.to_string()).increment(count as u64);
    }

    pub fn rows_dropped(count: usize) {
        ::metrics::counter!(MetricName::IngestRowsDropped.to_string()).increment(count as u64);
    }

    pub fn partitions_touched(count: usize) {
        ::metrics::histogram!(MetricName::IngestPartitionsTouched.to_string()).record(count as f64);
    }

    pub fn processing_duration(secs: f64) {
        ::metrics::histogram!(MetricName::IngestProcessingDuration.to_string()).record(secs);
    }
}
