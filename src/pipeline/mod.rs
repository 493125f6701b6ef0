// Pipeline: notification intake, record processing, and partitioned output

pub mod ingestion;
pub mod orchestrator;
pub mod parquet_out;
pub mod processing;
