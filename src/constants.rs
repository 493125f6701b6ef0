/// Fixed storage layout for the settlement dataset. The pipeline has no
/// runtime configuration surface; these paths are part of its contract.
// Container holding the partitioned output dataset
pub const DATASET_CONTAINER: &str = "payment-settlement";

// Prefix under which partitioned settlement part files are appended
pub const DATASET_PREFIX: &str = "processed/settlements";

// Prefix for processed-file markers, one zero-byte object per content token.
// Markers live in the container the source file arrived in.
pub const LEDGER_PREFIX: &str = "processed/_processed_etags";
