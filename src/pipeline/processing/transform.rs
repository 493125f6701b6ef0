use crate::domain::SettlementRecord;

/// Derives the computed charge total and filters structurally invalid rows,
/// keeping the per-file row accounting.
///
/// This is the pipeline's only validation gate: rows without a reference key
/// are dropped silently; semantically odd but structurally complete rows
/// pass through unchanged.
#[derive(Debug, Default)]
pub struct Transformer {
    rows_read: usize,
    rows_written: usize,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finishes one canonical row, or drops it when the reference key is
    /// missing.
    pub fn process(&mut self, mut record: SettlementRecord) -> Option<SettlementRecord> {
        self.rows_read += 1;
        record.total_charges = record.commission
            + record.markup
            + record.scheme_fees
            + record.interchange
            + record.dcc_markup
            + record.advanced;
        if record.psp_reference.is_none() {
            return None;
        }
        self.rows_written += 1;
        Some(record)
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_written
    }
}
