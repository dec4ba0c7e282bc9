use chrono::{NaiveDateTime, Utc};
use finlens_core::CanonicalTable;

use crate::columns::normalize_columns;
use crate::error::ImportError;
use crate::loader;
use crate::sanitize::finalize;
use crate::schema::complete_schema;
use crate::split::merge_split_amount;
use crate::vocabulary::Vocabulary;

/// Orchestrates: load → normalize headers → merge split amounts → complete
/// schema → sanitize and project.
///
/// Holds nothing but a shared vocabulary, so one pipeline can serve any
/// number of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct StatementPipeline<'v> {
    vocabulary: &'v Vocabulary,
}

impl Default for StatementPipeline<'static> {
    fn default() -> Self {
        Self::new(Vocabulary::builtin())
    }
}

impl<'v> StatementPipeline<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Normalizes an uploaded statement, timestamping defaults with the
    /// current UTC time.
    pub fn clean(&self, bytes: &[u8], filename: &str) -> Result<CanonicalTable, ImportError> {
        self.clean_at(bytes, filename, Utc::now().naive_utc())
    }

    /// Like [`clean`](Self::clean) with a fixed processing instant.
    pub fn clean_at(
        &self,
        bytes: &[u8],
        filename: &str,
        processed_at: NaiveDateTime,
    ) -> Result<CanonicalTable, ImportError> {
        let table = loader::load(bytes, filename).inspect_err(|e| {
            tracing::error!("Error cleaning data: {e}");
        })?;

        let table = normalize_columns(table, self.vocabulary);
        let table = merge_split_amount(table);
        let table = complete_schema(table, self.vocabulary, processed_at);
        let transactions = finalize(&table, processed_at);

        tracing::debug!(filename, rows = transactions.len(), "statement normalized");
        Ok(transactions)
    }
}

/// Normalizes an uploaded statement with the built-in vocabulary.
pub fn clean(bytes: &[u8], filename: &str) -> Result<CanonicalTable, ImportError> {
    StatementPipeline::default().clean(bytes, filename)
}
