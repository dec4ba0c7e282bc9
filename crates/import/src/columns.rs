use crate::table::RawTable;
use crate::vocabulary::Vocabulary;

/// Renames localized or abbreviated headers to canonical tokens. Unknown
/// headers keep their original spelling; column order and count are unchanged.
pub fn normalize_columns(mut table: RawTable, vocabulary: &Vocabulary) -> RawTable {
    table.rename_with(|name| {
        vocabulary
            .canonical_column(name)
            .map(|column| column.as_str().to_string())
    });
    table
}
