pub mod analysis;
pub mod transaction;

pub use analysis::{analyze, AnalysisResult, Totals};
pub use transaction::{
    CanonicalTable, CanonicalTransaction, ParseTransactionTypeError, TransactionType,
    UNKNOWN_DESCRIPTION,
};
