//! Bank-statement normalization: arbitrary CSV/spreadsheet exports in, canonical
//! `Date, Description, Amount, Type` rows out.

pub mod columns;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod sanitize;
pub mod schema;
pub mod split;
pub mod table;
pub mod vocabulary;

pub use columns::normalize_columns;
pub use error::ImportError;
pub use loader::{load, SourceFormat};
pub use pipeline::{clean, StatementPipeline};
pub use sanitize::finalize;
pub use schema::{complete_schema, normalize_types};
pub use split::merge_split_amount;
pub use table::{Cell, Column, RawTable};
pub use vocabulary::{CanonicalColumn, Vocabulary, VocabularyError};

pub use finlens_core::{analyze, AnalysisResult, CanonicalTable, CanonicalTransaction};
