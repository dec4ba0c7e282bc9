use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Description used when a statement carries no description for a row.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Transaction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    pub fn is_income(self) -> bool {
        matches!(self, TransactionType::Income)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown transaction type: '{0}'")]
pub struct ParseTransactionTypeError(pub String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    /// Accepts only the canonical tags, case-insensitively. Localized category
    /// names are resolved by the import vocabulary, not here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            _ => Err(ParseTransactionTypeError(s.to_string())),
        }
    }
}

/// One row of a normalized statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanonicalTransaction {
    pub date: NaiveDateTime,
    pub description: String,
    /// Signed, in the statement's native currency units. Always finite.
    pub amount: f64,
    #[serde(rename = "Type")]
    pub kind: TransactionType,
}

impl CanonicalTransaction {
    pub fn new(
        date: NaiveDateTime,
        description: impl Into<String>,
        amount: f64,
        kind: TransactionType,
    ) -> Self {
        CanonicalTransaction {
            date,
            description: description.into(),
            amount: if amount.is_finite() { amount } else { 0.0 },
            kind,
        }
    }
}

/// The pipeline's output: canonical rows in source order.
pub type CanonicalTable = Vec<CanonicalTransaction>;
