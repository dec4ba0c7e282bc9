use finlens_core::TransactionType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Header names the rest of the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalColumn {
    Date,
    Description,
    Amount,
    Type,
    Deposit,
    Withdrawal,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 6] = [
        CanonicalColumn::Date,
        CanonicalColumn::Description,
        CanonicalColumn::Amount,
        CanonicalColumn::Type,
        CanonicalColumn::Deposit,
        CanonicalColumn::Withdrawal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalColumn::Date => "Date",
            CanonicalColumn::Description => "Description",
            CanonicalColumn::Amount => "Amount",
            CanonicalColumn::Type => "Type",
            CanonicalColumn::Deposit => "Deposit",
            CanonicalColumn::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// English, Korean, Japanese, Chinese, Spanish.
const HEADER_SYNONYMS: &[(&str, CanonicalColumn)] = &[
    ("date", CanonicalColumn::Date),
    ("날짜", CanonicalColumn::Date),
    ("日付", CanonicalColumn::Date),
    ("日期", CanonicalColumn::Date),
    ("fecha", CanonicalColumn::Date),
    ("description", CanonicalColumn::Description),
    ("desc", CanonicalColumn::Description),
    ("memo", CanonicalColumn::Description),
    ("적요", CanonicalColumn::Description),
    ("摘要", CanonicalColumn::Description),
    ("descripción", CanonicalColumn::Description),
    ("amount", CanonicalColumn::Amount),
    ("amt", CanonicalColumn::Amount),
    ("금액", CanonicalColumn::Amount),
    ("金額", CanonicalColumn::Amount),
    ("monto", CanonicalColumn::Amount),
    ("type", CanonicalColumn::Type),
    ("category", CanonicalColumn::Type),
    ("구분", CanonicalColumn::Type),
    ("種別", CanonicalColumn::Type),
    ("类型", CanonicalColumn::Type),
    ("tipo", CanonicalColumn::Type),
    ("deposit", CanonicalColumn::Deposit),
    ("입금액", CanonicalColumn::Deposit),
    ("入金金額", CanonicalColumn::Deposit),
    ("收入金额", CanonicalColumn::Deposit),
    ("depósito", CanonicalColumn::Deposit),
    ("withdrawal", CanonicalColumn::Withdrawal),
    ("출금액", CanonicalColumn::Withdrawal),
    ("出金金額", CanonicalColumn::Withdrawal),
    ("支出金额", CanonicalColumn::Withdrawal),
    ("retiro", CanonicalColumn::Withdrawal),
];

// 支出 is both the Japanese and the Chinese spelling.
const CATEGORY_SYNONYMS: &[(&str, TransactionType)] = &[
    ("income", TransactionType::Income),
    ("revenue", TransactionType::Income),
    ("deposit", TransactionType::Income),
    ("expense", TransactionType::Expense),
    ("cost", TransactionType::Expense),
    ("withdrawal", TransactionType::Expense),
    ("입금", TransactionType::Income),
    ("수입", TransactionType::Income),
    ("출금", TransactionType::Expense),
    ("지출", TransactionType::Expense),
    ("入金", TransactionType::Income),
    ("収入", TransactionType::Income),
    ("出金", TransactionType::Expense),
    ("支出", TransactionType::Expense),
    ("收入", TransactionType::Income),
    ("存入", TransactionType::Income),
    ("取出", TransactionType::Expense),
    ("ingreso", TransactionType::Income),
    ("depósito", TransactionType::Income),
    ("gasto", TransactionType::Expense),
    ("retiro", TransactionType::Expense),
];

static BUILTIN: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary {
    columns: HEADER_SYNONYMS
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect(),
    types: CATEGORY_SYNONYMS
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect(),
});

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to parse vocabulary TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Synonym '{synonym}' cannot remap canonical header {canonical}")]
    CanonicalRemap {
        synonym: String,
        canonical: CanonicalColumn,
    },
    #[error("Synonym '{synonym}' cannot remap canonical type {canonical}")]
    CanonicalTypeRemap {
        synonym: String,
        canonical: TransactionType,
    },
}

#[derive(Debug, Default, Deserialize)]
struct VocabularyOverrides {
    #[serde(default)]
    columns: HashMap<String, CanonicalColumn>,
    #[serde(default)]
    types: HashMap<String, TransactionType>,
}

/// Synonym tables for header names and transaction categories.
///
/// Keys are stored lowercased and trimmed; lookups normalize the same way.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    columns: HashMap<String, CanonicalColumn>,
    types: HashMap<String, TransactionType>,
}

impl Vocabulary {
    /// The built-in tables, shared read-only across threads.
    pub fn builtin() -> &'static Vocabulary {
        &BUILTIN
    }

    /// Layers the `[columns]` and `[types]` tables of `toml_content` over the
    /// built-in synonyms.
    pub fn with_overrides_toml(toml_content: &str) -> Result<Vocabulary, VocabularyError> {
        let overrides: VocabularyOverrides = toml::from_str(toml_content)?;
        let mut vocabulary = BUILTIN.clone();

        for (synonym, column) in overrides.columns {
            let key = normalize_key(&synonym);
            // Canonical tokens must stay fixed points so normalization is idempotent.
            if let Some(canonical) = CanonicalColumn::ALL
                .into_iter()
                .find(|c| c.as_str().to_lowercase() == key && *c != column)
            {
                return Err(VocabularyError::CanonicalRemap { synonym, canonical });
            }
            vocabulary.columns.insert(key, column);
        }
        for (synonym, kind) in overrides.types {
            if let Ok(canonical) = synonym.parse::<TransactionType>() {
                if canonical != kind {
                    return Err(VocabularyError::CanonicalTypeRemap { synonym, canonical });
                }
            }
            vocabulary.types.insert(normalize_key(&synonym), kind);
        }

        Ok(vocabulary)
    }

    pub fn canonical_column(&self, header: &str) -> Option<CanonicalColumn> {
        self.columns.get(&normalize_key(header)).copied()
    }

    pub fn transaction_type(&self, category: &str) -> Option<TransactionType> {
        self.types.get(&normalize_key(category)).copied()
    }

    /// Inserts a category mapping without the canonical-tag check.
    #[cfg(test)]
    pub(crate) fn insert_type(&mut self, category: &str, kind: TransactionType) {
        self.types.insert(normalize_key(category), kind);
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}
