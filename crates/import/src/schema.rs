use chrono::NaiveDateTime;
use finlens_core::{TransactionType, UNKNOWN_DESCRIPTION};

use crate::sanitize::amount_value;
use crate::table::{Cell, RawTable};
use crate::vocabulary::{CanonicalColumn, Vocabulary};

/// Fills in any missing canonical column and normalizes `Type`.
///
/// `processed_at` is used for every row of a missing `Date` column. Type
/// derivation looks at whether the source carried an `Amount` column, not at
/// the zero-filled default added here.
pub fn complete_schema(
    mut table: RawTable,
    vocabulary: &Vocabulary,
    processed_at: NaiveDateTime,
) -> RawTable {
    let had_amount = table.has_column(CanonicalColumn::Amount.as_str());

    if !table.has_column(CanonicalColumn::Date.as_str()) {
        table.fill_column(CanonicalColumn::Date.as_str(), Cell::DateTime(processed_at));
    }
    if !table.has_column(CanonicalColumn::Description.as_str()) {
        table.fill_column(
            CanonicalColumn::Description.as_str(),
            Cell::text(UNKNOWN_DESCRIPTION),
        );
    }
    if !had_amount {
        table.fill_column(CanonicalColumn::Amount.as_str(), Cell::Number(0.0));
    }

    assign_types(table, vocabulary, had_amount)
}

/// Maps every row's `Type` onto INCOME or EXPENSE.
///
/// Without a `Type` column the sign of `Amount` decides (zero counts as
/// income); without either column every row is an expense. Canonical tags are
/// kept as they are, other category text goes through the vocabulary, and
/// anything unrecognized is an expense.
pub fn normalize_types(table: RawTable, vocabulary: &Vocabulary) -> RawTable {
    let has_amount = table.has_column(CanonicalColumn::Amount.as_str());
    assign_types(table, vocabulary, has_amount)
}

fn assign_types(mut table: RawTable, vocabulary: &Vocabulary, has_amount: bool) -> RawTable {
    let types: Vec<TransactionType> = match table.column(CanonicalColumn::Type.as_str()) {
        Some(column) => column
            .cells
            .iter()
            .map(|cell| {
                let category = cell.to_string();
                category
                    .parse::<TransactionType>()
                    .ok()
                    .or_else(|| vocabulary.transaction_type(&category))
                    .unwrap_or(TransactionType::Expense)
            })
            .collect(),
        None if has_amount => table
            .column(CanonicalColumn::Amount.as_str())
            .map(|column| column.cells.iter().map(type_from_amount).collect())
            .unwrap_or_default(),
        None => vec![TransactionType::Expense; table.row_count()],
    };

    tracing::debug!(
        rows = types.len(),
        income = types.iter().filter(|t| t.is_income()).count(),
        "normalized transaction types"
    );
    let cells = types.into_iter().map(|t| Cell::text(t.as_str())).collect();
    table.set_column(CanonicalColumn::Type.as_str(), cells);
    table
}

fn type_from_amount(cell: &Cell) -> TransactionType {
    match amount_value(cell) {
        Some(amount) if amount >= 0.0 => TransactionType::Income,
        _ => TransactionType::Expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn table(columns: Vec<Column>) -> RawTable {
        RawTable::new(columns).unwrap()
    }

    fn types(table: &RawTable) -> Vec<String> {
        table
            .column("Type")
            .unwrap()
            .cells
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    // ── defaults ─────────────────────────────────────────────────────────────

    #[test]
    fn fills_missing_columns_with_defaults() {
        let input = table(vec![Column::new("Other", vec![Cell::Empty, Cell::Empty])]);
        let out = complete_schema(input, Vocabulary::builtin(), now());

        assert_eq!(out.column("Date").unwrap().cells, vec![Cell::DateTime(now()); 2]);
        assert_eq!(
            out.column("Description").unwrap().cells,
            vec![Cell::text(UNKNOWN_DESCRIPTION); 2]
        );
        assert_eq!(out.column("Amount").unwrap().cells, vec![Cell::Number(0.0); 2]);
        // no Amount in the source, so no sign to derive from
        assert_eq!(types(&out), ["EXPENSE", "EXPENSE"]);
    }

    #[test]
    fn keeps_existing_columns() {
        let input = table(vec![
            Column::new("Date", vec![Cell::text("2024-01-15")]),
            Column::new("Description", vec![Cell::text("Rent")]),
            Column::new("Amount", vec![Cell::Number(-900.0)]),
        ]);
        let out = complete_schema(input, Vocabulary::builtin(), now());
        assert_eq!(out.column("Date").unwrap().cells, [Cell::text("2024-01-15")]);
        assert_eq!(out.column("Description").unwrap().cells, [Cell::text("Rent")]);
        assert_eq!(types(&out), ["EXPENSE"]);
    }

    // ── type derivation ──────────────────────────────────────────────────────

    #[test]
    fn derives_type_from_amount_sign() {
        let input = table(vec![Column::new(
            "Amount",
            vec![
                Cell::Number(10.0),
                Cell::Number(0.0),
                Cell::Number(-0.01),
                Cell::text("$1,200.00"),
                Cell::text("-$5"),
                Cell::Empty,
            ],
        )]);
        let out = complete_schema(input, Vocabulary::builtin(), now());
        assert_eq!(
            types(&out),
            ["INCOME", "INCOME", "EXPENSE", "INCOME", "EXPENSE", "EXPENSE"]
        );
    }

    #[test]
    fn normalize_types_without_amount_or_type() {
        let input = table(vec![Column::new("Description", vec![Cell::text("x")])]);
        let out = normalize_types(input, Vocabulary::builtin());
        assert_eq!(types(&out), ["EXPENSE"]);
    }

    // ── category mapping ─────────────────────────────────────────────────────

    #[test]
    fn maps_multilingual_categories() {
        let input = table(vec![
            Column::new("Amount", vec![Cell::Number(1.0); 4]),
            Column::new(
                "Type",
                vec![
                    Cell::text("입금"),
                    Cell::text("支出"),
                    Cell::text("deposit"),
                    Cell::text("gasto"),
                ],
            ),
        ]);
        let out = complete_schema(input, Vocabulary::builtin(), now());
        assert_eq!(types(&out), ["INCOME", "EXPENSE", "INCOME", "EXPENSE"]);
    }

    #[test]
    fn unknown_categories_default_to_expense() {
        let input = table(vec![
            Column::new("Amount", vec![Cell::Number(100.0); 4]),
            Column::new(
                "Type",
                vec![
                    Cell::text("mystery"),
                    Cell::Empty,
                    Cell::Number(1.0),
                    Cell::text("  Revenue "),
                ],
            ),
        ]);
        let out = complete_schema(input, Vocabulary::builtin(), now());
        assert_eq!(types(&out), ["EXPENSE", "EXPENSE", "EXPENSE", "INCOME"]);
    }

    #[test]
    fn canonical_tags_are_stable() {
        let input = table(vec![Column::new(
            "Type",
            vec![Cell::text("INCOME"), Cell::text("EXPENSE")],
        )]);
        let once = normalize_types(input, Vocabulary::builtin());
        let twice = normalize_types(once.clone(), Vocabulary::builtin());
        assert_eq!(types(&once), ["INCOME", "EXPENSE"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn canonical_tags_bypass_the_vocabulary() {
        // not constructible through with_overrides_toml
        let mut vocabulary = Vocabulary::default();
        vocabulary.insert_type("income", TransactionType::Expense);
        let input = table(vec![Column::new(
            "Type",
            vec![Cell::text("INCOME"), Cell::text("income")],
        )]);
        let out = normalize_types(input, &vocabulary);
        assert_eq!(types(&out), ["INCOME", "INCOME"]);
    }
}
