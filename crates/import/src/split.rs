use finlens_core::TransactionType;

use crate::sanitize::coerce_numeric;
use crate::table::{Cell, RawTable};
use crate::vocabulary::CanonicalColumn;

/// Collapses a Deposit/Withdrawal layout into a signed `Amount` and a `Type`.
///
/// Does nothing when `Amount` already exists or either split column is
/// missing. A row is INCOME only when its deposit is strictly positive, so a
/// row with nothing in either column is an EXPENSE.
pub fn merge_split_amount(mut table: RawTable) -> RawTable {
    if table.has_column(CanonicalColumn::Amount.as_str()) {
        return table;
    }
    let (Some(deposits), Some(withdrawals)) = (
        table.column(CanonicalColumn::Deposit.as_str()),
        table.column(CanonicalColumn::Withdrawal.as_str()),
    ) else {
        return table;
    };

    let (amounts, types): (Vec<Cell>, Vec<Cell>) = deposits
        .cells
        .iter()
        .zip(&withdrawals.cells)
        .map(|(deposit, withdrawal)| {
            let deposit = coerce_numeric(deposit);
            let withdrawal = coerce_numeric(withdrawal);
            let kind = if deposit > 0.0 {
                TransactionType::Income
            } else {
                TransactionType::Expense
            };
            (
                Cell::Number(deposit - withdrawal),
                Cell::text(kind.as_str()),
            )
        })
        .unzip();

    tracing::debug!(rows = amounts.len(), "merged deposit/withdrawal columns");
    table.set_column(CanonicalColumn::Amount.as_str(), amounts);
    table.set_column(CanonicalColumn::Type.as_str(), types);
    table.remove_columns(CanonicalColumn::Deposit.as_str());
    table.remove_columns(CanonicalColumn::Withdrawal.as_str());
    table
}
