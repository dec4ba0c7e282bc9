use serde::{Deserialize, Serialize};

use super::transaction::{CanonicalTransaction, TransactionType};

/// Months assumed to be covered by one uploaded statement.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Summary metrics for one statement.
///
/// These are single-period estimates: `burn_rate` is the total expense of the
/// statement, not a per-month figure, and `arr` assumes the statement spans one
/// month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Net inflow over the statement (income minus expense).
    pub initial_cash: f64,
    pub burn_rate: f64,
    pub arr: f64,
    pub transactions: Vec<CanonicalTransaction>,
}

/// Income total (signed) and expense total (magnitude) for a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    pub fn from_transactions(transactions: &[CanonicalTransaction]) -> Self {
        transactions.iter().fold(Totals::default(), |acc, tx| match tx.kind {
            TransactionType::Income => Totals {
                income: acc.income + tx.amount,
                ..acc
            },
            TransactionType::Expense => Totals {
                expense: acc.expense + tx.amount.abs(),
                ..acc
            },
        })
    }

    pub fn net(self) -> f64 {
        self.income - self.expense
    }
}

pub fn analyze(transactions: Vec<CanonicalTransaction>) -> AnalysisResult {
    let totals = Totals::from_transactions(&transactions);

    AnalysisResult {
        initial_cash: totals.net(),
        burn_rate: totals.expense,
        arr: totals.income * MONTHS_PER_YEAR,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn tx(kind: TransactionType, amount: f64) -> CanonicalTransaction {
        CanonicalTransaction::new(at(15), "Test", amount, kind)
    }

    #[test]
    fn income_and_signed_expense() {
        let result = analyze(vec![
            tx(TransactionType::Income, 1000.0),
            tx(TransactionType::Expense, -400.0),
        ]);
        assert_eq!(result.initial_cash, 600.0);
        assert_eq!(result.burn_rate, 400.0);
        assert_eq!(result.arr, 12000.0);
        assert_eq!(result.transactions.len(), 2);
    }

    #[test]
    fn expense_uses_magnitude_regardless_of_sign() {
        let result = analyze(vec![
            tx(TransactionType::Expense, 250.0),
            tx(TransactionType::Expense, -150.0),
        ]);
        assert_eq!(result.burn_rate, 400.0);
        assert_eq!(result.initial_cash, -400.0);
        assert_eq!(result.arr, 0.0);
    }

    #[test]
    fn income_is_summed_signed() {
        // A negative INCOME row (e.g. a refund tagged as income) reduces income.
        let totals = Totals::from_transactions(&[
            tx(TransactionType::Income, 500.0),
            tx(TransactionType::Income, -100.0),
        ]);
        assert_eq!(totals.income, 400.0);
        assert_eq!(totals.expense, 0.0);
    }

    #[test]
    fn empty_statement_is_all_zero() {
        let result = analyze(Vec::new());
        assert_eq!(result.initial_cash, 0.0);
        assert_eq!(result.burn_rate, 0.0);
        assert_eq!(result.arr, 0.0);
        assert!(result.transactions.is_empty());
    }

    #[test]
    fn transactions_keep_row_order() {
        let rows = vec![
            CanonicalTransaction::new(at(3), "c", 1.0, TransactionType::Income),
            CanonicalTransaction::new(at(1), "a", 2.0, TransactionType::Expense),
            CanonicalTransaction::new(at(2), "b", 3.0, TransactionType::Income),
        ];
        let result = analyze(rows.clone());
        assert_eq!(result.transactions, rows);
    }

    #[test]
    fn result_serializes_snake_case_metrics() {
        let result = analyze(vec![tx(TransactionType::Income, 10.0)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["initial_cash"], 10.0);
        assert_eq!(json["burn_rate"], 0.0);
        assert_eq!(json["arr"], 120.0);
        assert_eq!(json["transactions"][0]["Type"], "INCOME");
    }
}
