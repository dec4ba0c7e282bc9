use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use finlens_core::{CanonicalTable, CanonicalTransaction, TransactionType, UNKNOWN_DESCRIPTION};
use regex::Regex;

use crate::loader::parse_number;
use crate::table::{Cell, RawTable};
use crate::vocabulary::CanonicalColumn;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// ASCII digits only: `\d` would admit full-width digits that `str::parse` rejects.
re!(re_non_numeric, r"[^0-9.\-]");
re!(re_compact_date, r"^[0-9]{8}$");

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%Y.%m.%d",
    "%Y년 %m월 %d일",
    "%Y年%m月%d日",
];

// ── Numeric coercion ─────────────────────────────────────────────────────────

/// Strict coercion: numbers and plain numeric text only, everything else is 0.
pub fn coerce_numeric(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(s) => parse_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Numeric value of an amount cell, stripping currency formatting from text.
/// `None` for missing, non-numeric, or unparsable cells.
pub fn amount_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => strip_currency(s),
        _ => None,
    }
}

/// Amount with every failure resolved to 0.
pub fn sanitize_amount(cell: &Cell) -> f64 {
    amount_value(cell).unwrap_or(0.0)
}

/// Keeps only digits, `.`, and `-`, then parses what is left.
fn strip_currency(s: &str) -> Option<f64> {
    let digits = re_non_numeric().replace_all(s, "");
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ── Date resolution ──────────────────────────────────────────────────────────

/// Resolves a cell to a point in time, falling back to `processed_at`.
pub fn resolve_date(cell: &Cell, processed_at: NaiveDateTime) -> NaiveDateTime {
    let resolved = match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime(s),
        Cell::Number(n) if n.fract() == 0.0 => parse_compact_date(&format!("{n:.0}")),
        _ => None,
    };
    resolved.unwrap_or(processed_at)
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    parse_compact_date(s)
}

/// `YYYYMMDD`, as exported by many banks.
fn parse_compact_date(s: &str) -> Option<NaiveDateTime> {
    if !re_compact_date().is_match(s) {
        return None;
    }
    let y: i32 = s[0..4].parse().ok()?;
    let m: u32 = s[4..6].parse().ok()?;
    let d: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)
}

// ── Projection ───────────────────────────────────────────────────────────────

/// Projects a completed table onto the canonical rows, in source order.
///
/// Columns other than the four canonical ones are dropped; a canonical column
/// that is still missing contributes its default to every row.
pub fn finalize(table: &RawTable, processed_at: NaiveDateTime) -> CanonicalTable {
    let cells = |column: CanonicalColumn| {
        table.column(column.as_str()).map(|c| c.cells.as_slice())
    };
    let dates = cells(CanonicalColumn::Date);
    let descriptions = cells(CanonicalColumn::Description);
    let amounts = cells(CanonicalColumn::Amount);
    let types = cells(CanonicalColumn::Type);

    (0..table.row_count())
        .map(|row| {
            let at = |column| cell_at(column, row);

            let date = at(dates).map_or(processed_at, |cell| resolve_date(cell, processed_at));
            let description = match at(descriptions) {
                Some(Cell::Empty) | None => UNKNOWN_DESCRIPTION.to_string(),
                Some(cell) => cell.to_string(),
            };
            let amount = at(amounts).map_or(0.0, sanitize_amount);
            let kind = match at(types) {
                Some(Cell::Text(s)) if s == TransactionType::Income.as_str() => {
                    TransactionType::Income
                }
                _ => TransactionType::Expense,
            };

            CanonicalTransaction::new(date, description, amount, kind)
        })
        .collect()
}

fn cell_at(column: Option<&[Cell]>, row: usize) -> Option<&Cell> {
    column.and_then(|cells| cells.get(row))
}
