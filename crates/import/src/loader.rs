use calamine::{Data, DataType, Ods, Reader, Xls, Xlsb, Xlsx};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use crate::error::ImportError;
use crate::table::{Cell, Column, RawTable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Strings read as a missing value rather than text.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Xlsb,
    Ods,
}

impl SourceFormat {
    /// Picks a format from the filename suffix, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "tsv" => Some(SourceFormat::Tsv),
            "xlsx" | "xlsm" => Some(SourceFormat::Xlsx),
            "xls" => Some(SourceFormat::Xls),
            "xlsb" => Some(SourceFormat::Xlsb),
            "ods" => Some(SourceFormat::Ods),
            _ => None,
        }
    }
}

/// Reads the first sheet (or the whole delimited file) into a [`RawTable`].
/// The first row is the header; no column semantics are applied here.
pub fn load(bytes: &[u8], filename: &str) -> Result<RawTable, ImportError> {
    let format = SourceFormat::from_filename(filename)
        .ok_or_else(|| ImportError::UnsupportedFormat(filename.to_string()))?;
    tracing::debug!(?format, filename, bytes = bytes.len(), "loading statement");

    match format {
        SourceFormat::Csv => read_delimited(bytes, b','),
        SourceFormat::Tsv => read_delimited(bytes, b'\t'),
        SourceFormat::Xlsx => read_workbook::<Xlsx<Cursor<&[u8]>>>(bytes),
        SourceFormat::Xls => read_workbook::<Xls<Cursor<&[u8]>>>(bytes),
        SourceFormat::Xlsb => read_workbook::<Xlsb<Cursor<&[u8]>>>(bytes),
        SourceFormat::Ods => read_workbook::<Ods<Cursor<&[u8]>>>(bytes),
    }
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ImportError::MalformedTable(
            "no columns to parse from file".to_string(),
        ));
    }
    let names = header_names(headers.iter().map(str::to_string));
    let width = names.len();
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); width];

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() > width {
            return Err(ImportError::MalformedTable(format!(
                "expected {} fields in data row {}, saw {}",
                width,
                idx + 1,
                record.len()
            )));
        }
        for (col, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(col).map_or(Cell::Empty, infer_cell));
        }
    }

    RawTable::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, cells)| Column::new(name, cells))
            .collect(),
    )
}

fn read_workbook<'a, W>(bytes: &'a [u8]) -> Result<RawTable, ImportError>
where
    W: Reader<Cursor<&'a [u8]>>,
    W::Error: fmt::Display,
{
    let mut workbook = W::new(Cursor::new(bytes))
        .map_err(|e| ImportError::MalformedTable(format!("failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::MalformedTable("workbook has no worksheets".to_string()))?
        .map_err(|e| ImportError::MalformedTable(format!("failed to read worksheet: {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };
    let names = header_names(header.iter().map(|data| match data {
        Data::Empty => String::new(),
        other => other.to_string(),
    }));
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];

    for row in rows {
        for (col, cells) in columns.iter_mut().enumerate() {
            cells.push(row.get(col).map_or(Cell::Empty, sheet_cell));
        }
    }

    RawTable::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, cells)| Column::new(name, cells))
            .collect(),
    )
}

/// Blank names become `Unnamed: {index}`; repeats get `.1`, `.2`, ... suffixes.
fn header_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };
        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{base}.{count}");
        }
        seen.insert(candidate.clone(), 0);
        names.push(candidate);
    }

    names
}

fn is_na_marker(s: &str) -> bool {
    NA_MARKERS.contains(&s.trim())
}

/// Types a delimited-text field the way a spreadsheet would have stored it.
fn infer_cell(raw: &str) -> Cell {
    if is_na_marker(raw) {
        return Cell::Empty;
    }
    let trimmed = raw.trim();
    match trimmed {
        "true" | "True" | "TRUE" => return Cell::Bool(true),
        "false" | "False" | "FALSE" => return Cell::Bool(false),
        _ => {}
    }
    match parse_number(trimmed) {
        Some(n) => Cell::Number(n),
        None => Cell::text(raw),
    }
}

/// Plain finite decimal or scientific notation; no currency or grouping.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn sheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if is_na_marker(s) => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        other => other
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::text(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── format detection ─────────────────────────────────────────────────────

    #[test]
    fn format_from_suffix() {
        assert_eq!(SourceFormat::from_filename("a.csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_filename("A.CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_filename("a.tsv"), Some(SourceFormat::Tsv));
        assert_eq!(SourceFormat::from_filename("a.xlsx"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_filename("a.xlsm"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_filename("a.xls"), Some(SourceFormat::Xls));
        assert_eq!(SourceFormat::from_filename("a.b.ods"), Some(SourceFormat::Ods));
    }

    #[test]
    fn unrecognized_suffix() {
        assert_eq!(SourceFormat::from_filename("data.txt"), None);
        assert_eq!(SourceFormat::from_filename("csv"), None);
        assert!(matches!(
            load(b"a,b\n1,2\n", "data.txt"),
            Err(ImportError::UnsupportedFormat(name)) if name == "data.txt"
        ));
    }

    // ── cell inference ───────────────────────────────────────────────────────

    #[test]
    fn infer_numbers_and_text() {
        assert_eq!(infer_cell("12.5"), Cell::Number(12.5));
        assert_eq!(infer_cell(" -3 "), Cell::Number(-3.0));
        assert_eq!(infer_cell("1e3"), Cell::Number(1000.0));
        assert_eq!(infer_cell("$1,200.00"), Cell::text("$1,200.00"));
        assert_eq!(infer_cell("inf"), Cell::text("inf"));
    }

    #[test]
    fn infer_na_markers_and_bools() {
        assert_eq!(infer_cell(""), Cell::Empty);
        assert_eq!(infer_cell("N/A"), Cell::Empty);
        assert_eq!(infer_cell("NaN"), Cell::Empty);
        assert_eq!(infer_cell("TRUE"), Cell::Bool(true));
        assert_eq!(infer_cell("False"), Cell::Bool(false));
    }

    #[test]
    fn header_naming() {
        let names = header_names(
            ["a", "", "a", "a", "a.1"].into_iter().map(str::to_string),
        );
        assert_eq!(names, ["a", "Unnamed: 1", "a.1", "a.2", "a.1.1"]);
    }

    // ── delimited text ───────────────────────────────────────────────────────

    #[test]
    fn load_csv_basic() {
        let data = "날짜,적요,금액\n2024-01-15,급여,3000000\n2024-01-16,커피,-4500\n";
        let table = load(data.as_bytes(), "statement.csv").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["날짜", "적요", "금액"]);
        assert_eq!(table.column("금액").unwrap().cells[1], Cell::Number(-4500.0));
        assert_eq!(table.column("적요").unwrap().cells[0], Cell::text("급여"));
    }

    #[test]
    fn load_csv_strips_bom_and_pads_short_rows() {
        let data = b"\xEF\xBB\xBFDate,Amount\n2024-01-15\n\n2024-01-16,5\n";
        let table = load(data, "s.csv").unwrap();
        assert_eq!(table.column_names().next(), Some("Date"));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("Amount").unwrap().cells[0], Cell::Empty);
    }

    #[test]
    fn load_csv_rejects_long_rows() {
        let data = b"a,b\n1,2,3\n";
        assert!(matches!(load(data, "s.csv"), Err(ImportError::MalformedTable(_))));
    }

    #[test]
    fn load_csv_rejects_empty_input() {
        assert!(matches!(load(b"", "s.csv"), Err(ImportError::MalformedTable(_))));
    }

    #[test]
    fn load_csv_rejects_invalid_utf8() {
        let data = b"a,b\n\xff\xfe,1\n";
        assert!(matches!(load(data, "s.csv"), Err(ImportError::MalformedTable(_))));
    }

    #[test]
    fn load_csv_header_only() {
        let table = load(b"Date,Amount\n", "s.csv").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn load_tsv() {
        let table = load(b"Date\tAmount\n2024-01-15\t$5.00\n", "s.TSV").unwrap();
        assert_eq!(table.column("Amount").unwrap().cells[0], Cell::text("$5.00"));
    }

    // ── spreadsheets ─────────────────────────────────────────────────────────

    #[test]
    fn garbage_workbook_is_malformed() {
        let data = b"definitely not a zip archive";
        assert!(matches!(load(data, "s.xlsx"), Err(ImportError::MalformedTable(_))));
        assert!(matches!(load(data, "s.xls"), Err(ImportError::MalformedTable(_))));
    }
}
