//! TableLoader: locates, decodes and parses one source table into typed rows.

use std::collections::HashMap;
use std::io::Cursor;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::encoding::decode_shift_jis;
use crate::error::ConvertError;
use crate::parse::{parse_datetime, parse_decimal, parse_flag, parse_quantity};
use crate::report::ReferenceWarning;
use crate::source::SourceRow;

/// Rows of one table plus the non-fatal issues found while reading them.
#[derive(Debug)]
pub struct LoadedTable<T> {
    pub table: String,
    pub rows: Vec<T>,
    pub warnings: Vec<ReferenceWarning>,
}

impl<T> LoadedTable<T> {
    /// An absent table: no rows, no warnings.
    #[must_use]
    pub fn empty(table: &str) -> Self {
        Self {
            table: table.to_string(),
            rows: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Finds the newest `<prefix><digits>.csv` (or plain `<prefix>.csv`) in `dir`.
///
/// Returns `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the directory cannot be listed.
pub fn locate_table(dir: &Path, prefix: &str) -> Result<Option<PathBuf>, ConvertError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut best: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| ConvertError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !matches_table_name(&file_name, prefix) {
            continue;
        }
        if best.as_ref().is_none_or(|(name, _)| file_name > *name) {
            best = Some((file_name, entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// `Product20251211.csv` and `Product.csv` match `Product`;
/// `ProductStock20251211.csv` does not.
fn matches_table_name(file_name: &str, prefix: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".csv"))
        .is_some_and(|stamp| stamp.bytes().all(|b| b.is_ascii_digit()))
}

/// Locates and fully loads a table. An absent file is an empty table.
///
/// # Errors
///
/// Returns a [`ConvertError`] on I/O, decode or schema failure.
pub fn load_table<T: SourceRow>(dir: &Path, prefix: &str) -> Result<LoadedTable<T>, ConvertError> {
    let Some(path) = locate_table(dir, prefix)? else {
        tracing::warn!(
            table = prefix,
            dir = %dir.display(),
            "table file not found; treating as empty"
        );
        return Ok(LoadedTable::empty(prefix));
    };

    let bytes = std::fs::read(&path).map_err(|e| ConvertError::Io {
        path: path.clone(),
        source: e,
    })?;

    let mut rows_iter = parse_table::<T>(prefix, &bytes)?;
    let rows = rows_iter.by_ref().collect::<Result<Vec<_>, _>>()?;
    let warnings = rows_iter.take_warnings();

    tracing::info!(
        table = prefix,
        file = %path.display(),
        rows = rows.len(),
        warnings = warnings.len(),
        "loaded table"
    );

    Ok(LoadedTable {
        table: prefix.to_string(),
        rows,
        warnings,
    })
}

/// Decodes `bytes` and returns a lazy iterator of typed rows.
///
/// # Errors
///
/// Returns [`ConvertError::Decode`] for invalid Shift_JIS, or
/// [`ConvertError::Schema`] / [`ConvertError::Csv`] if the header is unusable.
pub fn parse_table<T: SourceRow>(table: &str, bytes: &[u8]) -> Result<TableRows<T>, ConvertError> {
    let decoded = decode_shift_jis(table, bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(decoded.into_bytes()));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| ConvertError::Csv {
            table: table.to_string(),
            source,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let header_only_blank = headers.iter().all(String::is_empty);

    let mut columns = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        columns.entry(name.clone()).or_insert(idx);
    }

    if !header_only_blank {
        if let Some(missing) = T::REQUIRED_COLUMNS
            .iter()
            .find(|col| !columns.contains_key(**col))
        {
            return Err(ConvertError::Schema {
                table: table.to_string(),
                row: 0,
                reason: format!("header is missing required column '{missing}'"),
            });
        }
    }

    Ok(TableRows {
        table: table.to_string(),
        declared_columns: if header_only_blank { 0 } else { headers.len() },
        columns,
        records: reader.into_records(),
        row: 0,
        warnings: Vec::new(),
        _row_type: PhantomData,
    })
}

/// Lazy row iterator over one decoded table.
pub struct TableRows<T> {
    table: String,
    declared_columns: usize,
    columns: HashMap<String, usize>,
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    row: usize,
    warnings: Vec<ReferenceWarning>,
    _row_type: PhantomData<T>,
}

impl<T> TableRows<T> {
    /// Drains the warnings recorded so far.
    pub fn take_warnings(&mut self) -> Vec<ReferenceWarning> {
        std::mem::take(&mut self.warnings)
    }
}

impl<T: SourceRow> Iterator for TableRows<T> {
    type Item = Result<T, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(source) => {
                    return Some(Err(ConvertError::Csv {
                        table: self.table.clone(),
                        source,
                    }))
                }
            };
            self.row += 1;

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            if record.len() < self.declared_columns {
                return Some(Err(ConvertError::Schema {
                    table: self.table.clone(),
                    row: self.row,
                    reason: format!(
                        "expected {} fields, found {}",
                        self.declared_columns,
                        record.len()
                    ),
                }));
            }

            let mut raw = RawRow {
                table: &self.table,
                row: self.row,
                record: &record,
                columns: &self.columns,
                warnings: &mut self.warnings,
            };
            if let Some(row) = T::from_row(&mut raw) {
                return Some(Ok(row));
            }
        }
    }
}

/// Column-addressed view of one data row handed to [`SourceRow::from_row`].
pub struct RawRow<'a> {
    table: &'a str,
    row: usize,
    record: &'a csv::StringRecord,
    columns: &'a HashMap<String, usize>,
    warnings: &'a mut Vec<ReferenceWarning>,
}

impl RawRow<'_> {
    /// Trimmed cell text; `""` when the column is absent.
    #[must_use]
    pub fn text(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .map_or("", str::trim)
    }

    /// Trimmed cell text, `None` when empty or absent.
    #[must_use]
    pub fn optional(&self, column: &str) -> Option<String> {
        let value = self.text(column);
        (!value.is_empty()).then(|| value.to_string())
    }

    #[must_use]
    pub fn flag(&self, column: &str) -> bool {
        parse_flag(self.text(column))
    }

    pub fn decimal(&mut self, column: &str) -> Option<Decimal> {
        let raw = self.text(column);
        match parse_decimal(raw) {
            Ok(value) => value,
            Err(reason) => {
                self.warn_invalid(column, reason);
                None
            }
        }
    }

    pub fn quantity(&mut self, column: &str) -> Option<i64> {
        let raw = self.text(column);
        match parse_quantity(raw) {
            Ok(value) => value,
            Err(reason) => {
                self.warn_invalid(column, reason);
                None
            }
        }
    }

    pub fn datetime(&mut self, column: &str) -> Option<NaiveDateTime> {
        let raw = self.text(column);
        match parse_datetime(raw) {
            Ok(value) => value,
            Err(reason) => {
                self.warn_invalid(column, reason);
                None
            }
        }
    }

    pub fn warn_unknown_link_class(&mut self, value: &str) {
        self.warnings.push(ReferenceWarning::UnknownLinkClass {
            table: self.table.to_string(),
            row: self.row,
            value: value.to_string(),
        });
    }

    /// Records a cell that parsed but is not an acceptable value.
    pub fn warn_invalid(&mut self, column: &str, reason: String) {
        let value = self.text(column).to_string();
        self.warnings.push(ReferenceWarning::InvalidValue {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
            value,
            reason,
        });
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
