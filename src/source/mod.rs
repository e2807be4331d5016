//! Row sources for the record store.
//!
//! A `RowSource` only knows how to produce raw CSV rows; turning rows into
//! records (field count checks, stable ids) belongs to `RecordStore::load`.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::constants::source::INLINE_SOURCE_ID;
use crate::errors::OrderError;
use crate::transport::fs::read_text;
use crate::types::SourceId;

/// One data row as split by the CSV reader, header already removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line where the row starts in the source text.
    pub line: usize,
    /// Trimmed field values.
    pub fields: Vec<String>,
}

/// Where CSV rows come from.
pub trait RowSource {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Read and split every data row.
    fn read_rows(&self) -> Result<Vec<RawRow>, OrderError>;
}

/// CSV file on disk.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    id: SourceId,
    path: PathBuf,
}

impl CsvFileSource {
    /// Create a source reading `path`; the path doubles as the source id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
        }
    }

    /// Path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, OrderError> {
        let text = read_text(&self.id, &self.path)?;
        parse_csv_rows(&self.id, &text)
    }
}

/// CSV text held in memory (tests, uploads, embedding).
#[derive(Clone, Debug)]
pub struct InMemoryCsvSource {
    id: SourceId,
    text: String,
}

impl InMemoryCsvSource {
    /// Create an in-memory source with the default inline id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(INLINE_SOURCE_ID, text)
    }

    /// Create an in-memory source with an explicit id.
    pub fn with_id(id: impl Into<SourceId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl RowSource for InMemoryCsvSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_rows(&self) -> Result<Vec<RawRow>, OrderError> {
        parse_csv_rows(&self.id, &self.text)
    }
}

/// Split CSV text into rows, skipping the header line.
///
/// Double quotes protect embedded commas. A single trailing empty field is
/// not counted, so `a,b,c,` yields three fields.
pub fn parse_csv_rows(source_id: &str, text: &str) -> Result<Vec<RawRow>, OrderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| OrderError::SourceUnavailable {
            source_id: source_id.to_string(),
            reason: format!("failed parsing CSV: {err}"),
        })?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or_default();
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.last().is_some_and(|field| field.is_empty()) {
            fields.pop();
        }
        rows.push(RawRow { line, fields });
    }
    debug!(
        "[running_order:source] read {} data rows from '{}'",
        rows.len(),
        source_id
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn header_is_skipped_and_quoted_commas_survive() {
        let text = "class,group,theme,url\n\
                    高尾クラス,A,\"Rivers, lakes, and seas\",https://example.org/a\n";
        let rows = parse_csv_rows("t", text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(
            rows[0].fields,
            vec![
                "高尾クラス".to_string(),
                "A".to_string(),
                "Rivers, lakes, and seas".to_string(),
                "https://example.org/a".to_string(),
            ]
        );
    }

    #[test]
    fn fields_are_trimmed_and_blank_lines_skipped() {
        let text = "h1,h2,h3,h4\n\n  x , y ,z,  w  \n\n";
        let rows = parse_csv_rows("t", text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn trailing_empty_field_is_not_counted() {
        let text = "h1,h2,h3,h4\na,b,c,\n";
        let rows = parse_csv_rows("t", text).unwrap();
        assert_eq!(rows[0].fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn header_only_and_empty_text_yield_no_rows() {
        assert!(parse_csv_rows("t", "").unwrap().is_empty());
        assert!(parse_csv_rows("t", "class,group,theme,url\n").unwrap().is_empty());
    }

    #[test]
    fn file_source_reads_rows_and_reports_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "h1,h2,h3,h4\na,b,c,d\n").unwrap();

        let source = CsvFileSource::new(&path);
        assert_eq!(source.path(), path.as_path());
        let rows = source.read_rows().unwrap();
        assert_eq!(rows.len(), 1);

        let missing = CsvFileSource::new(dir.path().join("missing.csv"));
        let err = missing.read_rows().unwrap_err();
        assert!(matches!(err, OrderError::SourceUnavailable { .. }));
    }

    #[test]
    fn in_memory_source_uses_inline_id_by_default() {
        let source = InMemoryCsvSource::new("h\n");
        assert_eq!(source.id(), INLINE_SOURCE_ID);
        let named = InMemoryCsvSource::with_id("upload", "h\n");
        assert_eq!(named.id(), "upload");
    }
}
