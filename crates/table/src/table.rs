use crate::error::{ErrorKind, Result};
use crate::record::{RowId, TableRecord};
use crate::split::{split_plain, split_quoted};
use exn::OptionExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_QUOTE: u8 = b'"';

/// Parser settings for a delimited table dump.
///
/// The cache dumps are comma-separated even when upstream tooling labels them
/// as tab-separated, so the defaults are a comma and a double quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableParser {
    delimiter: u8,
    quote: u8,
}
impl Default for TableParser {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
        }
    }
}
impl TableParser {
    /// Both bytes must be ASCII; anything else could split a UTF-8 sequence.
    pub fn new(delimiter: u8, quote: u8) -> Self {
        debug_assert!(delimiter.is_ascii() && quote.is_ascii());
        Self { delimiter, quote }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quote(&self) -> u8 {
        self.quote
    }

    /// Parses a whole table dump.
    ///
    /// Accepts raw bytes, instead of requiring valid UTF-8. Invalid byte
    /// sequences are replaced with U+FFFD. The first line is the header; every
    /// following non-empty line is a data row.
    ///
    /// # Errors
    ///
    /// - [`MissingHeader`](ErrorKind::MissingHeader) for empty input,
    /// - [`DuplicateField`](ErrorKind::DuplicateField) if the header repeats a name,
    /// - [`MalformedRow`](ErrorKind::MalformedRow) if any row's field count differs
    ///   from the header's. The whole parse fails; there are no partial tables.
    #[instrument(skip(bytes), fields(bytes = bytes.as_ref().len(), rows))]
    pub fn parse(&self, bytes: impl AsRef<[u8]>) -> Result<Table> {
        let text = String::from_utf8_lossy(bytes.as_ref());
        let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));
        let header_line = lines.next().filter(|line| !line.is_empty()).ok_or_raise(|| ErrorKind::MissingHeader)?;
        let header: Arc<[String]> = split_plain(header_line, self.delimiter).into();
        let mut seen = HashSet::new();
        if let Some(duplicate) = header.iter().find(|name| !seen.insert(name.as_str())) {
            exn::bail!(ErrorKind::DuplicateField(duplicate.clone()));
        }
        let mut rows = Vec::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let values = split_quoted(line, self.delimiter, self.quote);
            if values.len() != header.len() {
                exn::bail!(ErrorKind::MalformedRow {
                    row: rows.len() + 1,
                    expected: header.len(),
                    found: values.len(),
                });
            }
            rows.push(TableRecord::new(Arc::clone(&header), values));
        }
        tracing::Span::current().record("rows", rows.len());
        Ok(Table { header, rows })
    }
}

/// A parsed table: its header plus every data row, addressable by [`RowId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Arc<[String]>,
    rows: Vec<TableRecord>,
}
impl Table {
    /// Parses a comma-separated dump with the default parser settings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quicklook_table::{RowId, Table};
    /// let table = Table::parse("x,y,z\na,\"b,c\",d\n").unwrap();
    /// let row = table.get(RowId::new(1).unwrap()).unwrap();
    /// assert_eq!(row.get("y"), Some("b,c"));
    /// ```
    pub fn parse(bytes: impl AsRef<[u8]>) -> Result<Self> {
        TableParser::default().parse(bytes)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn get(&self, id: RowId) -> Option<&TableRecord> {
        self.rows.get(id.index())
    }

    pub fn contains(&self, id: RowId) -> bool {
        id.index() < self.rows.len()
    }

    /// Rows with their identifiers, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &TableRecord)> {
        self.rows.iter().enumerate().filter_map(|(i, row)| Some((RowId::from_index(i)?, row)))
    }

    /// Every row identifier, in input order.
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        (0..self.rows.len()).filter_map(RowId::from_index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
