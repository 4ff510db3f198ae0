//! CSV record tokenization.

use crate::error::{ParseError, ParseResult};
use crate::types::RawRecord;

/// Options controlling how CSV text is tokenized.
///
/// Use [`Default`] for comma-separated, double-quoted input with trimmed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte. Quoted fields may contain the delimiter and newlines; a doubled quote is a
    /// literal quote.
    pub quote: u8,
    /// Strip surrounding whitespace from a cell before it is coerced.
    ///
    /// When `false`, an `age` of `" 5 "` is not a number and its record is null. Header tokens are
    /// trimmed either way, and [`crate::types::RawRecord`] values are always kept verbatim.
    pub trim_values: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim_values: true,
        }
    }
}

impl ParseOptions {
    /// The part of a raw cell that coercion looks at.
    pub fn value<'v>(&self, raw: &'v str) -> &'v str {
        if self.trim_values { raw.trim() } else { raw }
    }

    /// A headerless, flexible reader builder. Header handling is done by the callers so that
    /// leading blank lines and header trimming follow the same rules in every backend.
    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote);
        builder
    }
}

/// Lazy, single-pass iterator of header-keyed rows.
///
/// Returned by [`parse_records`]. It cannot be restarted; parse the text again instead.
pub struct RawRecords<'a> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<&'a [u8]>,
}

impl RawRecords<'_> {
    /// Trimmed header keys, in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn key(&self, record: &csv::StringRecord) -> RawRecord {
        // zip drops extra fields and leaves trailing keys of short rows absent.
        self.headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }
}

impl Iterator for RawRecords<'_> {
    type Item = ParseResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            if is_blank_line(record.iter()) {
                continue;
            }
            return Some(Ok(self.key(&record)));
        }
    }
}

/// Tokenize `text` into header-keyed rows.
///
/// Rules:
///
/// - The first line with any non-blank field is the header; its tokens are trimmed and used as keys.
/// - Empty lines are skipped and produce no row.
/// - Fields are mapped to header keys by position. Short rows omit the missing keys; extra fields
///   are dropped.
///
/// Fails with [`ParseError::MissingHeader`] if no header line exists.
pub fn parse_records<'a>(text: &'a str, options: &ParseOptions) -> ParseResult<RawRecords<'a>> {
    let mut records = options
        .reader_builder()
        .from_reader(text.as_bytes())
        .into_records();

    let headers = loop {
        let Some(record) = records.next() else {
            return Err(ParseError::MissingHeader);
        };
        let record = record?;
        if is_header_line(record.iter()) {
            break record.iter().map(|h| h.trim().to_owned()).collect();
        }
    };

    Ok(RawRecords { headers, records })
}

/// A record is a blank line when it holds nothing but one empty field.
pub(crate) fn is_blank_line<'f, T>(mut fields: impl Iterator<Item = &'f T>) -> bool
where
    T: AsRef<[u8]> + ?Sized + 'f,
{
    match (fields.next(), fields.next()) {
        (None, _) => true,
        (Some(only), None) => only.as_ref().is_empty(),
        _ => false,
    }
}

pub(crate) fn is_header_line<'f, T>(mut fields: impl Iterator<Item = &'f T>) -> bool
where
    T: AsRef<[u8]> + ?Sized + 'f,
{
    fields.any(|f| !f.as_ref().trim_ascii().is_empty())
}
