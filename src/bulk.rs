//! Bulk generation from a CSV or plain-text upload.
//!
//! Every non-empty line becomes one QR code. Lines are processed lazily and
//! independently: a line that fails to encode yields an error item and the
//! rest of the batch carries on.

use image::RgbaImage;

use crate::encoder::SymbolEncoder;
use crate::error::{QrError, Result};
use crate::generator::Generator;
use crate::options::RenderOptions;

/// Format of a bulk upload.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BulkKind {
    /// Header row, then one payload per row in the first column.
    Csv,
    /// One payload per line.
    #[default]
    Text,
}

impl BulkKind {
    /// Guesses the format from the upload's content type and file name.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Self {
        let csv_type = content_type.map_or(false, |ct| {
            let ct = ct.to_ascii_lowercase();
            ct.starts_with("text/csv") || ct.starts_with("application/csv")
        });
        let csv_name = file_name.map_or(false, |n| n.to_ascii_lowercase().ends_with(".csv"));
        if csv_type || csv_name {
            Self::Csv
        } else {
            Self::Text
        }
    }
}

/// The payload lines extracted from an upload, in file order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BulkInput {
    pub lines: Vec<String>,
}

impl BulkInput {
    /// Splits an upload into payload lines.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Validation`] if the upload is not UTF-8.
    pub fn parse(bytes: &[u8], kind: BulkKind) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| QrError::validation(format!("Bulk file is not valid UTF-8: {}", e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let lines = match kind {
            BulkKind::Text => text.lines().map(str::to_string).collect(),
            BulkKind::Csv => csv_first_fields(text).into_iter().skip(1).collect(),
        };
        Ok(Self { lines })
    }

    /// Number of lines that will produce a code.
    pub fn payload_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.trim().is_empty()).count()
    }

    /// Rejects uploads with more payload lines than `max_lines`.
    pub fn check_limit(&self, max_lines: usize) -> Result<()> {
        let count = self.payload_count();
        if count > max_lines {
            return Err(QrError::validation(format!(
                "Bulk file has {} lines, the limit is {}",
                count, max_lines
            )));
        }
        Ok(())
    }
}

// First field of every CSV record. Quoted fields may hold commas, `""`
// escapes and line breaks; only a newline outside quotes ends a record.
fn csv_first_fields(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut past_first = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    if !past_first {
                        field.push('"');
                    }
                }
                '"' => in_quotes = false,
                _ if !past_first => field.push(c),
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => past_first = true,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                records.push(std::mem::take(&mut field));
                past_first = false;
            }
            _ if !past_first => field.push(c),
            _ => {}
        }
    }
    if !field.is_empty() || past_first {
        records.push(field);
    }
    records
}

/// Outcome for one bulk line.
#[derive(Debug)]
pub struct BatchItem {
    /// 1-based position among the input lines.
    pub line: usize,
    pub payload: String,
    pub result: Result<RgbaImage>,
}

/// Lazily renders one code per non-empty line, in input order.
pub fn process_batch<'a, E, I>(
    generator: &'a Generator<E>,
    lines: I,
    options: &'a RenderOptions,
) -> impl Iterator<Item = BatchItem> + 'a
where
    E: SymbolEncoder,
    I: IntoIterator<Item = String>,
    I::IntoIter: 'a,
{
    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(idx, line)| {
            let payload = line.trim().to_string();
            let result = generator.generate(&payload, options);
            if let Err(err) = &result {
                tracing::warn!(line = idx + 1, error = %err, "bulk line failed");
            }
            BatchItem {
                line: idx + 1,
                payload,
                result,
            }
        })
}
