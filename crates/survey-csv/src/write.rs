//! RFC 4180 CSV writer.
//!
//! Records end in CRLF. A field is quoted when it contains a comma, a double
//! quote, CR or LF, or starts or ends with a space; embedded quotes are
//! doubled.

use std::io::Write;

use crate::{ExportRow, error::Result};

/// Header row, in column order.
pub const HEADER: [&str; 8] = [
  "response_id",
  "survey_title",
  "country",
  "company",
  "location",
  "submitted_at",
  "question_text",
  "answer_value",
];

fn needs_quotes(field: &str) -> bool {
  field.starts_with(' ')
    || field.ends_with(' ')
    || field.contains([',', '"', '\r', '\n'])
}

fn write_field<W: Write>(out: &mut W, field: &str) -> Result<()> {
  if needs_quotes(field) {
    write!(out, "\"{}\"", field.replace('"', "\"\""))?;
  } else {
    out.write_all(field.as_bytes())?;
  }
  Ok(())
}

fn write_record<W, I, S>(out: &mut W, fields: I) -> Result<()>
where
  W: Write,
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  for (i, field) in fields.into_iter().enumerate() {
    if i > 0 {
      out.write_all(b",")?;
    }
    write_field(out, field.as_ref())?;
  }
  out.write_all(b"\r\n")?;
  Ok(())
}

/// Write the header followed by one record per row.
pub fn write_csv<W: Write>(mut out: W, rows: &[ExportRow]) -> Result<()> {
  write_record(&mut out, HEADER)?;
  for row in rows {
    write_record(&mut out, row.fields())?;
  }
  out.flush()?;
  Ok(())
}

/// [`write_csv`] into a `String`.
pub fn to_csv(rows: &[ExportRow]) -> Result<String> {
  let mut buf = Vec::new();
  write_csv(&mut buf, rows)?;
  Ok(String::from_utf8(buf)?)
}
