// ABOUTME: Delimited text encoding for table rows: one row per line, quoted when needed.
// ABOUTME: RowReader decodes rows from any BufRead; RowWriter and encode_row produce them.

use std::io::{self, BufRead, Write};
use std::mem;

use thiserror::Error;

pub const DEFAULT_DELIMITER: char = ',';

/// Failures while decoding rows from a byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },
}

/// Encode one row, including its trailing newline.
///
/// A field is quoted when it contains the delimiter, a double quote, or a
/// line break; inner quotes are doubled. A row made of a single empty field
/// is written as `""` so it cannot be mistaken for a blank line.
pub fn encode_row(fields: &[String], delimiter: char) -> String {
    let mut out = String::new();
    if let [only] = fields
        && only.is_empty()
    {
        out.push_str("\"\"\n");
        return out;
    }

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        let needs_quotes = field
            .chars()
            .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
        if needs_quotes {
            out.push('"');
            for c in field.chars() {
                if c == '"' {
                    out.push('"');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
    out
}

/// Writes encoded rows to an underlying writer.
pub struct RowWriter<W: Write> {
    writer: W,
    delimiter: char,
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W, delimiter: char) -> Self {
        Self { writer, delimiter }
    }

    pub fn write_row(&mut self, fields: &[String]) -> io::Result<()> {
        self.writer
            .write_all(encode_row(fields, self.delimiter).as_bytes())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Streams decoded rows out of a reader.
///
/// Each item is the 1-based line number the row starts on, plus its fields.
/// Blank lines are skipped. Both `\n` and `\r\n` terminators are accepted, and
/// a quoted field may span several physical lines.
pub struct RowReader<R: BufRead> {
    reader: R,
    delimiter: char,
    line: usize,
    done: bool,
}

impl<R: BufRead> RowReader<R> {
    pub fn new(reader: R, delimiter: char) -> Self {
        Self {
            reader,
            delimiter,
            line: 0,
            done: false,
        }
    }

    fn read_line(&mut self, buf: &mut String) -> Result<bool, DecodeError> {
        buf.clear();
        if self.reader.read_line(buf)? == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }

    fn decode_row(&mut self, first: String) -> Result<(usize, Vec<String>), DecodeError> {
        let start = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut at_field_start = true;
        let mut buf = first;

        loop {
            let mut chars = buf.chars().peekable();
            while let Some(c) = chars.next() {
                if in_quotes {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            field.push('"');
                        } else {
                            in_quotes = false;
                        }
                    } else {
                        field.push(c);
                    }
                } else if c == '"' && at_field_start {
                    in_quotes = true;
                    at_field_start = false;
                } else if c == self.delimiter {
                    fields.push(mem::take(&mut field));
                    at_field_start = true;
                } else if c == '\n' || c == '\r' {
                    // terminator
                } else {
                    field.push(c);
                    at_field_start = false;
                }
            }

            if !in_quotes {
                break;
            }
            let mut next = String::new();
            if !self.read_line(&mut next)? {
                return Err(DecodeError::UnterminatedQuote { line: start });
            }
            buf = next;
        }

        fields.push(field);
        Ok((start, fields))
    }
}

impl<R: BufRead> Iterator for RowReader<R> {
    type Item = Result<(usize, Vec<String>), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = String::new();
        loop {
            match self.read_line(&mut buf) {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
            if !buf.trim_end_matches(['\r', '\n']).is_empty() {
                break;
            }
        }

        let result = self.decode_row(buf);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
