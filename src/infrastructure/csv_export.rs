//! CSV persistence for product tables
//!
//! Writing quotes any cell containing the separator, a quote or a line break
//! and doubles embedded quotes. Reading accepts the same quoting and tolerates
//! CRLF line endings. The first row is always the header.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::mem::take;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::dto::ProductTable;

pub const SEPARATOR: char = ',';

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("Column '{column}' not found")]
    MissingColumn { column: String },
}

impl ExportError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single row to any writer
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header plus every row
pub fn write_table_to<W: Write>(mut w: W, table: &ProductTable) -> io::Result<()> {
    write_row(&mut w, table.columns(), SEPARATOR)?;
    for row in table.rows() {
        write_row(&mut w, row, SEPARATOR)?;
    }
    w.flush()
}

/// Save `table` to `path`, creating parent directories as needed
pub fn write_table(path: &Path, table: &ProductTable) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
    }

    let file = File::create(path).map_err(ExportError::io(path))?;
    write_table_to(BufWriter::new(file), table).map_err(ExportError::io(path))?;

    info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}

/* ---------------- Parsing ---------------- */

/// Split CSV text into rows of cells; blank lines are skipped
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    let finish_row = |row: &mut Vec<String>, rows: &mut Vec<Vec<String>>| {
        if row.len() == 1 && row[0].is_empty() {
            row.clear();
        } else {
            rows.push(take(row));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                finish_row(&mut row, &mut rows);
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a final newline, even if quotes were left open
    row.push(field);
    finish_row(&mut row, &mut rows);

    rows
}

/// Load a table saved by [`write_table`]
pub fn read_table(path: &Path) -> Result<ProductTable, ExportError> {
    let text = fs::read_to_string(path).map_err(ExportError::io(path))?;
    let mut rows = parse_rows(&text, SEPARATOR).into_iter();

    let header = rows.next().ok_or_else(|| ExportError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    let mut table = ProductTable::new(header);
    for row in rows {
        table.push_row(row);
    }

    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn quotes_only_when_needed() {
        let mut out = Vec::new();
        write_row(&mut out, &strings(&["plain", "a,b", "say \"hi\"", "two\nlines"]), ',').unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "plain,\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn parses_quotes_crlf_and_blank_lines() {
        let rows = parse_rows("a,b\r\n\"x,1\",\"q\"\"q\"\r\n\r\nlast,\n", ',');

        assert_eq!(
            rows,
            vec![strings(&["a", "b"]), strings(&["x,1", "q\"q"]), strings(&["last", ""])]
        );
    }

    #[test]
    fn table_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("result.csv");

        let mut table = ProductTable::with_category_columns(["name", "price"]);
        let record: Record = [("name", "Chair, oak"), ("price", "")].into_iter().collect();
        table.push_record("furniture", "chairs", &record);

        write_table(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "main_categ,sub_categ,name,price\nfurniture,chairs,\"Chair, oak\",\n"
        );

        assert_eq!(read_table(&path).unwrap(), table);
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        assert!(matches!(read_table(&path), Err(ExportError::MissingHeader { .. })));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_table(Path::new("/definitely/not/here.csv")).unwrap_err();

        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
