//! Minimal CSV writing (RFC-4180 quoting). std-only on purpose: the output
//! files are flat append-only tables, read back by spreadsheet tools.

use std::io::{self, Write};

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer, quoting only fields that need it.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_string<S: AsRef<str>>(row: &[S]) -> String {
        let mut buf = Vec::new();
        write_row(&mut buf, row).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(row_string(&["a", "b", "c"]), "a,b,c\n");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        assert_eq!(
            row_string(&["THEFT, MEANS OF TRANSPORT", "says \"no\""]),
            "\"THEFT, MEANS OF TRANSPORT\",\"says \"\"no\"\"\"\n"
        );
    }

    #[test]
    fn embedded_newlines_are_quoted() {
        assert_eq!(row_string(&["line1\nline2", "x"]), "\"line1\nline2\",x\n");
    }

    #[test]
    fn empty_fields_keep_their_position() {
        assert_eq!(row_string(&["id", "", "last"]), "id,,last\n");
    }
}
