//! Aligned text-table rendering with terminal-width-aware truncation.

use std::io::{self, BufWriter, Write};
use std::time::Duration;

use crate::columns::ColumnSet;
use crate::human;

/// A single cell value, tagged with its formatting rule at the point it is
/// produced.
#[derive(Debug)]
pub enum Cell {
    Text(String),
    Duration(Duration),
    Size(u64),
    /// A count that may be unknown; unknown renders as "?".
    Count(Option<u64>),
}

impl Cell {
    fn render(self) -> String {
        match self {
            Cell::Text(s) => s,
            Cell::Duration(d) => human::format_duration(d),
            Cell::Size(n) => human::format_size(n),
            Cell::Count(Some(n)) => n.to_string(),
            Cell::Count(None) => "?".to_string(),
        }
    }
}

const PAD: &[u8] = b"  ";

/// Accumulates rows for a fixed column set, then writes them aligned,
/// padding every column to the widest cell seen (header included).
pub struct Table {
    term_width: usize,
    right_align: Vec<bool>,
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table for `cols` and seeds the header row. `term_width` is
    /// the output terminal's column count, or 0 when the output is not a
    /// terminal.
    pub fn new(cols: ColumnSet, term_width: usize) -> Table {
        let mut right_align = Vec::with_capacity(cols.len());
        let mut widths = Vec::with_capacity(cols.len());
        let mut header = Vec::with_capacity(cols.len());
        for col in cols.iter() {
            right_align.push(col.right_aligned());
            widths.push(col.name().len());
            header.push(col.name().to_string());
        }
        Table {
            term_width,
            right_align,
            widths,
            rows: vec![header],
        }
    }

    /// Appends one row, one cell per configured column in canonical order.
    ///
    /// # Panics
    ///
    /// Panics when the cell count does not match the column count; that is a
    /// caller bug, not a runtime condition.
    pub fn push(&mut self, cells: Vec<Cell>) {
        assert_eq!(
            cells.len(),
            self.widths.len(),
            "table row has wrong number of cells"
        );
        let row: Vec<String> = cells.into_iter().map(Cell::render).collect();
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > self.widths[i] {
                self.widths[i] = cell.len();
            }
        }
        self.rows.push(row);
    }

    /// Writes all accumulated rows. Rendering does not consume the table, so
    /// a second call produces byte-identical output.
    pub fn write_to<W: Write>(&self, w: W) -> io::Result<()> {
        let mut bw = BufWriter::new(w);
        let mut line: Vec<u8> = Vec::new();
        let mut trim = false;
        for (i, row) in self.rows.iter().enumerate() {
            line.clear();
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    line.extend_from_slice(PAD);
                }
                let width = self.widths[j];
                if self.right_align[j] {
                    for _ in cell.len()..width {
                        line.push(b' ');
                    }
                    line.extend_from_slice(cell.as_bytes());
                } else {
                    line.extend_from_slice(cell.as_bytes());
                    // No trailing padding on the last column of a row.
                    if j < row.len() - 1 {
                        for _ in cell.len()..width {
                            line.push(b' ');
                        }
                    }
                }
            }
            // Over-long rows (usually cmdline) are trimmed to the terminal
            // width. If even the header row does not fit, trimming is
            // disabled for the whole table.
            if i == 0 {
                trim = self.term_width > 3 && line.len() < self.term_width;
            }
            if trim && line.len() > self.term_width {
                line.truncate(self.term_width - 3);
                line.extend_from_slice(b"...");
            }
            line.push(b'\n');
            bw.write_all(&line)?;
        }
        bw.flush()
    }
}
