//! In-memory tables and their file formats.
//!
//! Reading supports delimited text (`.csv`, `.tsv`) through `csv` and
//! spreadsheets (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) through
//! `calamine`. Writing supports delimited text and `.xlsx` through
//! `rust_xlsxwriter`. The first row of every file is the header row; no index
//! column is read or written.

use crate::error::HarvestError;
use crate::pipeline::input::resolve_existing;
use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// One cell. `None` is an empty cell.
pub type Cell = Option<String>;

/// Column names plus rows of cells, column order preserved.
///
/// Every row has exactly `headers().len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding with empty cells or truncating to the table width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.width(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }
}

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    /// `.xlsx`, readable and writable.
    Xlsx,
    /// Other spreadsheet formats, read-only.
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, HarvestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("tsv") => Ok(TableFormat::Tsv),
            Some("xlsx") => Ok(TableFormat::Xlsx),
            Some("xlsm" | "xlsb" | "xls" | "ods") => Ok(TableFormat::Workbook),
            _ => Err(HarvestError::UnsupportedTableFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            TableFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Read a table from `path`. `sheet` selects a worksheet in a workbook
/// (default: the first); it is ignored for delimited text.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, HarvestError> {
    let path = resolve_existing(path)?;
    let format = TableFormat::from_path(&path)?;
    let table = match format {
        TableFormat::Csv | TableFormat::Tsv => read_delimited(&path, format.delimiter())?,
        TableFormat::Xlsx | TableFormat::Workbook => read_workbook(&path, sheet)?,
    };
    info!(
        "Read {} rows × {} columns from {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, HarvestError> {
    let read_err = |e: csv::Error| HarvestError::TableReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, Some(h.to_string())))
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        let row: Vec<Cell> = record.iter().map(|v| non_blank(v.to_string())).collect();
        if row.iter().any(Option::is_some) {
            table.push_row(row);
        }
    }
    Ok(table)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, HarvestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| HarvestError::TableReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| HarvestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| HarvestError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?,
    };
    debug!("Reading sheet '{}' of {}", name, path.display());

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| HarvestError::TableReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    Ok(range_to_table(&range))
}

/// Convert a worksheet range to a table anchored at column A.
///
/// calamine trims the range to the used cells; leading empty columns are put
/// back so positional column indices match the sheet's own columns.
fn range_to_table(range: &Range<Data>) -> Table {
    let lead = match range.start() {
        Some((_, col)) => col as usize,
        None => return Table::default(),
    };
    let pad = |row: &[Data]| -> Vec<Cell> {
        std::iter::repeat_n(None, lead)
            .chain(row.iter().map(cell_to_string))
            .collect()
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => pad(header_row)
            .into_iter()
            .enumerate()
            .map(|(i, cell)| header_name(i, cell))
            .collect(),
        None => return Table::default(),
    };

    let mut table = Table::new(headers);
    for row in rows {
        let cells = pad(row);
        if cells.iter().any(Option::is_some) {
            table.push_row(cells);
        }
    }
    table
}

/// Render a spreadsheet cell as text.
///
/// Integral floats print without a fraction so numeric NHCs compare equal to
/// their text form; dates print as ISO dates.
pub fn cell_to_string(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) => non_blank(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{:.0}", f))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match dt.as_datetime() {
                Some(ndt) if serial.fract() == 0.0 => Some(ndt.format("%Y-%m-%d").to_string()),
                Some(ndt) => Some(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Some(serial.to_string()),
            }
        }
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("#ERR:{:?}", e)),
    }
}

/// Write `table` to `path` with a header row: delimited text for `.csv` and
/// `.tsv`, a single-sheet workbook for `.xlsx`.
///
/// The data goes to a temporary file beside `path` that is renamed into place
/// only after a successful flush; on any failure the temporary file is
/// removed and `path` is left untouched.
pub fn write_table(table: &Table, path: &Path) -> Result<(), HarvestError> {
    let format = TableFormat::from_path(path)?;
    if format == TableFormat::Workbook {
        return Err(HarvestError::UnsupportedOutputFormat {
            path: path.to_path_buf(),
        });
    }

    let write_err = |source: io::Error| HarvestError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    match format {
        TableFormat::Xlsx => {
            let bytes = workbook_bytes(table).map_err(|e| write_err(io::Error::other(e.to_string())))?;
            tmp.write_all(&bytes).map_err(write_err)?;
            tmp.flush().map_err(write_err)?;
        }
        _ => write_delimited(table, tmp.as_file(), format.delimiter()).map_err(write_err)?,
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_delimited(table: &Table, out: impl Write, delimiter: u8) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    // Check for error rather than implicitly flushing on drop.
    writer.flush()
}

/// Headers in row 0, one text cell per non-empty value; empty cells stay blank.
fn workbook_bytes(table: &Table) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in table.headers().iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                sheet.write_string(r as u32 + 1, col as u16, value)?;
            }
        }
    }
    workbook.save_to_buffer()
}

/// Blank header cells get a positional placeholder name.
fn header_name(index: usize, value: Cell) -> String {
    match value {
        Some(h) if !h.trim().is_empty() => h.trim().to_string(),
        _ => format!("Unnamed: {index}"),
    }
}

fn non_blank(value: String) -> Cell {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
