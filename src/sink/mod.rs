//! Record sink: tabular output and the optional biobank join.

pub mod biobank;
pub mod table;

pub use biobank::{left_join, joined_table, project_biobank, BiobankRow, JoinedRecord, BIOBANK_COLUMNS};
pub use table::{read_table, write_table, Cell, Table, TableFormat};

use crate::output::ReportRecord;

/// Output column names for accepted records, in order.
pub const RECORD_COLUMNS: [&str; 6] = [
    "NHC",
    "Muestra/Biopsia",
    "Procedencia",
    "Diagnostico",
    "Resultado",
    "Pagina",
];

pub(crate) fn record_cells(record: &ReportRecord) -> Vec<Cell> {
    vec![
        Some(record.identifier().to_string()),
        Some(record.sample_id().to_string()),
        Some(record.origin().to_string()),
        Some(record.diagnosis().to_string()),
        Some(record.outcome().to_string()),
        Some(record.page().to_string()),
    ]
}

/// Records as a table with [`RECORD_COLUMNS`], in input order.
pub fn records_table(records: &[ReportRecord]) -> Table {
    let mut table = Table::new(RECORD_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in records {
        table.push_row(record_cells(record));
    }
    table
}
