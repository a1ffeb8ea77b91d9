//! Biobank projection and the NHC left join.

use crate::config::ColumnProjection;
use crate::error::HarvestError;
use crate::output::ReportRecord;
use crate::sink::table::{Cell, Table};
use crate::sink::RECORD_COLUMNS;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Semantic names of the nine projected biobank columns, in positional order.
pub const BIOBANK_COLUMNS: [&str; 9] = [
    "HC",
    "Fecha de obtención",
    "Caja",
    "Posición",
    "NHC",
    "Codificador Morfológico 1",
    "Codificador Topográfico 1",
    "Consentimiento",
    "Órgano",
];

/// Position of the join key within [`BIOBANK_COLUMNS`].
const KEY_INDEX: usize = 4;

/// One biobank row after projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BiobankRow {
    #[serde(rename = "HC")]
    pub hc: Cell,
    #[serde(rename = "Fecha de obtención")]
    pub collection_date: Cell,
    #[serde(rename = "Caja")]
    pub storage_box: Cell,
    #[serde(rename = "Posición")]
    pub position: Cell,
    #[serde(rename = "NHC")]
    pub identifier: Cell,
    #[serde(rename = "Codificador Morfológico 1")]
    pub morphology_code: Cell,
    #[serde(rename = "Codificador Topográfico 1")]
    pub topography_code: Cell,
    #[serde(rename = "Consentimiento")]
    pub consent: Cell,
    #[serde(rename = "Órgano")]
    pub organ: Cell,
}

impl BiobankRow {
    fn from_cells(cells: [Cell; 9]) -> Self {
        let [hc, collection_date, storage_box, position, identifier, morphology_code, topography_code, consent, organ] =
            cells;
        Self {
            hc,
            collection_date,
            storage_box,
            position,
            identifier,
            morphology_code,
            topography_code,
            consent,
            organ,
        }
    }

    /// Every column except the join key, in [`BIOBANK_COLUMNS`] order.
    fn non_key_cells(&self) -> [&Cell; 8] {
        [
            &self.hc,
            &self.collection_date,
            &self.storage_box,
            &self.position,
            &self.morphology_code,
            &self.topography_code,
            &self.consent,
            &self.organ,
        ]
    }

    fn key(&self) -> Option<&str> {
        self.identifier.as_deref().map(str::trim)
    }
}

/// A report record with its matching biobank row, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRecord {
    #[serde(flatten)]
    pub record: ReportRecord,
    pub biobank: Option<BiobankRow>,
}

/// Reduce the external dataset to the nine biobank columns.
///
/// `source` is the dataset's path, used only in error messages.
pub fn project_biobank(
    table: &Table,
    projection: ColumnProjection,
    source: &Path,
) -> Result<Vec<BiobankRow>, HarvestError> {
    debug!("Biobank columns: {:?}", table.headers());

    let indices: [usize; 9] = match projection {
        ColumnProjection::ByPosition => {
            if table.width() < BIOBANK_COLUMNS.len() {
                return Err(HarvestError::MissingBiobankColumns {
                    path: source.to_path_buf(),
                    found: table.width(),
                    required: BIOBANK_COLUMNS.len(),
                });
            }
            std::array::from_fn(|i| i)
        }
        ColumnProjection::ByName => {
            let mut indices = [0usize; 9];
            for (slot, name) in indices.iter_mut().zip(BIOBANK_COLUMNS) {
                *slot = table.column_index(name).ok_or_else(|| {
                    HarvestError::MissingBiobankColumn {
                        path: source.to_path_buf(),
                        column: name.to_string(),
                    }
                })?;
            }
            indices
        }
    };

    Ok(table
        .rows()
        .iter()
        .map(|row| BiobankRow::from_cells(std::array::from_fn(|i| row[indices[i]].clone())))
        .collect())
}

/// Left join `records` with `biobank` on the trimmed NHC text.
///
/// Every record appears at least once; a record matching several biobank
/// rows appears once per match, in biobank order.
pub fn left_join(records: &[ReportRecord], biobank: &[BiobankRow]) -> Vec<JoinedRecord> {
    let mut by_key: HashMap<&str, Vec<&BiobankRow>> = HashMap::new();
    for row in biobank {
        if let Some(key) = row.key() {
            by_key.entry(key).or_default().push(row);
        }
    }

    let mut joined = Vec::with_capacity(records.len());
    for record in records {
        match by_key.get(record.identifier().trim()) {
            Some(rows) => joined.extend(rows.iter().map(|row| JoinedRecord {
                record: record.clone(),
                biobank: Some((*row).clone()),
            })),
            None => joined.push(JoinedRecord {
                record: record.clone(),
                biobank: None,
            }),
        }
    }
    joined
}

/// The joined output table: record columns, then the non-key biobank columns.
pub fn joined_table(joined: &[JoinedRecord]) -> Table {
    let headers: Vec<String> = RECORD_COLUMNS
        .iter()
        .chain(
            BIOBANK_COLUMNS
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != KEY_INDEX)
                .map(|(_, name)| name),
        )
        .map(|s| s.to_string())
        .collect();

    let mut table = Table::new(headers);
    for item in joined {
        let mut row = crate::sink::record_cells(&item.record);
        match &item.biobank {
            Some(bio) => row.extend(bio.non_key_cells().into_iter().cloned()),
            None => row.extend(std::iter::repeat_n(None, BIOBANK_COLUMNS.len() - 1)),
        }
        table.push_row(row);
    }
    table
}
