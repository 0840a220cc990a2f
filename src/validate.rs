/// Upload validation
///
/// This module handles:
/// - Decoding raw upload bytes as CSV with a header row
/// - Checking the required column contract
/// - Converting each data row into a typed `EquipmentRow`
///
/// Validation is all-or-nothing: the first bad cell fails the whole upload
/// and no rows are returned.
use crate::error::{Error, Result};
use crate::types::{EquipmentRow, REQUIRED_COLUMNS};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse and validate raw upload bytes
///
/// # Returns
/// Rows in source order, or `Error::Schema` naming every missing column,
/// `Error::Parse` for the first non-numeric cell, `Error::Malformed` when
/// the CSV itself cannot be read.
pub fn validate(raw: &[u8]) -> Result<Vec<EquipmentRow>> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);

    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(raw);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(columns.read_row(&record)?);
    }

    debug!("validated {} rows across {} columns", rows.len(), headers.len());
    Ok(rows)
}

/// Positions of the required columns within the header row
struct ColumnIndex {
    name: usize,
    equipment_type: usize,
    flowrate: usize,
    pressure: usize,
    temperature: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        // First occurrence wins when a header is repeated
        let positions: Vec<Option<usize>> =
            REQUIRED_COLUMNS.iter().map(|col| headers.iter().position(|h| h == *col)).collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(col, _)| col.to_string())
            .collect();

        match positions.as_slice() {
            [Some(name), Some(equipment_type), Some(flowrate), Some(pressure), Some(temperature)] => Ok(ColumnIndex {
                name: *name,
                equipment_type: *equipment_type,
                flowrate: *flowrate,
                pressure: *pressure,
                temperature: *temperature,
            }),
            _ => {
                debug!("rejecting upload, missing columns: {:?}", missing);
                Err(Error::Schema { missing })
            }
        }
    }

    fn read_row(&self, record: &StringRecord) -> Result<EquipmentRow> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let text = |idx: usize| record.get(idx).unwrap_or("").to_string();

        Ok(EquipmentRow {
            name: text(self.name),
            equipment_type: text(self.equipment_type),
            flowrate: parse_number(record, self.flowrate, "Flowrate", line)?,
            pressure: parse_number(record, self.pressure, "Pressure", line)?,
            temperature: parse_number(record, self.temperature, "Temperature", line)?,
        })
    }
}

/// Read one numeric cell, rejecting blanks, NaN and infinities
fn parse_number(record: &StringRecord, idx: usize, column: &str, line: u64) -> Result<f64> {
    let value = record.get(idx).unwrap_or("");
    value.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| Error::Parse {
        line,
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;
