//! Summary statistics for a validated row set.
//!
//! Aggregates are computed in a single pass over the rows. The type
//! distribution keeps first-seen order so that listings and reports show
//! categories in the order the file introduced them.

use crate::types::{EquipmentRow, SummaryFields, TypeDistribution};

/// Calculate summary statistics from validated rows.
///
/// # Arguments
/// * `rows` - Rows in source order
///
/// # Returns
/// Count, the three arithmetic means (0.0 for an empty set) and the
/// per-type counts. An empty type label is counted under `""`.
pub fn summarize(rows: &[EquipmentRow]) -> SummaryFields {
    let mut flowrate = 0.0;
    let mut pressure = 0.0;
    let mut temperature = 0.0;
    let mut type_distribution = TypeDistribution::new();

    for row in rows {
        flowrate += row.flowrate;
        pressure += row.pressure;
        temperature += row.temperature;
        *type_distribution.entry(row.equipment_type.clone()).or_insert(0) += 1;
    }

    let mean = |sum: f64| if rows.is_empty() { 0.0 } else { sum / rows.len() as f64 };

    SummaryFields {
        total_count: rows.len() as u64,
        avg_flowrate: mean(flowrate),
        avg_pressure: mean(pressure),
        avg_temperature: mean(temperature),
        type_distribution,
    }
}
