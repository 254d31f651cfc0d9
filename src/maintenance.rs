//! Operations over the persisted airports: cleanup and export.
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::normalize::RawAirport;
use crate::store::{AirportStore, RowId, Write};
use crate::Error;

/// What [`clean`] removed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    /// IATA code -> number of rows removed for it
    pub duplicates: BTreeMap<String, usize>,
    pub duplicates_removed: usize,
    /// Rows removed for having the `(0, 0)` placeholder position
    pub placeholders_removed: usize,
}

impl CleanReport {
    pub fn removed(&self) -> usize {
        self.duplicates_removed + self.placeholders_removed
    }
}

/// Removes airports with the `(0, 0)` placeholder position, and then every airport whose
/// IATA code (case-insensitive) was already seen in an earlier row, keeping the first.
/// All removals happen in a single write.
/// # Implementation
/// This function is idempotent: a second run removes nothing.
pub fn clean<S: AirportStore>(store: &mut S) -> Result<CleanReport, S::Error> {
    let mut report = CleanReport::default();
    let mut seen = HashSet::new();
    let mut delete = Vec::<RowId>::new();

    for row in store.rows() {
        let airport = &row.airport;
        if airport.is_placeholder() {
            report.placeholders_removed += 1;
            delete.push(row.id);
            continue;
        }
        if !airport.has_iata() {
            continue;
        }
        let code = airport.iata.to_ascii_uppercase();
        if seen.contains(&code) {
            *report.duplicates.entry(code).or_default() += 1;
            report.duplicates_removed += 1;
            delete.push(row.id);
        } else {
            seen.insert(code);
        }
    }

    log::info!("Found {} duplicate IATA codes", report.duplicates.len());
    for (code, count) in &report.duplicates {
        log::info!("  {code}: {count} duplicates");
    }
    log::info!("Found {} airports with invalid coordinates", report.placeholders_removed);

    if !delete.is_empty() {
        store.apply(Write::Delete(delete))?;
    }
    Ok(report)
}

/// Writes every airport of `store` to `writer` in the column format of the source dataset,
/// so that the output can be imported again. Returns the number of airports written.
pub fn export<S: AirportStore, W: std::io::Write>(store: &S, writer: W) -> Result<usize, Error> {
    crate::csv::serialize(store.airports().map(RawAirport::from), writer)?;
    Ok(store.count())
}
