//! The import pipeline: streams raw rows through [`normalize`], filters and
//! deduplicates them, and writes them to an [`AirportStore`] in atomic batches.
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

use serde::Serialize;

use crate::airport::{AirportRecord, Category};
use crate::normalize::{normalize, RawAirport, Rejection};
use crate::store::{AirportStore, Write};
use crate::Error;

// note: extracted from the OurAirports dataset; used to bootstrap a store without the full dataset
static MAJOR_AIRPORTS: &'static [u8] = include_bytes!("./major_airports.csv");

static PROGRESS_EVERY: usize = 10_000;

/// Which rows are admitted into the store
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Skip airports without scheduled service
    pub require_scheduled_service: bool,
    /// Skip airports of these categories
    pub excluded_categories: HashSet<Category>,
    /// Skip rows without a valid IATA code. When false, invalid codes are dropped instead.
    pub require_iata: bool,
    /// Number of airports per atomic write
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            require_scheduled_service: false,
            excluded_categories: Self::default_exclusions(),
            require_iata: true,
            batch_size: 500,
        }
    }
}

impl ImportOptions {
    /// Heliports, seaplane bases and closed facilities
    pub fn default_exclusions() -> HashSet<Category> {
        [Category::Heliport, Category::SeaplaneBase, Category::Closed]
            .into_iter()
            .collect()
    }

    /// Returns whether `airport` passes the filter, and why not otherwise
    pub fn admit(&self, airport: &AirportRecord) -> Result<(), Rejection> {
        if self.excluded_categories.contains(&airport.category) {
            return Err(Rejection::ExcludedCategory);
        }
        if self.require_scheduled_service && !airport.scheduled_service {
            return Err(Rejection::NoScheduledService);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Delete all airports, then import
    Replace,
    /// Update airports with the same code in place, insert the others
    Upsert,
}

/// A batch the store refused to write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// 1-based number of the batch
    pub batch: usize,
    /// Row numbers (1-based, excluding the header) spanned by the batch;
    /// both are 0 for a write that only clears the table.
    pub first_row: usize,
    pub last_row: usize,
    pub error: String,
}

/// Counters of an import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Rows read from the source
    pub seen: usize,
    /// Rows that passed validation, filter and deduplication
    pub accepted: usize,
    pub rejected: BTreeMap<Rejection, usize>,
    /// Rows skipped because an earlier row had the same code
    pub duplicates: usize,
    /// Airports committed to the store
    pub written: usize,
    pub batches: usize,
    pub failed: Vec<BatchFailure>,
    /// Whether the existing airports were deleted (full replace only)
    pub replaced: bool,
}

impl ImportReport {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Whether every accepted airport was written
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn reject(&mut self, reason: Rejection) {
        *self.rejected.entry(reason).or_default() += 1;
    }
}

/// Imports airports into a store.
pub struct Importer<'a, S: AirportStore> {
    store: &'a mut S,
    options: ImportOptions,
}

struct Batch {
    airports: Vec<AirportRecord>,
    first_row: usize,
    last_row: usize,
}

impl<'a, S: AirportStore> Importer<'a, S> {
    pub fn new(store: &'a mut S, options: ImportOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Imports the CSV in `reader`, streaming it row by row.
    /// # Error
    /// Errors if `reader` fails. Rejected rows and failed batches are not errors; they are
    /// counted in the returned [`ImportReport`].
    pub fn import_csv<R: Read>(&mut self, reader: R, mode: ImportMode) -> Result<ImportReport, Error> {
        self.import_rows(crate::csv::deserialize::<RawAirport, _>(reader), mode)
    }

    /// Imports the bundled list of major international airports.
    pub fn quickstart(&mut self) -> Result<ImportReport, Error> {
        self.import_csv(MAJOR_AIRPORTS, ImportMode::Replace)
    }

    /// Imports `rows`, in order.
    /// # Error
    /// Errors if a row fails with an I/O error; decoding errors count as [`Rejection::Malformed`].
    pub fn import_rows(
        &mut self,
        rows: impl IntoIterator<Item = Result<RawAirport, csv::Error>>,
        mode: ImportMode,
    ) -> Result<ImportReport, Error> {
        let batch_size = self.options.batch_size.max(1);
        let mut report = ImportReport::default();
        let mut pending_replace = mode == ImportMode::Replace;
        // code -> row number of the first airport with that code
        let mut codes = HashMap::<String, usize>::new();
        let mut batch = Batch {
            airports: Vec::with_capacity(batch_size),
            first_row: 0,
            last_row: 0,
        };

        for (i, row) in rows.into_iter().enumerate() {
            let row_number = i + 1;
            report.seen += 1;
            if row_number % PROGRESS_EVERY == 0 {
                log::info!("Processed {row_number} rows");
            }

            let raw = match row {
                Ok(raw) => raw,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    log::debug!("row {row_number}: {e}");
                    report.reject(Rejection::Malformed);
                    continue;
                }
            };

            let airport = match normalize(&raw, self.options.require_iata)
                .and_then(|airport| self.options.admit(&airport).map(|_| airport))
            {
                Ok(airport) => airport,
                Err(reason) => {
                    report.reject(reason);
                    continue;
                }
            };

            if let Some(code) = airport.code() {
                if let Some(first) = codes.get(&code) {
                    log::debug!("row {row_number}: {code} already imported from row {first}");
                    report.duplicates += 1;
                    continue;
                }
                codes.insert(code, row_number);
            }

            report.accepted += 1;
            if batch.airports.is_empty() {
                batch.first_row = row_number;
            }
            batch.last_row = row_number;
            batch.airports.push(airport);

            if batch.airports.len() >= batch_size {
                self.flush(&mut batch, mode, &mut pending_replace, &mut report);
            }
        }
        if !batch.airports.is_empty() || pending_replace {
            self.flush(&mut batch, mode, &mut pending_replace, &mut report);
        }

        if report.duplicates > 0 {
            log::warn!("Skipped {} rows with an already imported code", report.duplicates);
        }
        log::info!(
            "Imported {} of {} rows ({} rejected, {} duplicates, {} failed batches)",
            report.written,
            report.seen,
            report.rejected_total(),
            report.duplicates,
            report.failed.len()
        );
        Ok(report)
    }

    /// Writes `batch` as a single write. On failure the batch is dropped and recorded;
    /// a pending clear of the table is carried over to the next batch.
    fn flush(
        &mut self,
        batch: &mut Batch,
        mode: ImportMode,
        pending_replace: &mut bool,
        report: &mut ImportReport,
    ) {
        let airports = std::mem::take(&mut batch.airports);
        let (first_row, last_row) = if airports.is_empty() {
            (0, 0)
        } else {
            (batch.first_row, batch.last_row)
        };
        let len = airports.len();
        let write = match mode {
            ImportMode::Replace if *pending_replace => Write::Replace(airports),
            ImportMode::Replace => Write::Append(airports),
            ImportMode::Upsert => Write::Upsert(airports),
        };

        report.batches += 1;
        let number = report.batches;
        match self.store.apply(write) {
            Ok(()) => {
                if *pending_replace {
                    log::info!("Cleared existing airports");
                    *pending_replace = false;
                    report.replaced = true;
                }
                report.written += len;
                log::info!("Added batch {number}: {len} airports (rows {first_row}-{last_row})");
            }
            Err(e) => {
                log::error!("Batch {number} (rows {first_row}-{last_row}) rolled back: {e}");
                report.failed.push(BatchFailure {
                    batch: number,
                    first_row,
                    last_row,
                    error: e.to_string(),
                });
            }
        }
    }
}
