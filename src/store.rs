use std::collections::{HashMap, HashSet};

use crate::AirportRecord;

/// Identifier of a stored row. Ids increase with insertion order.
pub type RowId = u64;

/// A stored [`AirportRecord`]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub airport: AirportRecord,
}

/// A single write against an [`AirportStore`]. A write is applied entirely or not at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Append records
    Append(Vec<AirportRecord>),
    /// Delete every row, then append records
    Replace(Vec<AirportRecord>),
    /// Replace in place the row with the same code, or append
    Upsert(Vec<AirportRecord>),
    /// Delete rows by id
    Delete(Vec<RowId>),
}

/// A relational-style table of airports.
pub trait AirportStore {
    type Error: std::error::Error + Send;

    /// All rows, in insertion order
    fn rows(&self) -> &[Row];

    /// Atomically applies `write`: on error, the store is unchanged.
    fn apply(&mut self, write: Write) -> Result<(), Self::Error>;

    fn count(&self) -> usize {
        self.rows().len()
    }

    fn airports(&self) -> Box<dyn Iterator<Item = &AirportRecord> + '_> {
        Box::new(self.rows().iter().map(|row| &row.airport))
    }
}

/// The rows of a store and the next id to assign.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    pub rows: Vec<Row>,
    pub next_id: RowId,
}

impl Table {
    pub fn new(airports: impl Iterator<Item = AirportRecord>) -> Self {
        let mut table = Self::default();
        table.append(airports);
        table
    }

    fn append(&mut self, airports: impl Iterator<Item = AirportRecord>) {
        for airport in airports {
            self.next_id += 1;
            self.rows.push(Row {
                id: self.next_id,
                airport,
            });
        }
    }

    fn upsert(&mut self, airports: Vec<AirportRecord>) {
        let mut by_code = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.airport.code().map(|code| (code, i)))
            .fold(HashMap::new(), |mut acc, (code, i)| {
                acc.entry(code).or_insert(i);
                acc
            });

        for airport in airports {
            match airport.code().and_then(|code| by_code.get(&code).copied()) {
                Some(i) => self.rows[i].airport = airport,
                None => {
                    if let Some(code) = airport.code() {
                        by_code.insert(code, self.rows.len());
                    }
                    self.append(std::iter::once(airport));
                }
            }
        }
    }

    /// Returns a new table with `write` applied
    pub fn applied(&self, write: Write) -> Self {
        let mut table = self.clone();
        match write {
            Write::Append(airports) => table.append(airports.into_iter()),
            Write::Replace(airports) => {
                table.rows.clear();
                table.append(airports.into_iter());
            }
            Write::Upsert(airports) => table.upsert(airports),
            Write::Delete(ids) => {
                let ids = ids.into_iter().collect::<HashSet<_>>();
                table.rows.retain(|row| !ids.contains(&row.id));
            }
        }
        table
    }
}

/// An [`AirportStore`] held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Table,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<AirportRecord> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = AirportRecord>>(iter: T) -> Self {
        Self {
            table: Table::new(iter.into_iter()),
        }
    }
}

impl AirportStore for MemoryStore {
    type Error = std::convert::Infallible;

    fn rows(&self) -> &[Row] {
        &self.table.rows
    }

    fn apply(&mut self, write: Write) -> Result<(), Self::Error> {
        self.table = self.table.applied(write);
        Ok(())
    }
}
