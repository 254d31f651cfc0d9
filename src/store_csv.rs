use std::path::{Path, PathBuf};

use crate::store::{AirportStore, Row, Table, Write};
use crate::{AirportRecord, Error};

/// An [`AirportStore`] persisted on local disk as a CSV file.
/// Every write rewrites the file through a temporary file renamed over it,
/// so that the file either has the table before or after the write.
/// Since each write copies and rewrites the whole table, importing `n` airports
/// in batches of `b` costs O(n²/b); use large batches for full imports.
pub struct CsvStore {
    path: PathBuf,
    table: Table,
}

impl CsvStore {
    /// Opens the store at `path`; a missing file is an empty store.
    /// # Error
    /// Errors if the file exists but cannot be read or decoded
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let table = if path.try_exists()? {
            let file = std::fs::File::open(&path)?;
            let airports = crate::csv::deserialize::<AirportRecord, _>(file)
                .collect::<Result<Vec<_>, _>>()?;
            Table::new(airports.into_iter())
        } else {
            Table::default()
        };
        log::debug!("{} - opened with {} airports", path.display(), table.rows.len());
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &Table) -> Result<(), Error> {
        let mut dir = self.path.clone();
        dir.pop();
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&dir)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let file = std::fs::File::create(&tmp)?;
        let written = crate::csv::serialize(table.rows.iter().map(|row| &row.airport), file);
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl AirportStore for CsvStore {
    type Error = Error;

    fn rows(&self) -> &[Row] {
        &self.table.rows
    }

    fn apply(&mut self, write: Write) -> Result<(), Self::Error> {
        let table = self.table.applied(write);
        self.persist(&table)?;
        self.table = table;
        Ok(())
    }
}
