use std::io::{Read, Write};

use serde::{de::DeserializeOwned, Serialize};

use crate::Error;

/// Serializes `items` as CSV (with a header) into `writer`
/// # Error
/// Errors if an item cannot be encoded or the writer fails
pub fn serialize<W: Write>(
    items: impl Iterator<Item = impl Serialize>,
    writer: W,
) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for item in items {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Returns an iterator over the rows of `reader` deserialized as `D`.
/// Rows are read one at a time; rows with fewer or more fields than the header
/// are not an error, missing fields are handled by `D`.
pub fn deserialize<D: DeserializeOwned, R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<D, csv::Error>> {
    csv::ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .from_reader(reader)
        .into_deserialize()
}

/// Returns the header and the first `limit` rows of `reader`, as text
pub fn head<R: Read>(reader: R, limit: usize) -> Result<(Vec<String>, Vec<Vec<String>>), Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.iter().map(|x| x.to_string()).collect();
    let rows = rdr
        .records()
        .take(limit)
        .map(|r| r.map(|record| record.iter().map(|x| x.to_string()).collect()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((headers, rows))
}
