#![forbid(unsafe_code)]
mod airport;
pub mod analyze;
pub mod csv;
pub mod download;
mod emissions;
mod error;
mod geo;
pub mod import;
pub mod maintenance;
pub mod normalize;
pub mod search;
pub mod store;
mod store_csv;
pub mod trip;

pub use airport::*;
pub use analyze::{analyze, Analysis};
pub use emissions::*;
pub use error::Error;
pub use geo::*;
pub use import::{ImportMode, ImportOptions, ImportReport, Importer};
pub use maintenance::{clean, export, CleanReport};
pub use normalize::{normalize, RawAirport, Rejection};
pub use search::AirportIndex;
pub use store::{AirportStore, MemoryStore, Row, RowId, Write};
pub use store_csv::CsvStore;
pub use trip::{TripError, TripEstimate, TripPlanner, TripRecord, Trips};
