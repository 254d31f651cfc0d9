//! Turns raw rows of the [OurAirports](https://ourairports.com/data/) `airports.csv`
//! into validated [`AirportRecord`]s.
use serde::{Deserialize, Serialize};

use crate::airport::{AirportRecord, Category, UNKNOWN_CITY};

static METERS_PER_FOOT: f64 = 0.3048;

/// A row of the airports dataset, as it comes from the file.
/// Every column is optional and kept as text; extra columns are ignored.
/// The field order is the column order used when exporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAirport {
    pub ident: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    pub latitude_deg: String,
    pub longitude_deg: String,
    pub elevation_ft: String,
    pub continent: String,
    pub iso_country: String,
    pub iso_region: String,
    pub municipality: String,
    pub scheduled_service: String,
    pub icao_code: String,
    pub iata_code: String,
    pub gps_code: String,
}

impl From<&AirportRecord> for RawAirport {
    fn from(airport: &AirportRecord) -> Self {
        let feet = (airport.altitude / METERS_PER_FOOT * 100.0).round() / 100.0;
        Self {
            ident: airport.ident.clone(),
            type_: airport.category.to_string(),
            name: airport.name.clone(),
            latitude_deg: airport.latitude.to_string(),
            longitude_deg: airport.longitude.to_string(),
            elevation_ft: feet.to_string(),
            continent: airport.continent.clone().unwrap_or_default(),
            iso_country: airport.country.clone(),
            iso_region: airport.region.clone().unwrap_or_default(),
            municipality: airport.city.clone(),
            scheduled_service: if airport.scheduled_service { "yes" } else { "no" }.to_string(),
            icao_code: airport.icao.clone(),
            iata_code: airport.iata.clone(),
            gps_code: String::new(),
        }
    }
}

/// Why a row did not make it into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The row could not be decoded from the file
    Malformed,
    /// No IATA code, or one that is not 3 letters
    MissingIata,
    /// Latitude or longitude missing, unparsable or out of range
    BadCoordinates,
    /// Both latitude and longitude are exactly zero
    PlaceholderCoordinates,
    ExcludedCategory,
    NoScheduledService,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Malformed => "malformed row",
            Self::MissingIata => "missing IATA code",
            Self::BadCoordinates => "bad coordinates",
            Self::PlaceholderCoordinates => "placeholder coordinates",
            Self::ExcludedCategory => "excluded category",
            Self::NoScheduledService => "no scheduled service",
        })
    }
}

/// Whether `code` is a well-formed IATA code (3 ASCII letters)
pub fn is_iata(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn coordinate(value: &str, bound: f64) -> Option<f64> {
    let value = value.trim().parse::<f64>().ok()?;
    (value.is_finite() && value.abs() <= bound).then_some(value)
}

/// Returns the [`AirportRecord`] of `raw`, or why it was rejected.
/// When `require_iata` is false, an invalid IATA code is dropped instead of rejecting the row.
/// # Implementation
/// This function is pure.
pub fn normalize(raw: &RawAirport, require_iata: bool) -> Result<AirportRecord, Rejection> {
    let iata = raw.iata_code.trim();
    let iata = if is_iata(iata) {
        iata.to_ascii_uppercase()
    } else if require_iata {
        return Err(Rejection::MissingIata);
    } else {
        String::new()
    };

    let category = Category::from(raw.type_.as_str());

    let (Some(latitude), Some(longitude)) = (
        coordinate(&raw.latitude_deg, 90.0),
        coordinate(&raw.longitude_deg, 180.0),
    ) else {
        return Err(Rejection::BadCoordinates);
    };
    if latitude == 0.0 && longitude == 0.0 && category.requires_position() {
        return Err(Rejection::PlaceholderCoordinates);
    }

    let icao = non_empty(&raw.icao_code)
        .or_else(|| non_empty(&raw.gps_code))
        .unwrap_or_default();

    let altitude = raw
        .elevation_ft
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|feet| feet.is_finite())
        .map(|feet| feet * METERS_PER_FOOT)
        .unwrap_or(0.0);

    Ok(AirportRecord {
        iata,
        icao,
        ident: raw.ident.trim().to_string(),
        name: raw.name.trim().to_string(),
        city: non_empty(&raw.municipality).unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        country: raw.iso_country.trim().to_string(),
        latitude,
        longitude,
        altitude,
        category,
        scheduled_service: raw.scheduled_service.trim().eq_ignore_ascii_case("yes"),
        continent: non_empty(&raw.continent),
        region: non_empty(&raw.iso_region),
    })
}

#[cfg(test)]
pub(crate) fn raw(iata: &str, type_: &str, lat: &str, lon: &str) -> RawAirport {
    RawAirport {
        ident: format!("K{iata}"),
        type_: type_.to_string(),
        name: format!("{iata} Airport"),
        latitude_deg: lat.to_string(),
        longitude_deg: lon.to_string(),
        elevation_ft: "100".to_string(),
        iso_country: "US".to_string(),
        municipality: format!("{iata} City"),
        scheduled_service: "yes".to_string(),
        icao_code: format!("K{iata}"),
        iata_code: iata.to_string(),
        ..Default::default()
    }
}
