use serde::{Deserialize, Serialize};

/// City used when the dataset has no municipality for an airport
pub static UNKNOWN_CITY: &'static str = "Unknown";

/// The kind of facility, as tagged in the `type` column of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    LargeAirport,
    MediumAirport,
    SmallAirport,
    Heliport,
    SeaplaneBase,
    BalloonPort,
    Closed,
    /// Any other (lower-cased) tag
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LargeAirport => "large_airport",
            Self::MediumAirport => "medium_airport",
            Self::SmallAirport => "small_airport",
            Self::Heliport => "heliport",
            Self::SeaplaneBase => "seaplane_base",
            Self::BalloonPort => "balloonport",
            Self::Closed => "closed",
            Self::Other(tag) => tag,
        }
    }

    /// Whether a record of this category must carry a real position,
    /// i.e. `(0, 0)` is treated as a placeholder and rejected.
    pub fn requires_position(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "large_airport" => Self::LargeAirport,
            "medium_airport" => Self::MediumAirport,
            "small_airport" => Self::SmallAirport,
            "heliport" => Self::Heliport,
            "seaplane_base" => Self::SeaplaneBase,
            "balloonport" => Self::BalloonPort,
            "closed" => Self::Closed,
            _ => Self::Other(tag),
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        tag.as_str().into()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated airport, as stored in an [`crate::AirportStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    /// The IATA code, upper-cased (e.g. `LAX`); empty when the airport has none
    pub iata: String,
    /// The ICAO code (e.g. `KLAX`), or the GPS code when the ICAO code is missing
    pub icao: String,
    /// The dataset's own identifier (e.g. `KLAX` or `US-0042`)
    pub ident: String,
    pub name: String,
    pub city: String,
    /// The country in ISO 3166
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    pub altitude: f64,
    pub category: Category,
    pub scheduled_service: bool,
    pub continent: Option<String>,
    pub region: Option<String>,
}

impl AirportRecord {
    pub fn has_iata(&self) -> bool {
        !self.iata.is_empty()
    }

    /// The code this record is deduplicated by: IATA, else ICAO, else ident.
    /// Upper-cased. `None` when the record has no code at all.
    pub fn code(&self) -> Option<String> {
        [&self.iata, &self.icao, &self.ident]
            .into_iter()
            .find(|code| !code.is_empty())
            .map(|code| code.to_ascii_uppercase())
    }

    /// Whether the position is the `(0, 0)` placeholder used by the dataset
    pub fn is_placeholder(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn pos(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn display(&self) -> String {
        format!("{} - {} ({}, {})", self.iata, self.name, self.city, self.country)
    }
}

/// The view of an airport handed to callers of the search and lookup interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportSummary {
    pub iata: String,
    pub icao: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub display: String,
}

impl From<&AirportRecord> for AirportSummary {
    fn from(airport: &AirportRecord) -> Self {
        Self {
            iata: airport.iata.clone(),
            icao: airport.icao.clone(),
            name: airport.name.clone(),
            city: airport.city.clone(),
            country: airport.country.clone(),
            latitude: airport.latitude,
            longitude: airport.longitude,
            altitude: airport.altitude,
            display: airport.display(),
        }
    }
}

impl AirportSummary {
    pub fn pos(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[cfg(test)]
pub(crate) fn airport(iata: &str, icao: &str, name: &str, city: &str, country: &str) -> AirportRecord {
    AirportRecord {
        iata: iata.to_string(),
        icao: icao.to_string(),
        ident: icao.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        latitude: 10.0,
        longitude: 20.0,
        altitude: 0.0,
        category: Category::LargeAirport,
        scheduled_service: true,
        continent: None,
        region: None,
    }
}
