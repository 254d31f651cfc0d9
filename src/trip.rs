//! Trips between two airports and their emissions.
use serde::{Deserialize, Serialize};

use crate::{distance, AirportIndex, AirportRecord, AirportStore, EmissionsModel};

pub type UserId = u64;
pub type TripId = u64;

/// An airport as it was when a trip was created. Later changes to the
/// airport table do not affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportSnapshot {
    /// The IATA code
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&AirportRecord> for AirportSnapshot {
    fn from(airport: &AirportRecord) -> Self {
        Self {
            code: airport.iata.clone(),
            latitude: airport.latitude,
            longitude: airport.longitude,
        }
    }
}

impl AirportSnapshot {
    pub fn pos(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Distance and emissions of flying between two airports
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripEstimate {
    pub distance_km: f64,
    pub emissions_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    /// No airport with this code
    UnknownAirport(String),
    /// No trip with this id
    UnknownTrip(TripId),
}

impl std::error::Error for TripError {}

impl std::fmt::Display for TripError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAirport(code) => write!(f, "unknown airport \"{code}\""),
            Self::UnknownTrip(id) => write!(f, "unknown trip {id}"),
        }
    }
}

/// A trip of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: TripId,
    pub user_id: UserId,
    pub origin: AirportSnapshot,
    pub destination: AirportSnapshot,
    /// Great-circle distance in km
    pub distance_km: f64,
    /// Emissions in kg of CO2
    pub emissions_kg: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

/// Resolves airport codes against a store and computes trip estimates
pub struct TripPlanner<'a, S: AirportStore> {
    index: AirportIndex<'a, S>,
    model: EmissionsModel,
}

impl<'a, S: AirportStore> TripPlanner<'a, S> {
    pub fn new(store: &'a S, model: EmissionsModel) -> Self {
        Self {
            index: AirportIndex::new(store),
            model,
        }
    }

    pub fn model(&self) -> EmissionsModel {
        self.model
    }

    fn resolve(&self, code: &str) -> Result<AirportSnapshot, TripError> {
        self.index
            .record(code)
            .map(AirportSnapshot::from)
            .ok_or_else(|| TripError::UnknownAirport(code.trim().to_string()))
    }

    fn estimate(&self, origin: &AirportSnapshot, destination: &AirportSnapshot) -> TripEstimate {
        let distance_km = distance(origin.pos(), destination.pos());
        TripEstimate {
            distance_km,
            emissions_kg: self.model.emissions_kg(distance_km),
        }
    }

    fn plan(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<(AirportSnapshot, AirportSnapshot, TripEstimate), TripError> {
        let origin = self.resolve(origin)?;
        let destination = self.resolve(destination)?;
        let estimate = self.estimate(&origin, &destination);
        Ok((origin, destination, estimate))
    }

    /// Returns the distance and emissions of flying `origin` -> `destination`
    /// # Error
    /// Errors if either code is not a known airport
    pub fn compute_trip(&self, origin: &str, destination: &str) -> Result<TripEstimate, TripError> {
        self.plan(origin, destination).map(|(_, _, estimate)| estimate)
    }
}

/// The trips of all users, in creation order
#[derive(Debug, Clone, Default)]
pub struct Trips {
    trips: Vec<TripRecord>,
    next_id: TripId,
}

impl Trips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trip of `user_id`. Nothing is created when a code is unknown.
    pub fn create<S: AirportStore>(
        &mut self,
        planner: &TripPlanner<S>,
        user_id: UserId,
        origin: &str,
        destination: &str,
    ) -> Result<&TripRecord, TripError> {
        let (origin, destination, estimate) = planner.plan(origin, destination)?;
        self.next_id += 1;
        self.trips.push(TripRecord {
            id: self.next_id,
            user_id,
            origin,
            destination,
            distance_km: estimate.distance_km,
            emissions_kg: estimate.emissions_kg,
            created_at: time::OffsetDateTime::now_utc(),
        });
        log::debug!("trip {} created for user {user_id}", self.next_id);
        Ok(&self.trips[self.trips.len() - 1])
    }

    /// Changes the airports of trip `id`, taking new snapshots and recomputing
    /// distance and emissions. The trip is unchanged on error.
    pub fn edit<S: AirportStore>(
        &mut self,
        planner: &TripPlanner<S>,
        id: TripId,
        origin: &str,
        destination: &str,
    ) -> Result<&TripRecord, TripError> {
        let position = self
            .trips
            .iter()
            .position(|trip| trip.id == id)
            .ok_or(TripError::UnknownTrip(id))?;
        let (origin, destination, estimate) = planner.plan(origin, destination)?;

        let trip = &mut self.trips[position];
        trip.origin = origin;
        trip.destination = destination;
        trip.distance_km = estimate.distance_km;
        trip.emissions_kg = estimate.emissions_kg;
        Ok(trip)
    }

    pub fn get(&self, id: TripId) -> Option<&TripRecord> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    pub fn remove(&mut self, id: TripId) -> Result<TripRecord, TripError> {
        let position = self
            .trips
            .iter()
            .position(|trip| trip.id == id)
            .ok_or(TripError::UnknownTrip(id))?;
        Ok(self.trips.remove(position))
    }

    pub fn for_user(&self, user_id: UserId) -> impl Iterator<Item = &TripRecord> {
        self.trips.iter().filter(move |trip| trip.user_id == user_id)
    }

    pub fn total_emissions_kg(&self, user_id: UserId) -> f64 {
        self.for_user(user_id).map(|trip| trip.emissions_kg).sum()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
