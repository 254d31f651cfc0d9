/// kg of CO2 per passenger-km of the simple model used when creating trips
pub static KG_CO2_PER_KM_SIMPLE: f64 = 0.115;
/// kg of CO2 per passenger-km of the alternative (higher) estimate
pub static KG_CO2_PER_KM_ALT: f64 = 0.154;

/// A linear emissions model: a fixed amount of CO2 per km flown,
/// independent of aircraft type and class.
/// The factor is finite and non-negative, so emissions are never negative.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EmissionsModel {
    kg_co2_per_km: f64,
}

impl Default for EmissionsModel {
    /// The model with [`KG_CO2_PER_KM_SIMPLE`]
    fn default() -> Self {
        Self {
            kg_co2_per_km: KG_CO2_PER_KM_SIMPLE,
        }
    }
}

impl EmissionsModel {
    /// Returns a model emitting `kg_co2_per_km`, or `None` if the factor
    /// is negative, infinite or NaN.
    pub fn new(kg_co2_per_km: f64) -> Option<Self> {
        (kg_co2_per_km.is_finite() && kg_co2_per_km >= 0.0).then_some(Self { kg_co2_per_km })
    }

    pub fn kg_co2_per_km(&self) -> f64 {
        self.kg_co2_per_km
    }

    /// Returns the emissions in kg of CO2 of flying `distance_km`.
    /// Negative distances are treated as zero.
    pub fn emissions_kg(&self, distance_km: f64) -> f64 {
        distance_km.max(0.0) * self.kg_co2_per_km
    }
}

/// Returns the emissions in kg of CO2 of flying `distance_km`, according to the default [`EmissionsModel`]
pub fn emissions_kg(distance_km: f64) -> f64 {
    EmissionsModel::default().emissions_kg(distance_km)
}
