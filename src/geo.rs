/// Mean radius of the Earth in km, as used by the haversine formula.
/// `geoutils` uses a different radius, so it only cross-checks [`distance_km`] in tests.
pub static EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the great-circle distance in km between two geo-points in degrees,
/// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula)
/// on a spherical Earth.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding can push `a` slightly above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Returns the distance in km between two `(latitude, longitude)` pairs
pub fn distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    distance_km(from.0, from.1, to.0, to.1)
}

#[cfg(test)]
mod test {
    use super::*;

    static LAX: (f64, f64) = (33.9416, -118.4085);
    static JFK: (f64, f64) = (40.6413, -73.7781);
    static LHR: (f64, f64) = (51.4700, -0.4543);
    static SYD: (f64, f64) = (-33.9399, 151.1753);

    #[test]
    fn lax_jfk() {
        let expected = 3983.0;
        assert!((distance(LAX, JFK) - expected).abs() / expected < 0.01);
    }

    #[test]
    fn symmetric() {
        for (a, b) in [(LAX, JFK), (LHR, SYD), (JFK, SYD), ((0.0, 179.9), (0.0, -179.9))] {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn identical_points() {
        for a in [LAX, JFK, LHR, SYD, (90.0, 0.0), (0.0, 0.0)] {
            assert_eq!(distance(a, a), 0.0);
        }
    }

    #[test]
    fn antipodes() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance((0.0, 0.0), (0.0, 180.0)) - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn matches_geoutils() {
        for (a, b) in [(LAX, JFK), (LHR, SYD)] {
            let expected = geoutils::Location::new(a.0, a.1)
                .haversine_distance_to(&geoutils::Location::new(b.0, b.1))
                .meters()
                / 1000.0;
            // geoutils uses a slightly different earth radius
            assert!((distance(a, b) - expected).abs() / expected < 0.001);
        }
    }
}
