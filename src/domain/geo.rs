use chrono::NaiveDateTime;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Above this implied speed a movement between two tracked points is
/// considered implausible (teleportation heuristic). Strictly greater-than:
/// exactly 120 km/h is still plausible.
pub const MAX_PLAUSIBLE_SPEED_KMH: f64 = 120.0;

/// A GPS fix with the time it was recorded.
#[derive(Debug, Clone, Copy)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: NaiveDateTime,
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    !latitude.is_nan()
        && !longitude.is_nan()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Great-circle distance in kilometers between two coordinates.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// True when covering `distance_km` in `elapsed_hours` would require a speed
/// strictly above the plausibility threshold. Non-positive elapsed time means
/// no speed can be inferred, so it is never flagged.
pub fn exceeds_plausible_speed(distance_km: f64, elapsed_hours: f64) -> bool {
    if elapsed_hours <= 0.0 {
        return false;
    }
    distance_km / elapsed_hours > MAX_PLAUSIBLE_SPEED_KMH
}

/// Teleportation heuristic between consecutive fixes. Callers log the result,
/// they never block on it.
pub fn is_suspicious_movement(last: &TrackPoint, current: &TrackPoint) -> bool {
    let distance_km = haversine_distance_km(
        last.latitude,
        last.longitude,
        current.latitude,
        current.longitude,
    );
    let elapsed_hours = (current.recorded_at - last.recorded_at).num_seconds() as f64 / 3600.0;

    exceeds_plausible_speed(distance_km, elapsed_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn identical_points_have_zero_distance() {
        assert_eq!(
            haversine_distance_km(28.6139, 77.2090, 28.6139, 77.2090),
            0.0
        );
    }

    #[test]
    fn delhi_to_mumbai_is_about_1150_km() {
        let d = haversine_distance_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((d - 1150.0).abs() < 20.0, "got {d}");
    }

    #[test]
    fn coordinate_validation() {
        assert!(is_valid_coordinate(28.6139, 77.2090));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(!is_valid_coordinate(90.5, 0.0));
        assert!(!is_valid_coordinate(0.0, -180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NAN));
    }

    #[test]
    fn speed_threshold_is_strictly_greater_than() {
        assert!(!exceeds_plausible_speed(120.0, 1.0));
        assert!(exceeds_plausible_speed(120.01, 1.0));
        assert!(!exceeds_plausible_speed(60.0, 1.0));
    }

    #[test]
    fn zero_elapsed_time_is_never_suspicious() {
        assert!(!exceeds_plausible_speed(500.0, 0.0));
        assert!(!exceeds_plausible_speed(500.0, -1.0));
    }

    #[test]
    fn teleportation_between_cities_is_flagged() {
        let last = TrackPoint {
            latitude: 28.6139,
            longitude: 77.2090,
            recorded_at: at(9, 0),
        };
        // Delhi to Mumbai in one hour is not a field visit.
        let current = TrackPoint {
            latitude: 19.0760,
            longitude: 72.8777,
            recorded_at: at(10, 0),
        };
        assert!(is_suspicious_movement(&last, &current));
    }

    #[test]
    fn slow_movement_is_not_flagged() {
        let last = TrackPoint {
            latitude: 28.6139,
            longitude: 77.2090,
            recorded_at: at(9, 0),
        };
        let current = TrackPoint {
            latitude: 28.6239,
            longitude: 77.2190,
            recorded_at: at(10, 0),
        };
        assert!(!is_suspicious_movement(&last, &current));
    }
}
