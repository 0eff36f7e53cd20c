const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two WGS84 coordinates, in meters.
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Whether a point lies inside the circular geofence.
pub fn within_geofence(
    lat: f64,
    lng: f64,
    center_lat: f64,
    center_lng: f64,
    radius_meters: f64,
) -> bool {
    haversine_meters(lat, lng, center_lat, center_lng) <= radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_meters(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_meters(40.0, -74.0, 41.0, -74.0);
        assert!((d - 111_195.0).abs() < 500.0, "got {}", d);
    }

    #[test]
    fn geofence_accepts_nearby_and_rejects_far_points() {
        let (center_lat, center_lng) = (40.7128, -74.0060);

        // ~60m north of center
        let near_lat = center_lat + 0.00054;
        assert!(within_geofence(near_lat, center_lng, center_lat, center_lng, 100.0));

        // ~550m north of center
        let far_lat = center_lat + 0.005;
        assert!(!within_geofence(far_lat, center_lng, center_lat, center_lng, 100.0));
    }

    #[test]
    fn boundary_is_inclusive() {
        let d = haversine_meters(40.7128, -74.0060, 40.7128, -74.0070);
        assert!(within_geofence(40.7128, -74.0070, 40.7128, -74.0060, d));
    }
}
