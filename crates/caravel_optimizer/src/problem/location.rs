use geo::{Distance, Haversine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
        }
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    /// Great-circle distance in kilometres on the mean-radius sphere.
    pub fn haversine_km(&self, to: &Location) -> f64 {
        Haversine.distance(self.point, to.point) / 1000.0
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Location::from_lat_lon(0.0, 0.0);
        let b = Location::from_lat_lon(1.0, 0.0);

        let d = a.haversine_km(&b);
        assert!((d - 111.195).abs() < 0.1, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Location::from_lat_lon(10.96, -74.8);
        let b = Location::from_lat_lon(10.4, -75.5);

        assert_eq!(a.haversine_km(&b), b.haversine_km(&a));
        assert_eq!(a.haversine_km(&a), 0.0);
    }
}
