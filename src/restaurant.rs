//! Restaurants and the geographic helpers used to search them
use super::error::ValidationError;
use super::types::{ClockTime, TimeStamp};
use chrono::Utc;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    #[n(0)]
    pub lat: f64,
    #[n(1)]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Restaurant {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub owner_id: String, // authorization anchor for listings and orders
    #[n(2)]
    pub name: String,
    #[n(3)]
    pub address: String,
    #[n(4)]
    pub coordinates: Coordinates,
    #[n(5)]
    pub closing_time: ClockTime,
    #[n(6)]
    pub created_at: TimeStamp<Utc>,
}

impl Restaurant {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

// used for constructing a restaurant before it is registered
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestaurantDraft {
    name: Option<String>,
    address: Option<String>,
    coordinates: Option<Coordinates>,
    closing_time: Option<ClockTime>,
}

impl RestaurantDraft {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn set_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }
    pub fn set_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lng));
        self
    }
    pub fn set_closing_time(mut self, closing_time: ClockTime) -> Self {
        self.closing_time = Some(closing_time);
        self
    }
    /// Checks every field and produces the record to persist.
    pub fn validate_and_finalise(
        self,
        id: String,
        owner_id: String,
    ) -> Result<Restaurant, ValidationError> {
        let name = non_empty(self.name, "name")?;
        let address = non_empty(self.address, "address")?;
        let coordinates = self
            .coordinates
            .ok_or(ValidationError::MissingField("coordinates"))?;
        if !coordinates.is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                lat: coordinates.lat,
                lng: coordinates.lng,
            });
        }
        let closing_time = self
            .closing_time
            .ok_or(ValidationError::MissingField("closing time"))?;

        Ok(Restaurant {
            id,
            owner_id,
            name,
            address,
            coordinates,
            closing_time,
            created_at: TimeStamp::new(),
        })
    }
}

pub(crate) fn non_empty(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_known_cities() {
        let london = Coordinates::new(51.5074, -0.1278);
        let paris = Coordinates::new(48.8566, 2.3522);

        let d = london.distance_km(&paris);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        let here = Coordinates::new(-33.87, 151.21);
        assert!(here.distance_km(&here).abs() < 1e-9);
    }

    #[test]
    fn draft_rejects_out_of_range_coordinates() {
        let draft = RestaurantDraft::new()
            .set_name("Noodle Bar")
            .set_address("1 High St")
            .set_coordinates(91.0, 0.0)
            .set_closing_time(ClockTime::new(22, 0).unwrap());

        let err = draft
            .validate_and_finalise("rest1".into(), "user1".into())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCoordinates { .. }));
    }

    #[test]
    fn draft_rejects_blank_name() {
        let draft = RestaurantDraft::new()
            .set_name("   ")
            .set_address("1 High St")
            .set_coordinates(10.0, 10.0)
            .set_closing_time(ClockTime::new(22, 0).unwrap());

        assert_eq!(
            draft.validate_and_finalise("rest1".into(), "user1".into()),
            Err(ValidationError::MissingField("name"))
        );
    }
}
