/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Latitude(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Longitude(pub f64);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
}

impl GeoPoint {
    pub fn new(Latitude(latitude): Latitude, Longitude(longitude): Longitude) -> Self {
        GeoPoint {
            latitude,
            longitude,
            name: String::new(),
        }
    }

    /// (0, 0) is how a client reports that it has no position, i.e. went offline.
    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    LightTruck,
    Van,
    Truck,
    HeavyTruck,
    Trailer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    /// Published when a driver accepts a request; stored bookings start at `EnrouteToPickup`.
    Booked,
    EnrouteToPickup,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Completed and cancelled bookings never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Statuses a driver may move a stored booking to.
    pub fn is_driver_settable(&self) -> bool {
        !matches!(self, BookingStatus::Pending | BookingStatus::Booked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Driver,
    Admin,
}

/// A user's request for a vehicle, kept pending until a driver accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default, alias = "mongo_id")]
    pub request_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Offer of a pending request to one driver, published on `driver_notification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingNotification {
    pub user_id: String,
    pub driver_id: String,
    pub price: f64,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub user_name: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub mongo_id: String,
}

impl BookingNotification {
    pub fn offer(request: &BookingRequest, DriverId(driver_id): &DriverId) -> Self {
        BookingNotification {
            user_id: request.user_id.to_owned(),
            driver_id: driver_id.to_owned(),
            price: request.price,
            pickup: request.pickup.to_owned(),
            dropoff: request.dropoff.to_owned(),
            user_name: request.user_name.to_owned(),
            request_id: request.request_id.to_owned(),
            mongo_id: request.request_id.to_owned(),
        }
    }
}

/// Status change of a booking, published on `booking_notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedNotification {
    pub user_id: String,
    pub driver_id: String,
    #[serde(default)]
    pub driver_name: String,
    pub status: BookingStatus,
}

/// Last known position of a driver, published on `driver_locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocation {
    pub driver_id: String,
    pub location: GeoPoint,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl DriverLocation {
    pub fn offline(DriverId(driver_id): &DriverId) -> Self {
        DriverLocation {
            driver_id: driver_id.to_owned(),
            location: GeoPoint::default(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct APISuccess {
    pub message: String,
}

impl APISuccess {
    pub fn new(message: &str) -> Self {
        APISuccess {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn vehicle_types_use_snake_case_on_the_wire() {
        assert_eq!(
            VehicleType::from_str("heavy_truck").ok(),
            Some(VehicleType::HeavyTruck)
        );
        assert_eq!(VehicleType::LightTruck.to_string(), "light_truck");
        assert_eq!(
            serde_json::to_string(&VehicleType::Trailer).expect("serializes"),
            "\"trailer\""
        );
        assert!(VehicleType::from_str("bicycle").is_err());
    }

    #[test]
    fn terminal_booking_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::EnrouteToPickup.is_terminal());
        assert!(!BookingStatus::Booked.is_driver_settable());
        assert!(BookingStatus::InProgress.is_driver_settable());
        assert_eq!(
            BookingStatus::from_str("enroute_to_pickup").ok(),
            Some(BookingStatus::EnrouteToPickup)
        );
    }

    #[test]
    fn booking_request_accepts_legacy_mongo_id() {
        let request: BookingRequest = serde_json::from_str(
            r#"{
                "mongo_id": "abc",
                "pickup": {"latitude": 12.9, "longitude": 77.6, "name": "Depot"},
                "dropoff": {"latitude": 13.0, "longitude": 77.7},
                "vehicle_type": "van",
                "price": 42.5
            }"#,
        )
        .expect("valid booking request");

        assert_eq!(request.request_id, "abc");
        assert_eq!(request.dropoff.name, "");
        assert_eq!(request.vehicle_type, VehicleType::Van);
        assert!(request.user_id.is_empty());
    }

    #[test]
    fn offer_carries_request_id_under_both_names() {
        let request = BookingRequest {
            request_id: "req-1".to_string(),
            user_id: "7".to_string(),
            user_name: "Asha".to_string(),
            pickup: GeoPoint::new(Latitude(1.0), Longitude(2.0)),
            dropoff: GeoPoint::new(Latitude(3.0), Longitude(4.0)),
            vehicle_type: VehicleType::Truck,
            price: 10.0,
            created_at: Utc::now(),
        };

        let offer = BookingNotification::offer(&request, &DriverId("3".to_string()));
        let json = serde_json::to_value(&offer).expect("serializes");
        assert_eq!(json["request_id"], "req-1");
        assert_eq!(json["mongo_id"], "req-1");
        assert_eq!(json["driver_id"], "3");
    }

    #[test]
    fn offline_location_sits_at_origin() {
        let location = DriverLocation::offline(&DriverId("9".to_string()));
        assert!(location.location.is_origin());
        assert!(!GeoPoint::new(Latitude(0.0), Longitude(0.1)).is_origin());
    }
}
