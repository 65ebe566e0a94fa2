/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};
use shared::types::{BookingStatus, VehicleType};
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total_vehicles: i64,
    pub active_vehicles: i64,
    pub vehicle_type_breakdown: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverPerformance {
    #[serde(rename = "driverID")]
    pub driver_id: i32,
    pub name: String,
    pub trip_count: i64,
    pub avg_trip_time: f64,
    pub total_revenue: f64,
}

#[derive(FromRow)]
pub struct DriverPerformanceRow {
    pub driver_id: i32,
    pub name: String,
    pub trip_count: i64,
    pub avg_trip_secs: Option<f64>,
    pub total_revenue: Option<f64>,
}

impl From<DriverPerformanceRow> for DriverPerformance {
    fn from(row: DriverPerformanceRow) -> Self {
        DriverPerformance {
            driver_id: row.driver_id,
            name: row.name,
            trip_count: row.trip_count,
            avg_trip_time: row.avg_trip_secs.unwrap_or_default() / 60.0,
            total_revenue: row.total_revenue.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAnalytics {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub avg_trip_time: f64,
    pub total_revenue: f64,
}

#[derive(FromRow)]
pub struct BookingAnalyticsRow {
    pub total_bookings: Option<i64>,
    pub completed_bookings: Option<i64>,
    pub cancelled_bookings: Option<i64>,
    pub avg_trip_secs: Option<f64>,
    pub total_revenue: Option<f64>,
}

impl From<BookingAnalyticsRow> for BookingAnalytics {
    fn from(row: BookingAnalyticsRow) -> Self {
        BookingAnalytics {
            total_bookings: row.total_bookings.unwrap_or_default(),
            completed_bookings: row.completed_bookings.unwrap_or_default(),
            cancelled_bookings: row.cancelled_bookings.unwrap_or_default(),
            avg_trip_time: row.avg_trip_secs.unwrap_or_default() / 60.0,
            total_revenue: row.total_revenue.unwrap_or_default(),
        }
    }
}

pub const IDLE: &str = "idle";
pub const OFFLINE: &str = "offline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLocation {
    pub id: i32,
    pub name: String,
    pub vehicle_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
}

/// A driver joined with the booking it is currently serving, if any.
#[derive(FromRow)]
pub struct VehicleLocationRow {
    pub id: i32,
    pub name: String,
    pub vehicle_type: String,
    pub pickup_latitude: Option<f64>,
    pub pickup_longitude: Option<f64>,
    pub status: Option<String>,
}

impl VehicleLocationRow {
    /// `live` is the driver's last reported position and wins over the booking's pickup point.
    pub fn into_location(self, live: Option<(f64, f64)>) -> VehicleLocation {
        let (status, booked_position) = match self.status {
            Some(status) => (
                status,
                (
                    self.pickup_latitude.unwrap_or_default(),
                    self.pickup_longitude.unwrap_or_default(),
                ),
            ),
            None => (IDLE.to_string(), (0.0, 0.0)),
        };

        let (latitude, longitude) = live.unwrap_or(booked_position);
        let status = if latitude == 0.0 && longitude == 0.0 {
            OFFLINE.to_string()
        } else {
            status
        };

        VehicleLocation {
            id: self.id,
            name: self.name,
            vehicle_type: self.vehicle_type,
            latitude,
            longitude,
            status,
        }
    }
}

/// Statuses during which a driver is considered to be on a trip.
pub fn on_trip_statuses() -> [String; 2] {
    [
        BookingStatus::InProgress.to_string(),
        BookingStatus::EnrouteToPickup.to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub id: i32,
    pub name: String,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: String,
    pub email: String,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub vehicle_volume: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: Option<&str>, pickup: Option<(f64, f64)>) -> VehicleLocationRow {
        VehicleLocationRow {
            id: 4,
            name: "Ravi".to_string(),
            vehicle_type: "van".to_string(),
            pickup_latitude: pickup.map(|p| p.0),
            pickup_longitude: pickup.map(|p| p.1),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn driver_without_booking_or_position_is_offline() {
        let location = row(None, None).into_location(None);
        assert_eq!(location.status, OFFLINE);
        assert_eq!((location.latitude, location.longitude), (0.0, 0.0));
    }

    #[test]
    fn driver_without_booking_but_live_position_is_idle() {
        let location = row(None, None).into_location(Some((18.52, 73.85)));
        assert_eq!(location.status, IDLE);
        assert_eq!((location.latitude, location.longitude), (18.52, 73.85));
    }

    #[test]
    fn booked_driver_falls_back_to_pickup_point() {
        let location = row(Some("enroute_to_pickup"), Some((12.97, 77.59))).into_location(None);
        assert_eq!(location.status, "enroute_to_pickup");
        assert_eq!((location.latitude, location.longitude), (12.97, 77.59));
    }

    #[test]
    fn live_position_overrides_pickup_point() {
        let location =
            row(Some("in_progress"), Some((12.97, 77.59))).into_location(Some((13.0, 77.6)));
        assert_eq!(location.status, "in_progress");
        assert_eq!((location.latitude, location.longitude), (13.0, 77.6));
    }

    #[test]
    fn analytics_nulls_become_zero_and_time_is_in_minutes() {
        let analytics = BookingAnalytics::from(BookingAnalyticsRow {
            total_bookings: Some(3),
            completed_bookings: Some(2),
            cancelled_bookings: None,
            avg_trip_secs: Some(900.0),
            total_revenue: None,
        });

        assert_eq!(analytics.total_bookings, 3);
        assert_eq!(analytics.cancelled_bookings, 0);
        assert_eq!(analytics.avg_trip_time, 15.0);
        assert_eq!(analytics.total_revenue, 0.0);
    }

    #[test]
    fn performance_uses_dashboard_field_names() {
        let performance = DriverPerformance::from(DriverPerformanceRow {
            driver_id: 9,
            name: "Asha".to_string(),
            trip_count: 4,
            avg_trip_secs: Some(1800.0),
            total_revenue: Some(420.5),
        });

        let json = serde_json::to_value(&performance).expect("serializable");
        assert_eq!(json["driverID"], 9);
        assert_eq!(json["tripCount"], 4);
        assert_eq!(json["avgTripTime"], 30.0);
        assert_eq!(json["totalRevenue"], 420.5);
    }

    #[test]
    fn update_vehicle_rejects_unknown_vehicle_type() {
        let body = r#"{"id": 1, "name": "Ravi", "vehicleID": "KA-01", "email": "r@x.com", "vehicleType": "bicycle", "vehicleVolume": "2"}"#;
        assert!(serde_json::from_str::<UpdateVehicleRequest>(body).is_err());

        let body = r#"{"id": 1, "name": "Ravi", "vehicleID": "KA-01", "email": "r@x.com", "vehicleType": "heavy_truck"}"#;
        let request: UpdateVehicleRequest = serde_json::from_str(body).expect("valid body");
        assert_eq!(request.vehicle_type, VehicleType::HeavyTruck);
        assert_eq!(request.vehicle_volume, "");
    }
}
