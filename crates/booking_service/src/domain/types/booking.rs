/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{BookingRequest, BookingStatus, GeoPoint, VehicleType};
use sqlx::FromRow;

/// Body of `POST /booking`. Caller identity and timestamps are filled in server-side.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub message: String,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AcceptBookingRequest {
    #[serde(alias = "mongo_id")]
    pub request_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptBookingResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub driver_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub price: f64,
    pub vehicle_type: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
}

/// Whose name a booking query joined in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Counterpart {
    User,
    Driver,
}

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: i32,
    pub user_id: i32,
    pub driver_id: i32,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub pickup_name: String,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_name: String,
    pub vehicle_type: String,
    pub price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub counterpart_name: String,
}

impl BookingRow {
    pub fn into_booking(self, counterpart: Counterpart) -> Booking {
        let (user_name, driver_name) = match counterpart {
            Counterpart::User => (Some(self.counterpart_name), None),
            Counterpart::Driver => (None, Some(self.counterpart_name)),
        };

        Booking {
            id: self.id,
            user_id: self.user_id,
            user_name,
            driver_id: self.driver_id,
            driver_name,
            price: self.price,
            vehicle_type: self.vehicle_type,
            pickup: GeoPoint {
                latitude: self.pickup_latitude,
                longitude: self.pickup_longitude,
                name: self.pickup_name,
            },
            dropoff: GeoPoint {
                latitude: self.dropoff_latitude,
                longitude: self.dropoff_longitude,
                name: self.dropoff_name,
            },
            created_at: self.created_at,
            completed_at: self.completed_at,
            status: self.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserBookingResponse {
    pub booking_request: Option<BookingRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

#[derive(Debug, Serialize)]
pub struct DriverBookingResponse {
    pub booking: Booking,
}

#[derive(Debug, Serialize)]
pub struct BookingHistoryResponse {
    pub bookings: Vec<Booking>,
}
