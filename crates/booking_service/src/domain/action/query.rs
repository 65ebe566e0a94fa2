/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    domain::types::booking::*,
    environment::AppState,
    redis::keys::{booking_request_key, user_booking_request_key},
};
use actix_web::web::Data;
use shared::{
    auth::AuthenticatedUser,
    db::parse_db_id,
    tools::error::AppError,
    types::{BookingRequest, Role, UserId},
};

const BOOKING_COLUMNS: &str = "b.id, b.user_id, b.driver_id, b.pickup_latitude, b.pickup_longitude, \
     b.pickup_name, b.dropoff_latitude, b.dropoff_longitude, b.dropoff_name, b.vehicle_type, b.price, \
     b.status, b.created_at, b.completed_at";

async fn pending_request(
    data: &AppState,
    user_id: &UserId,
) -> Result<Option<BookingRequest>, AppError> {
    let Some(request_id) = data
        .redis
        .get_key(&user_booking_request_key(user_id))
        .await?
    else {
        return Ok(None);
    };

    match data.redis.get_key(&booking_request_key(&request_id)).await? {
        Some(request) => Ok(Some(serde_json::from_str(&request)?)),
        None => Ok(None),
    }
}

pub async fn get_user_booking(
    data: Data<AppState>,
    user: AuthenticatedUser,
) -> Result<UserBookingResponse, AppError> {
    user.require_role(Role::User)?;

    if let Some(request) = pending_request(&data, &UserId(user.id.to_owned())).await? {
        return Ok(UserBookingResponse {
            booking_request: Some(request),
            booking: None,
        });
    }

    let booking = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS}, d.name AS counterpart_name FROM booking b \
         INNER JOIN vehicle_drivers d ON d.id = b.driver_id \
         WHERE b.user_id = $1 AND b.status NOT IN ('completed', 'cancelled') \
         ORDER BY b.created_at DESC LIMIT 1"
    ))
    .bind(parse_db_id(&user.id)?)
    .fetch_optional(&data.db)
    .await?
    .ok_or(AppError::NoBookingFound)?;

    Ok(UserBookingResponse {
        booking_request: None,
        booking: Some(booking.into_booking(Counterpart::Driver)),
    })
}

pub async fn get_user_booking_history(
    data: Data<AppState>,
    user: AuthenticatedUser,
) -> Result<BookingHistoryResponse, AppError> {
    user.require_role(Role::User)?;

    let bookings = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS}, d.name AS counterpart_name FROM booking b \
         INNER JOIN vehicle_drivers d ON d.id = b.driver_id \
         WHERE b.user_id = $1 ORDER BY b.created_at DESC"
    ))
    .bind(parse_db_id(&user.id)?)
    .fetch_all(&data.db)
    .await?;

    history(bookings, Counterpart::Driver)
}

pub async fn get_driver_booking(
    data: Data<AppState>,
    driver: AuthenticatedUser,
) -> Result<DriverBookingResponse, AppError> {
    driver.require_role(Role::Driver)?;

    let booking = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS}, u.name AS counterpart_name FROM booking b \
         INNER JOIN users u ON u.id = b.user_id \
         WHERE b.driver_id = $1 AND b.status NOT IN ('completed', 'cancelled') \
         ORDER BY b.created_at DESC LIMIT 1"
    ))
    .bind(parse_db_id(&driver.id)?)
    .fetch_optional(&data.db)
    .await?
    .ok_or(AppError::NoBookingFound)?;

    Ok(DriverBookingResponse {
        booking: booking.into_booking(Counterpart::User),
    })
}

pub async fn get_driver_booking_history(
    data: Data<AppState>,
    driver: AuthenticatedUser,
) -> Result<BookingHistoryResponse, AppError> {
    driver.require_role(Role::Driver)?;

    let bookings = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS}, u.name AS counterpart_name FROM booking b \
         INNER JOIN users u ON u.id = b.user_id \
         WHERE b.driver_id = $1 ORDER BY b.created_at DESC"
    ))
    .bind(parse_db_id(&driver.id)?)
    .fetch_all(&data.db)
    .await?;

    history(bookings, Counterpart::User)
}

fn history(
    rows: Vec<BookingRow>,
    counterpart: Counterpart,
) -> Result<BookingHistoryResponse, AppError> {
    if rows.is_empty() {
        return Err(AppError::NoBookingFound);
    }

    Ok(BookingHistoryResponse {
        bookings: rows
            .into_iter()
            .map(|row| row.into_booking(counterpart))
            .collect(),
    })
}
