/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    domain::{action::dispatch::notify_nearby_drivers, types::booking::*},
    environment::AppState,
    redis::keys::{booking_request_key, user_booking_request_key},
};
use actix_web::web::Data;
use chrono::Utc;
use shared::{
    auth::AuthenticatedUser,
    db::parse_db_id,
    kafka::producer::push_to_kafka,
    tools::error::AppError,
    types::{APISuccess, BookedNotification, BookingRequest, BookingStatus, Role, UserId},
    utils::logger::*,
};
use uuid::Uuid;

pub async fn create_booking(
    data: Data<AppState>,
    user: AuthenticatedUser,
    request_body: CreateBookingRequest,
) -> Result<CreateBookingResponse, AppError> {
    user.require_role(Role::User)?;

    let request = BookingRequest {
        request_id: Uuid::new_v4().to_string(),
        user_id: user.id,
        user_name: user.name,
        pickup: request_body.pickup,
        dropoff: request_body.dropoff,
        vehicle_type: request_body.vehicle_type,
        price: request_body.price,
        created_at: Utc::now(),
    };

    let serialized = serde_json::to_string(&request)?;
    data.redis
        .set_with_expiry(
            &booking_request_key(&request.request_id),
            serialized,
            data.pending_request_ttl,
        )
        .await?;
    data.redis
        .set_with_expiry(
            &user_booking_request_key(&UserId(request.user_id.to_owned())),
            request.request_id.to_owned(),
            data.pending_request_ttl,
        )
        .await?;

    info!(tag = "[Booking Request]", request_id = %request.request_id, user_id = %request.user_id, vehicle_type = %request.vehicle_type);

    let request_id = request.request_id.to_owned();
    tokio::spawn(async move {
        if let Err(err) = notify_nearby_drivers(&data, &request).await {
            error!(tag = "[Booking Dispatch]", request_id = %request.request_id, error_code = %err.code(), "{}", err.message());
        }
    });

    Ok(CreateBookingResponse {
        message: "Booking request received".to_string(),
        request_id,
    })
}

/// First driver to accept wins: the pending request is removed with GETDEL, so later accepts miss it.
pub async fn accept_booking(
    data: Data<AppState>,
    driver: AuthenticatedUser,
    request_body: AcceptBookingRequest,
) -> Result<AcceptBookingResponse, AppError> {
    driver.require_role(Role::Driver)?;
    let driver_id = parse_db_id(&driver.id)?;

    let request = data
        .redis
        .get_and_delete_key(&booking_request_key(&request_body.request_id))
        .await?
        .ok_or(AppError::BookingRequestNotFound)?;
    let request: BookingRequest = serde_json::from_str(&request)?;

    if let Err(err) = store_booking(&data, &request, driver_id).await {
        restore_pending_request(&data, &request).await;
        return Err(err);
    }

    if let Err(err) = data
        .redis
        .delete_key(&user_booking_request_key(&UserId(request.user_id.to_owned())))
        .await
    {
        warn!(tag = "[Booking Accept]", user_id = %request.user_id, "{}", err.message());
    }

    publish_booking_event(
        &data,
        BookedNotification {
            user_id: request.user_id.to_owned(),
            driver_id: driver.id,
            driver_name: driver.name,
            status: BookingStatus::Booked,
        },
    )
    .await;

    Ok(AcceptBookingResponse {
        message: "Booking accepted".to_string(),
        user_id: request.user_id,
    })
}

pub async fn update_booking(
    data: Data<AppState>,
    driver: AuthenticatedUser,
    user_id: String,
    request_body: UpdateBookingRequest,
) -> Result<APISuccess, AppError> {
    driver.require_role(Role::Driver)?;

    let status = request_body.status;
    if !status.is_driver_settable() {
        return Err(AppError::InvalidRequest(format!(
            "Booking status cannot be set to {status}"
        )));
    }

    let result = sqlx::query(
        "UPDATE booking SET status = $1, \
         completed_at = CASE WHEN $2 THEN NOW() ELSE completed_at END \
         WHERE user_id = $3 AND driver_id = $4 AND status NOT IN ('completed', 'cancelled')",
    )
    .bind(status.to_string())
    .bind(status.is_terminal())
    .bind(parse_db_id(&user_id)?)
    .bind(parse_db_id(&driver.id)?)
    .execute(&data.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BookingNotFound);
    }

    info!(tag = "[Booking Updated]", %user_id, driver_id = %driver.id, %status);

    publish_booking_event(
        &data,
        BookedNotification {
            user_id,
            driver_id: driver.id,
            driver_name: driver.name,
            status,
        },
    )
    .await;

    Ok(APISuccess::new("Booking updated"))
}

async fn store_booking(
    data: &AppState,
    request: &BookingRequest,
    driver_id: i32,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO booking (user_id, driver_id, pickup_latitude, pickup_longitude, pickup_name, \
         dropoff_latitude, dropoff_longitude, dropoff_name, vehicle_type, price, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(parse_db_id(&request.user_id)?)
    .bind(driver_id)
    .bind(request.pickup.latitude)
    .bind(request.pickup.longitude)
    .bind(&request.pickup.name)
    .bind(request.dropoff.latitude)
    .bind(request.dropoff.longitude)
    .bind(&request.dropoff.name)
    .bind(request.vehicle_type.to_string())
    .bind(request.price)
    .bind(BookingStatus::EnrouteToPickup.to_string())
    .execute(&data.db)
    .await?;

    Ok(())
}

/// Puts a request taken by GETDEL back so that another driver can still accept it.
async fn restore_pending_request(data: &AppState, request: &BookingRequest) {
    let restored = match serde_json::to_string(request) {
        Ok(serialized) => {
            data.redis
                .set_with_expiry(
                    &booking_request_key(&request.request_id),
                    serialized,
                    data.pending_request_ttl,
                )
                .await
        }
        Err(err) => Err(AppError::from(err)),
    };

    match restored {
        Ok(()) => {
            info!(tag = "[Booking Accept]", request_id = %request.request_id, "Pending request restored")
        }
        Err(err) => {
            error!(tag = "[Booking Accept]", request_id = %request.request_id, "Failed to restore pending request : {}", err.message())
        }
    }
}

/// The booking row is already committed, so a failed publish is logged rather than surfaced.
async fn publish_booking_event(data: &AppState, event: BookedNotification) {
    let key = event.user_id.to_owned();
    if let Err(err) = push_to_kafka(
        &data.producer,
        &data.booking_notification_topic,
        &key,
        event,
    )
    .await
    {
        error!(tag = "[Booking Event]", user_id = %key, "{}", err.message());
    }
}
