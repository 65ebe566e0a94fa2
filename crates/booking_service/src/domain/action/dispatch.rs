/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::environment::AppState;
use shared::{
    db::parse_db_id,
    kafka::producer::push_to_kafka,
    redis::keys::{driver_locations_key, driver_vehicle_type_key},
    tools::error::AppError,
    types::{BookingNotification, BookingRequest, DriverId, VehicleType},
    utils::logger::*,
};
use std::str::FromStr;

/// Offers `request` to every driver within the search radius of its pickup whose vehicle matches.
pub async fn notify_nearby_drivers(
    data: &AppState,
    request: &BookingRequest,
) -> Result<usize, AppError> {
    let drivers = data
        .redis
        .geo_search_members(
            &driver_locations_key(),
            &request.pickup,
            data.search_radius_km,
        )
        .await?;

    let mut notified = 0;
    for driver_id in drivers.into_iter().map(DriverId) {
        match driver_vehicle_type(data, &driver_id).await {
            Ok(Some(vehicle_type)) if vehicle_type == request.vehicle_type => {}
            Ok(_) => continue,
            Err(err) => {
                warn!(tag = "[Booking Dispatch]", driver_id = %driver_id.0, "{}", err.message());
                continue;
            }
        }

        let offer = BookingNotification::offer(request, &driver_id);
        match push_to_kafka(
            &data.producer,
            &data.driver_notification_topic,
            &driver_id.0,
            offer,
        )
        .await
        {
            Ok(()) => notified += 1,
            Err(err) => {
                error!(tag = "[Booking Dispatch]", driver_id = %driver_id.0, "{}", err.message())
            }
        }
    }

    info!(tag = "[Booking Dispatch]", request_id = %request.request_id, %notified);

    Ok(notified)
}

/// Vehicle type of a driver from the Redis cache, falling back to Postgres and refilling the cache.
pub async fn driver_vehicle_type(
    data: &AppState,
    driver_id: &DriverId,
) -> Result<Option<VehicleType>, AppError> {
    let key = driver_vehicle_type_key(driver_id);

    if let Some(cached) = data.redis.get_key(&key).await? {
        if let Ok(vehicle_type) = VehicleType::from_str(&cached) {
            return Ok(Some(vehicle_type));
        }
    }

    let stored: Option<(String,)> =
        sqlx::query_as("SELECT vehicle_type FROM vehicle_drivers WHERE id = $1")
            .bind(parse_db_id(&driver_id.0)?)
            .fetch_optional(&data.db)
            .await?;

    let Some(vehicle_type) = stored.and_then(|(stored,)| VehicleType::from_str(&stored).ok())
    else {
        return Ok(None);
    };

    if let Err(err) = data
        .redis
        .set_with_expiry(&key, vehicle_type.to_string(), data.vehicle_type_cache_ttl)
        .await
    {
        warn!(tag = "[Vehicle Type Cache]", driver_id = %driver_id.0, "{}", err.message());
    }

    Ok(Some(vehicle_type))
}
