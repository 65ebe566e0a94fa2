/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use chrono::Utc;
use shared::{
    auth::AuthenticatedUser,
    kafka::producer::push_to_kafka,
    redis::keys::driver_locations_key,
    tools::error::AppError,
    types::{APISuccess, DriverLocation, GeoPoint, Latitude, Longitude, Role},
};

use crate::{
    domain::types::{LocationHealthResponse, LocationUpdateRequest},
    environment::AppState,
};

pub async fn update_location(
    data: Data<AppState>,
    driver: AuthenticatedUser,
    request: LocationUpdateRequest,
) -> Result<APISuccess, AppError> {
    driver.require_role(Role::Driver)?;

    let location = DriverLocation {
        driver_id: driver.id.to_owned(),
        location: GeoPoint::new(Latitude(request.latitude), Longitude(request.longitude)),
        timestamp: Utc::now(),
    };

    push_to_kafka(
        &data.producer,
        &data.driver_location_topic,
        &driver.id,
        location,
    )
    .await?;

    Ok(APISuccess::new("Location updated"))
}

pub async fn location_health(data: Data<AppState>) -> Result<LocationHealthResponse, AppError> {
    data.redis.ping().await?;
    let tracked_drivers = data.redis.zcard(&driver_locations_key()).await?;

    Ok(LocationHealthResponse {
        result: "Service Is Up".to_string(),
        tracked_drivers,
    })
}
