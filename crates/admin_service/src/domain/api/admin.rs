/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    get, post,
    web::{Data, Json},
};
use shared::{auth::AuthenticatedUser, tools::error::AppError, types::APISuccess};

use crate::{
    domain::{
        action::{analytics, vehicle},
        types::fleet::*,
    },
    environment::AppState,
};

#[get("/fleet-stats")]
async fn fleet_stats(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<FleetStats>, AppError> {
    Ok(Json(analytics::fleet_stats(data, caller).await?))
}

#[get("/driver-performance")]
async fn driver_performance(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Vec<DriverPerformance>>, AppError> {
    Ok(Json(analytics::driver_performance(data, caller).await?))
}

#[get("/booking-analytics")]
async fn booking_analytics(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<BookingAnalytics>, AppError> {
    Ok(Json(analytics::booking_analytics(data, caller).await?))
}

#[get("/vehicle-locations")]
async fn vehicle_locations(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Vec<VehicleLocation>>, AppError> {
    Ok(Json(analytics::vehicle_locations(data, caller).await?))
}

#[post("/update-vehicle")]
async fn update_vehicle(
    data: Data<AppState>,
    caller: AuthenticatedUser,
    param_obj: Json<UpdateVehicleRequest>,
) -> Result<Json<APISuccess>, AppError> {
    Ok(Json(
        vehicle::update_vehicle(data, caller, param_obj.into_inner()).await?,
    ))
}
