/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use shared::{
    auth::AuthenticatedUser,
    redis::keys::driver_vehicle_type_key,
    tools::error::AppError,
    types::{APISuccess, DriverId, Role},
    utils::logger::*,
};

use super::{analytics::FLEET_STATS_CACHE_KEY, run_query};
use crate::{domain::types::fleet::UpdateVehicleRequest, environment::AppState};

pub async fn update_vehicle(
    data: Data<AppState>,
    caller: AuthenticatedUser,
    request: UpdateVehicleRequest,
) -> Result<APISuccess, AppError> {
    caller.require_role(Role::Admin)?;

    let db = &data.db;
    let vehicle = &request;
    let updated = run_query(&data, || async move {
        sqlx::query(
            "UPDATE vehicle_drivers \
             SET name = $1, vehicle_id = $2, email = $3, vehicle_type = $4, vehicle_volume = $5 \
             WHERE id = $6",
        )
        .bind(&vehicle.name)
        .bind(&vehicle.vehicle_id)
        .bind(&vehicle.email)
        .bind(vehicle.vehicle_type.to_string())
        .bind(&vehicle.vehicle_volume)
        .bind(vehicle.id)
        .execute(db)
        .await
        .map(|result| result.rows_affected())
        .map_err(AppError::from)
    })
    .await?;

    if updated == 0 {
        return Err(AppError::VehicleNotFound(request.id));
    }

    data.fleet_stats_cache.invalidate(FLEET_STATS_CACHE_KEY).await;

    // Booking dispatch matches drivers on the cached vehicle type.
    let driver_id = DriverId(request.id.to_string());
    if let Err(err) = data
        .redis
        .delete_key(&driver_vehicle_type_key(&driver_id))
        .await
    {
        warn!(tag = "[Update Vehicle]", driver_id = request.id, "{}", err.message());
    }

    info!(tag = "[Update Vehicle]", driver_id = request.id, vehicle_type = %request.vehicle_type, "Vehicle updated");

    Ok(APISuccess::new("Vehicle updated successfully"))
}
