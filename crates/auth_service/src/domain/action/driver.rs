/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{registration_error, validate_non_empty};
use crate::{domain::types::driver::*, domain::types::user::LoginRequest, environment::AppState};
use actix_web::web::Data;
use chrono::Duration;
use shared::{
    auth::{hash_password, issue_token, verify_password, AuthenticatedUser},
    db::parse_db_id,
    redis::keys::driver_vehicle_type_key,
    tools::error::AppError,
    types::{APISuccess, DriverId, Role, VehicleType},
    utils::logger::*,
};
use std::str::FromStr;

pub async fn register_driver(
    data: Data<AppState>,
    request_body: RegisterDriverRequest,
) -> Result<APISuccess, AppError> {
    validate_non_empty(&[
        ("name", request_body.name.as_str()),
        ("vehicleID", request_body.vehicle_id.as_str()),
        ("email", request_body.email.as_str()),
        ("password", request_body.password.as_str()),
    ])?;

    let vehicle_type = VehicleType::from_str(request_body.vehicle_type.trim()).map_err(|_| {
        AppError::InvalidRequest(format!(
            "Invalid vehicle type : {}",
            request_body.vehicle_type
        ))
    })?;

    let email = request_body.email.trim();
    let password = hash_password(&request_body.password)?;

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO vehicle_drivers (vehicle_id, name, email, password, vehicle_type, vehicle_volume) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(request_body.vehicle_id.trim())
    .bind(request_body.name.trim())
    .bind(email)
    .bind(password)
    .bind(vehicle_type.to_string())
    .bind(request_body.vehicle_volume.trim())
    .fetch_one(&data.db)
    .await
    .map_err(|err| registration_error(err, email))?;

    let driver_id = DriverId(id.to_string());
    if let Err(err) = data
        .redis
        .set_with_expiry(
            &driver_vehicle_type_key(&driver_id),
            vehicle_type.to_string(),
            data.vehicle_type_cache_ttl,
        )
        .await
    {
        warn!(tag = "[Vehicle Type Cache]", driver_id = %id, "{}", err.message());
    }

    info!(tag = "[Driver Registered]", driver_id = %id, %vehicle_type);

    Ok(APISuccess::new("Driver registered successfully"))
}

pub async fn login_driver(
    data: Data<AppState>,
    request_body: LoginRequest,
) -> Result<DriverLoginResponse, AppError> {
    let credentials = sqlx::query_as::<_, DriverCredentials>(
        "SELECT id, name, password FROM vehicle_drivers WHERE email = $1",
    )
    .bind(request_body.email.trim())
    .fetch_optional(&data.db)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request_body.password, &credentials.password) {
        return Err(AppError::InvalidCredentials);
    }

    let id = credentials.id.to_string();
    let token = issue_token(
        &data.auth_cfg.jwt_secret,
        &id,
        &credentials.name,
        Role::Driver,
        Duration::hours(data.auth_cfg.token_expiry_hours),
    )?;

    Ok(DriverLoginResponse {
        token,
        id,
        name: credentials.name,
    })
}

pub async fn get_driver_profile(
    data: Data<AppState>,
    user: AuthenticatedUser,
    driver_id: String,
) -> Result<DriverProfileResponse, AppError> {
    if user.role != Role::Driver || user.id != driver_id {
        return Err(AppError::UnauthorizedAccess);
    }
    let id = parse_db_id(&driver_id)?;

    let profile = sqlx::query_as::<_, DriverProfile>(
        "SELECT id, name, email, vehicle_id, vehicle_type, vehicle_volume FROM vehicle_drivers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&data.db)
    .await?
    .ok_or(AppError::DriverNotFound(driver_id))?;

    Ok(DriverProfileResponse { driver: profile })
}
