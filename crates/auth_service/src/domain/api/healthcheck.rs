/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    get,
    web::{Data, Json},
};
use shared::{tools::error::AppError, types::HealthCheckResponse};

use crate::environment::AppState;

async fn check(data: Data<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    sqlx::query("SELECT 1").execute(&data.db).await?;
    data.redis.check_health("auth_service").await?;

    Ok(Json(HealthCheckResponse {
        result: "Service Is Up".to_string(),
    }))
}

#[get("/health")]
async fn health_check(data: Data<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    check(data).await
}

#[get("/user/health")]
async fn user_health_check(data: Data<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    check(data).await
}
