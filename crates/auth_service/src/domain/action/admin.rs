/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    domain::types::{admin::AdminCredentials, user::*},
    environment::AppState,
};
use actix_web::web::Data;
use chrono::Duration;
use shared::{
    auth::{issue_token, verify_password},
    tools::error::AppError,
    types::Role,
};

pub async fn login_admin(
    data: Data<AppState>,
    request_body: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let credentials = sqlx::query_as::<_, AdminCredentials>(
        "SELECT id, name, password FROM admin WHERE email = $1",
    )
    .bind(request_body.email.trim())
    .fetch_optional(&data.db)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request_body.password, &credentials.password) {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(
        &data.auth_cfg.jwt_secret,
        &credentials.id.to_string(),
        &credentials.name,
        Role::Admin,
        Duration::hours(data.auth_cfg.token_expiry_hours),
    )?;

    Ok(LoginResponse {
        token,
        name: credentials.name,
    })
}
