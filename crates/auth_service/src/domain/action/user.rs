/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{registration_error, validate_non_empty};
use crate::{domain::types::user::*, environment::AppState};
use actix_web::web::Data;
use chrono::Duration;
use shared::{
    auth::{hash_password, issue_token, verify_password, AuthenticatedUser},
    db::parse_db_id,
    tools::error::AppError,
    types::{APISuccess, Role},
    utils::logger::*,
};

pub async fn register_user(
    data: Data<AppState>,
    request_body: RegisterUserRequest,
) -> Result<APISuccess, AppError> {
    validate_non_empty(&[
        ("name", request_body.name.as_str()),
        ("email", request_body.email.as_str()),
        ("password", request_body.password.as_str()),
    ])?;

    let email = request_body.email.trim();
    let password = hash_password(&request_body.password)?;

    sqlx::query("INSERT INTO users (name, email, password) VALUES ($1, $2, $3)")
        .bind(request_body.name.trim())
        .bind(email)
        .bind(password)
        .execute(&data.db)
        .await
        .map_err(|err| registration_error(err, email))?;

    info!(tag = "[User Registered]", %email);

    Ok(APISuccess::new("User registered successfully"))
}

pub async fn login_user(
    data: Data<AppState>,
    request_body: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let credentials = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, name, password FROM users WHERE email = $1",
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
        Role::User,
        Duration::hours(data.auth_cfg.token_expiry_hours),
    )?;

    Ok(LoginResponse {
        token,
        name: credentials.name,
    })
}

pub async fn get_user_profile(
    data: Data<AppState>,
    user: AuthenticatedUser,
) -> Result<UserProfileResponse, AppError> {
    user.require_role(Role::User)?;
    let id = parse_db_id(&user.id)?;

    let profile =
        sqlx::query_as::<_, UserProfile>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&data.db)
            .await?
            .ok_or(AppError::UserNotFound(user.id))?;

    Ok(UserProfileResponse { user: profile })
}
