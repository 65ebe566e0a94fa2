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
    domain::{action::user, types::user::*},
    environment::AppState,
};

#[post("/user/register")]
async fn register_user(
    data: Data<AppState>,
    param_obj: Json<RegisterUserRequest>,
) -> Result<Json<APISuccess>, AppError> {
    Ok(Json(user::register_user(data, param_obj.into_inner()).await?))
}

#[post("/user/login")]
async fn login_user(
    data: Data<AppState>,
    param_obj: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(user::login_user(data, param_obj.into_inner()).await?))
}

#[get("/user/profile")]
async fn get_user_profile(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<UserProfileResponse>, AppError> {
    Ok(Json(user::get_user_profile(data, caller).await?))
}
