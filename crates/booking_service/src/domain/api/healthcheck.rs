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
    HttpResponse,
};
use shared::{tools::error::AppError, types::HealthCheckResponse};

use crate::environment::AppState;

#[get("/ping")]
async fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("pong")
}

#[get("/health")]
async fn health_check(data: Data<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    sqlx::query("SELECT 1").execute(&data.db).await?;
    data.redis.check_health("booking_service").await?;

    Ok(Json(HealthCheckResponse {
        result: "Service Is Up".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, test, App};

    #[actix_rt::test]
    async fn ping_answers_pong() {
        let app = test::init_service(App::new().service(ping)).await;
        let req = test::TestRequest::get().uri("/ping").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let body = to_bytes(resp.into_body()).await.expect("body is readable");
        assert_eq!(body.as_ref(), b"pong");
    }
}
