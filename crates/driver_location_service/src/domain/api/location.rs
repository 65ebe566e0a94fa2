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
        action::location,
        types::{LocationHealthResponse, LocationUpdateRequest},
    },
    environment::AppState,
};

#[post("/location/update")]
async fn update_location(
    data: Data<AppState>,
    driver: AuthenticatedUser,
    param_obj: Json<LocationUpdateRequest>,
) -> Result<Json<APISuccess>, AppError> {
    Ok(Json(
        location::update_location(data, driver, param_obj.into_inner()).await?,
    ))
}

#[get("/location/health")]
async fn location_health(data: Data<AppState>) -> Result<Json<LocationHealthResponse>, AppError> {
    Ok(Json(location::location_health(data).await?))
}

#[cfg(test)]
mod tests {
    use crate::{domain::api::handler, environment::AppState};
    use actix_web::{
        body::to_bytes,
        http::{header, StatusCode},
        test,
        web::Data,
        App,
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use shared::{
        auth::{issue_token, AuthConfig},
        middleware::{json_config, HttpLimits},
        redis::types::{RedisConfig, RedisConnectionPool},
        types::Role,
    };
    use std::sync::Arc;

    const SECRET: &str = "location-secret";

    // No broker and no Redis server: updates can only fail at the Kafka push.
    fn app_state() -> AppState {
        AppState {
            redis: Arc::new(
                RedisConnectionPool::build(RedisConfig {
                    redis_port: 1,
                    ..RedisConfig::default()
                })
                .expect("unconnected pool"),
            ),
            producer: None,
            auth_cfg: auth_config(),
            driver_location_topic: "driver_location".to_string(),
            drainer_size: 10,
            drainer_delay: 5,
            limits: HttpLimits {
                request_timeout: 9000,
                max_allowed_req_size: 512000,
            },
        }
    }

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_expiry_hours: 72,
        }
    }

    fn update(role: Option<Role>) -> test::TestRequest {
        let req = test::TestRequest::post()
            .uri("/location/update")
            .set_json(json!({"latitude": 18.52, "longitude": 73.85}));
        match role {
            Some(role) => {
                let token = issue_token(SECRET, "11", "Tester", role, Duration::hours(1))
                    .expect("token is issued");
                req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            }
            None => req,
        }
    }

    async fn call(req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state()))
                .app_data(Data::new(auth_config()))
                .app_data(json_config())
                .configure(handler),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body = to_bytes(resp.into_body()).await.expect("body is readable");
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_rt::test]
    async fn update_without_token_is_unauthorized() {
        let (status, _) = call(update(None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn only_drivers_report_locations() {
        for role in [Role::User, Role::Admin] {
            let (status, body) = call(update(Some(role))).await;

            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["errorCode"], "FORBIDDEN");
        }
    }

    #[actix_rt::test]
    async fn driver_update_without_broker_is_reported() {
        let (status, body) = call(update(Some(Role::Driver))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorCode"], "KAFKA_PUSH_FAILED");
    }

    #[actix_rt::test]
    async fn non_numeric_coordinates_are_unprocessable() {
        let req = update(Some(Role::Driver))
            .set_json(json!({"latitude": "north", "longitude": 73.85}));
        let (status, body) = call(req).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorCode"], "UNPROCESSIBLE_REQUEST");
    }
}
