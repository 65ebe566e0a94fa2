/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{token::verify_token, AuthConfig};
use crate::tools::error::AppError;
use crate::types::Role;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

/// Caller identity taken from the `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(role.to_string()))
        }
    }

    fn authenticate(req: &HttpRequest) -> Result<Self, AppError> {
        let auth_config = req
            .app_data::<web::Data<AuthConfig>>()
            .ok_or_else(|| AppError::InternalError("Auth config is not registered".to_string()))?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or(AppError::MissingAuthorizationHeader)?
            .to_str()
            .map_err(|_| AppError::InvalidToken)?
            .strip_prefix("Bearer ")
            .ok_or(AppError::InvalidToken)?
            .trim();

        let claims = verify_token(&auth_config.jwt_secret, token)?;

        Ok(AuthenticatedUser {
            id: claims.sub,
            name: claims.aud,
            role: claims.role,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::issue_token;
    use actix_web::{body::to_bytes, get, http::StatusCode, test, App, HttpResponse};
    use chrono::Duration;

    const SECRET: &str = "extractor-secret";

    #[get("/whoami")]
    async fn whoami(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
        user.require_role(Role::Driver)?;
        Ok(HttpResponse::Ok().body(user.id))
    }

    fn auth_config() -> web::Data<AuthConfig> {
        web::Data::new(AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_expiry_hours: 72,
        })
    }

    #[actix_rt::test]
    async fn bearer_token_identifies_caller() {
        let app = test::init_service(App::new().app_data(auth_config()).service(whoami)).await;
        let token = issue_token(SECRET, "d-7", "Ravi", Role::Driver, Duration::hours(1))
            .expect("token is issued");

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.expect("body is readable");
        assert_eq!(body.as_ref(), b"d-7");
    }

    #[actix_rt::test]
    async fn missing_header_is_unauthorized() {
        let app = test::init_service(App::new().app_data(auth_config()).service(whoami)).await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(resp.into_body()).await.expect("body is readable");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["errorMessage"], "Authorization header required");
        assert_eq!(body["errorCode"], "MISSING_AUTHORIZATION_HEADER");
    }

    #[actix_rt::test]
    async fn wrong_role_is_forbidden() {
        let app = test::init_service(App::new().app_data(auth_config()).service(whoami)).await;
        let token = issue_token(SECRET, "u-1", "Meera", Role::User, Duration::hours(1))
            .expect("token is issued");

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = test::init_service(App::new().app_data(auth_config()).service(whoami)).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
