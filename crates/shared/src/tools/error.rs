/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_message: String,
    pub error_code: String,
}

#[macros::add_error]
pub enum AppError {
    InternalError(String),
    InvalidRequest(String),
    UnprocessibleRequest(String),
    PanicOccured(String),
    LargePayloadSize(usize, usize),
    RequestTimeout,
    MissingAuthorizationHeader,
    InvalidToken,
    TokenExpired,
    TokenIssueFailed(String),
    UnauthorizedAccess,
    Forbidden(String),
    InvalidCredentials,
    EmailAlreadyRegistered(String),
    UserNotFound(String),
    DriverNotFound(String),
    VehicleNotFound(i32),
    BookingNotFound,
    NoBookingFound,
    BookingRequestNotFound,
    DatabaseError(String),
    DatabaseUnavailable(String),
    DuplicateEntry(String),
    RetriesExhausted(u32, String),
    RedisConnectionError(String),
    SetFailed(String),
    GetFailed(String),
    DeleteFailed(String),
    GeoAddFailed(String),
    GeoSearchFailed(String),
    GeoPosFailed(String),
    ZRemFailed(String),
    ZCardFailed(String),
    KafkaPushFailed(String),
    KafkaConsumerError(String),
    ExternalAPICallError(String),
    SerializationError(String),
    DeserializationError(String),
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::PanicOccured(reason) => format!("Panic occured : {reason}"),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::RequestTimeout => "Request timed out".to_string(),
            AppError::MissingAuthorizationHeader => "Authorization header required".to_string(),
            AppError::InvalidToken => "Invalid token".to_string(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::TokenIssueFailed(err) => format!("Failed to generate token : {err}"),
            AppError::UnauthorizedAccess => "unauthorized access".to_string(),
            AppError::Forbidden(role) => format!("Access restricted to {role} accounts"),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::EmailAlreadyRegistered(email) => {
                format!("Email already registered : {email}")
            }
            AppError::UserNotFound(id) => format!("User not found : {id}"),
            AppError::DriverNotFound(id) => format!("Driver not found : {id}"),
            AppError::VehicleNotFound(id) => format!("Vehicle not found : {id}"),
            AppError::BookingNotFound => "booking not found".to_string(),
            AppError::NoBookingFound => "no booking found".to_string(),
            AppError::BookingRequestNotFound => "booking request not found".to_string(),
            AppError::DatabaseError(err) => format!("Database Error : {err}"),
            AppError::DatabaseUnavailable(err) => format!("Database Unavailable : {err}"),
            AppError::DuplicateEntry(err) => format!("Duplicate entry : {err}"),
            AppError::RetriesExhausted(attempts, err) => {
                format!("After {attempts} attempts, last error : {err}")
            }
            AppError::KafkaPushFailed(reason) => format!("Kafka Push Failed : {reason}"),
            AppError::KafkaConsumerError(reason) => format!("Kafka Consumer Error : {reason}"),
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::RedisConnectionError(err)
            | AppError::SetFailed(err)
            | AppError::GetFailed(err)
            | AppError::DeleteFailed(err)
            | AppError::GeoAddFailed(err)
            | AppError::GeoSearchFailed(err)
            | AppError::GeoPosFailed(err)
            | AppError::ZRemFailed(err)
            | AppError::ZCardFailed(err) => format!("Redis Error : {err}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::MissingAuthorizationHeader => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DriverNotFound(_) => StatusCode::NOT_FOUND,
            AppError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BookingNotFound => StatusCode::NOT_FOUND,
            AppError::NoBookingFound => StatusCode::NOT_FOUND,
            AppError::BookingRequestNotFound => StatusCode::BAD_REQUEST,
            AppError::ExternalAPICallError(_) => StatusCode::BAD_GATEWAY,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_)
            | AppError::PanicOccured(_)
            | AppError::TokenIssueFailed(_)
            | AppError::DatabaseError(_)
            | AppError::RetriesExhausted(_, _)
            | AppError::RedisConnectionError(_)
            | AppError::SetFailed(_)
            | AppError::GetFailed(_)
            | AppError::DeleteFailed(_)
            | AppError::GeoAddFailed(_)
            | AppError::GeoSearchFailed(_)
            | AppError::GeoPosFailed(_)
            | AppError::ZRemFailed(_)
            | AppError::ZCardFailed(_)
            | AppError::KafkaPushFailed(_)
            | AppError::KafkaConsumerError(_)
            | AppError::SerializationError(_)
            | AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Failures worth retrying: the database could not be reached or did not answer in time.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::DatabaseUnavailable(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEntry(db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::DatabaseUnavailable(error.to_string()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        if error.is_data() || error.is_syntax() || error.is_eof() {
            AppError::DeserializationError(error.to_string())
        } else {
            AppError::SerializationError(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn error_codes_follow_variant_names() {
        assert_eq!(AppError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
        assert_eq!(AppError::NoBookingFound.code(), "NO_BOOKING_FOUND");
        assert_eq!(
            AppError::LargePayloadSize(10, 5).code(),
            "LARGE_PAYLOAD_SIZE"
        );
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        for err in [
            AppError::MissingAuthorizationHeader,
            AppError::InvalidToken,
            AppError::UnauthorizedAccess,
            AppError::InvalidCredentials,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            AppError::Forbidden("admin".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn only_unreachable_database_errors_are_transient() {
        let unavailable = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(unavailable.is_transient());
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let io = AppError::from(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )));
        assert!(io.is_transient());

        let missing = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(missing, AppError::DatabaseError(_)));
        assert!(!missing.is_transient());
        assert!(!AppError::DuplicateEntry("email".to_string()).is_transient());
        assert_eq!(
            AppError::DuplicateEntry("email".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn expired_token_is_reported_separately() {
        assert_eq!(AppError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.message(), "Token expired");
        assert_eq!(AppError::TokenExpired.code(), "TOKEN_EXPIRED");
    }

    #[actix_rt::test]
    async fn error_response_carries_message_and_code() {
        let response = AppError::BookingNotFound.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.expect("body");
        let body: ErrorBody = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body.error_message, "booking not found");
        assert_eq!(body.error_code, "BOOKING_NOT_FOUND");
    }
}
