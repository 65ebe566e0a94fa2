/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::AppError;
use crate::types::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

pub const TOKEN_ISSUER: &str = "logistics-platform";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user, driver or admin the token was issued to
    pub sub: String,
    /// Display name of the subject
    pub aud: String,
    pub iss: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(
    secret: &str,
    id: &str,
    name: &str,
    role: Role,
    ttl: Duration,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: id.to_string(),
        aud: name.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| AppError::TokenIssueFailed(err.to_string()))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    // `aud` carries the display name, not an audience to check against.
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies() {
        let token = issue_token(SECRET, "42", "Asha", Role::Driver, Duration::hours(72))
            .expect("token is issued");
        let claims = verify_token(SECRET, &token).expect("token verifies");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.aud, "Asha");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.role, Role::Driver);
        assert_eq!(claims.exp - claims.iat, 72 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(SECRET, "42", "Asha", Role::User, Duration::hours(1))
            .expect("token is issued");
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(SECRET, "42", "Asha", Role::User, Duration::hours(-2))
            .expect("token is issued");
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let claims = Claims {
            sub: "42".to_string(),
            aud: "Asha".to_string(),
            iss: "someone-else".to_string(),
            role: Role::Admin,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token is encoded");

        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            verify_token(SECRET, "not.a.jwt"),
            Err(AppError::InvalidToken)
        ));
    }
}
