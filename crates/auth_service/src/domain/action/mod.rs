/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod admin;
pub mod driver;
pub mod user;

use shared::tools::error::AppError;

/// Rejects the first blank field by name.
pub fn validate_non_empty(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::InvalidRequest(format!("{name} is required"))),
        None => Ok(()),
    }
}

/// Unique violations on `email` become `EMAIL_ALREADY_REGISTERED`.
pub fn registration_error(err: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyRegistered(email.to_string());
        }
    }
    AppError::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_named() {
        let result = validate_non_empty(&[("name", "Asha"), ("email", "  "), ("password", "")]);
        match result {
            Err(AppError::InvalidRequest(reason)) => assert_eq!(reason, "email is required"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn filled_fields_pass() {
        assert!(validate_non_empty(&[("name", "Asha"), ("email", "a@b.c")]).is_ok());
    }
}
