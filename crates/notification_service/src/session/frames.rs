/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    auth::token::verify_token,
    tools::error::AppError,
    types::{DriverId, DriverLocation, GeoPoint, Latitude, Longitude},
};

use crate::hub::messages::ClientKind;

/// First frame of every connection.
#[derive(Debug, Deserialize)]
pub struct AuthFrame {
    pub token: String,
    #[serde(default, alias = "driverID")]
    pub driver_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    AuthenticationRequired,
    InvalidToken,
    MissingId(ClientKind),
    WrongRole(ClientKind),
}

impl AuthRejection {
    pub fn close_reason(&self) -> String {
        match self {
            AuthRejection::AuthenticationRequired => "Authentication required".to_string(),
            AuthRejection::InvalidToken => "Invalid authentication token".to_string(),
            AuthRejection::MissingId(ClientKind::Driver) => "Driver ID required".to_string(),
            AuthRejection::MissingId(ClientKind::User) => "User ID required".to_string(),
            AuthRejection::WrongRole(kind) => format!("Access restricted to {kind} accounts"),
        }
    }
}

/// Validates the first frame of a `kind` connection and returns the authenticated account id.
pub fn authenticate(text: &str, jwt_secret: &str, kind: ClientKind) -> Result<String, AuthRejection> {
    let frame: AuthFrame =
        serde_json::from_str(text).map_err(|_| AuthRejection::AuthenticationRequired)?;

    let claims =
        verify_token(jwt_secret, &frame.token).map_err(|_| AuthRejection::InvalidToken)?;

    if claims.sub.trim().is_empty() {
        return Err(AuthRejection::MissingId(kind));
    }

    if claims.role != kind.role() {
        return Err(AuthRejection::WrongRole(kind));
    }

    Ok(claims.sub)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocationFrame {
    Nested {
        location: GeoPoint,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    Flat {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
}

/// Reads a location frame sent by `driver_id`. Any driver id inside the frame is ignored.
pub fn parse_location(text: &str, driver_id: &DriverId) -> Result<DriverLocation, AppError> {
    let frame: LocationFrame = serde_json::from_str(text)
        .map_err(|err| AppError::UnprocessibleRequest(err.to_string()))?;

    let (location, timestamp) = match frame {
        LocationFrame::Nested {
            location,
            timestamp,
        } => (location, timestamp),
        LocationFrame::Flat {
            latitude,
            longitude,
            timestamp,
        } => (GeoPoint::new(Latitude(latitude), Longitude(longitude)), timestamp),
    };

    Ok(DriverLocation {
        driver_id: driver_id.0.to_owned(),
        location,
        timestamp: timestamp.unwrap_or_else(Utc::now),
    })
}

/// Location pushed to the user whose trip the driver is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationForward {
    pub driver_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&DriverLocation> for LocationForward {
    fn from(location: &DriverLocation) -> Self {
        LocationForward {
            driver_id: location.driver_id.to_owned(),
            latitude: location.location.latitude,
            longitude: location.location.longitude,
            timestamp: location.timestamp,
        }
    }
}
