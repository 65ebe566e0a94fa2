/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDriverRequest {
    pub name: String,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: String,
    pub email: String,
    pub password: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_volume: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverLoginResponse {
    pub token: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub vehicle_volume: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverProfileResponse {
    pub driver: DriverProfile,
}

#[derive(FromRow)]
pub struct DriverCredentials {
    pub id: i32,
    pub name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_registration_uses_frontend_field_names() {
        let body = r#"{
            "name": "Ravi",
            "vehicleID": "KA-01-1234",
            "email": "ravi@example.com",
            "password": "pw",
            "vehicleType": "van",
            "vehicleVolume": "12"
        }"#;
        let req: RegisterDriverRequest = serde_json::from_str(body).expect("valid body");
        assert_eq!(req.vehicle_id, "KA-01-1234");
        assert_eq!(req.vehicle_type, "van");
        assert_eq!(req.vehicle_volume, "12");
    }

    #[test]
    fn login_response_exposes_capitalised_id() {
        let resp = DriverLoginResponse {
            token: "t".to_string(),
            id: "9".to_string(),
            name: "Ravi".to_string(),
        };
        let json = serde_json::to_value(resp).expect("serializes");
        assert_eq!(json["ID"], "9");
    }
}
