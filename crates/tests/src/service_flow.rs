/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Exercises running services over HTTP. The services must already be running locally.

use chrono::Utc;
use pricing_service::domain::{action::fare, types::pricing::PriceEstimateResponse};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use shared::types::{GeoPoint, Latitude, Longitude, VehicleType};

const AUTH_URL: &str = "http://localhost:8081";
const PRICING_URL: &str = "http://localhost:8086";
const DRIVER_LOCATION_URL: &str = "http://localhost:8087";

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore]
async fn user_registers_logs_in_and_reads_profile() -> anyhow::Result<()> {
    let client = Client::new();
    let email = format!("{}@example.com", unique("user"));

    let registered = client
        .post(format!("{AUTH_URL}/user/register"))
        .json(&json!({"name": "Asha", "email": email, "password": "secret"}))
        .send()
        .await?;
    assert_eq!(registered.status(), StatusCode::OK);

    let again = client
        .post(format!("{AUTH_URL}/user/register"))
        .json(&json!({"name": "Asha", "email": email, "password": "secret"}))
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let login: Value = client
        .post(format!("{AUTH_URL}/user/login"))
        .json(&json!({"email": email, "password": "secret"}))
        .send()
        .await?
        .json()
        .await?;
    let token = login["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let profile: Value = client
        .get(format!("{AUTH_URL}/user/profile"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(profile["user"]["email"], json!(email));

    let wrong_password = client
        .post(format!("{AUTH_URL}/user/login"))
        .json(&json!({"email": email, "password": "nope"}))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn driver_reports_a_location() -> anyhow::Result<()> {
    let client = Client::new();
    let email = format!("{}@example.com", unique("driver"));

    let registered = client
        .post(format!("{AUTH_URL}/driver/register"))
        .json(&json!({
            "name": "Ravi",
            "vehicleID": unique("KA01"),
            "email": email,
            "password": "secret",
            "vehicleType": "van",
        }))
        .send()
        .await?;
    assert_eq!(registered.status(), StatusCode::OK);

    let login: Value = client
        .post(format!("{AUTH_URL}/driver/login"))
        .json(&json!({"email": email, "password": "secret"}))
        .send()
        .await?
        .json()
        .await?;
    let token = login["token"].as_str().unwrap_or_default().to_string();

    let unauthenticated = client
        .post(format!("{DRIVER_LOCATION_URL}/location/update"))
        .json(&json!({"latitude": 12.97, "longitude": 77.59}))
        .send()
        .await?;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let updated: Value = client
        .post(format!("{DRIVER_LOCATION_URL}/location/update"))
        .bearer_auth(&token)
        .json(&json!({"latitude": 12.97, "longitude": 77.59}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["message"], json!("Location updated"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn estimate_matches_fare_table_without_surge_data() -> anyhow::Result<()> {
    let pickup = GeoPoint::new(Latitude(12.9716), Longitude(77.5946));
    let dropoff = GeoPoint::new(Latitude(13.0827), Longitude(77.5877));

    let estimate: PriceEstimateResponse = Client::new()
        .post(format!("{PRICING_URL}/pricing/estimate"))
        .json(&json!({
            "pickup": &pickup,
            "dropoff": &dropoff,
            "vehicle_type": "truck",
        }))
        .send()
        .await?
        .json()
        .await?;

    let surge = estimate.breakdown.surge;
    let expected = fare::estimate(&pickup, &dropoff, VehicleType::Truck, None, 12);
    assert_eq!(estimate.breakdown.base_price, expected.breakdown.base_price);
    assert!(surge >= 1.0);
    assert!(estimate.price >= expected.price);

    Ok(())
}
