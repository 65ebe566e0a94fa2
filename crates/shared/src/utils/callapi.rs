/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::call_external_api;
use crate::tools::error::AppError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

/// Sends a request to an external service and decodes the JSON response into `T`.
///
/// Any non-2xx status is returned as `ExternalAPICallError` carrying the status. Latency and
/// status are recorded in `CALL_EXTERNAL_API` under the url's host and path.
///
/// ```norun
/// let url = Url::parse_with_params("https://nominatim.openstreetmap.org/search", &[("q", "Pune")])?;
/// let places: Vec<Place> = call_api(Method::GET, &url, vec![("User-Agent", "logistics")], None::<()>, 5).await?;
/// ```
pub async fn call_api<T, U>(
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
    timeout_secs: u64,
) -> Result<T, AppError>
where
    T: DeserializeOwned,
    U: Serialize + Debug,
{
    let start_time = std::time::Instant::now();

    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|err| AppError::InternalError(err.to_string()))?;

    let mut header_map = HeaderMap::new();

    for (header_key, header_value) in headers {
        let header_name = HeaderName::from_str(header_key)
            .map_err(|_| AppError::InvalidRequest(format!("Invalid Header Name : {header_key}")))?;
        let header_value = HeaderValue::from_str(header_value).map_err(|_| {
            AppError::InvalidRequest(format!("Invalid Header Value : {header_value}"))
        })?;

        header_map.insert(header_name, header_value);
    }

    let mut request = client
        .request(method.to_owned(), url.to_owned())
        .headers(header_map.to_owned());

    if let Some(body) = &body {
        request = request.json(body);
    }

    let resp = request.send().await;

    let host = url.host_str().unwrap_or_default();

    let status = match resp.as_ref() {
        Ok(resp) => resp.status().as_str().to_string(),
        Err(err) => err
            .status()
            .map(|status| status.to_string())
            .unwrap_or("UNKNOWN".to_string()),
    };

    call_external_api!(method.as_str(), host, url.path(), status.as_str(), start_time);

    match resp {
        Ok(resp) if resp.status().is_success() => {
            info!(tag = "[OUTGOING API]", request_method = %method, request_host = %host, request_path = %url.path(), response_status = %status, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
            resp.json::<T>()
                .await
                .map_err(|err| AppError::DeserializationError(err.to_string()))
        }
        Ok(resp) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_host = %host, request_path = %url.path(), request_body = ?body, response_status = %status, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
            Err(AppError::ExternalAPICallError(format!(
                "{host} responded with {}",
                resp.status()
            )))
        }
        Err(err) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_host = %host, request_path = %url.path(), request_body = ?body, error = %err, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
            Err(AppError::ExternalAPICallError(err.to_string()))
        }
    }
}
