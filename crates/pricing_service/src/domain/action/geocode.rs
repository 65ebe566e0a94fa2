/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use reqwest::{Method, Url};
use shared::{tools::error::AppError, utils::callapi::call_api, utils::logger::*};

use crate::{
    domain::types::geocode::{NominatimPlace, Place},
    environment::{AppState, GeocodeConfig},
};

const MAX_LIMIT: u8 = 50;

/// Builds the Nominatim search url, rejecting blank queries.
pub fn search_url(cfg: &GeocodeConfig, query: &str, limit: Option<u8>) -> Result<Url, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest(
            "Query parameter q is required".to_string(),
        ));
    }

    let limit = limit
        .unwrap_or(cfg.default_limit)
        .clamp(1, MAX_LIMIT)
        .to_string();

    Url::parse_with_params(
        &format!("{}/search", cfg.nominatim_url.trim_end_matches('/')),
        &[("format", "json"), ("q", query), ("limit", limit.as_str())],
    )
    .map_err(|err| AppError::InternalError(err.to_string()))
}

pub async fn search(
    data: Data<AppState>,
    query: String,
    limit: Option<u8>,
) -> Result<Vec<Place>, AppError> {
    let cfg = &data.geocode_cfg;
    let url = search_url(cfg, &query, limit)?;

    let places: Vec<NominatimPlace> = call_api(
        Method::GET,
        &url,
        vec![("User-Agent", cfg.user_agent.as_str())],
        None::<()>,
        cfg.timeout_secs,
    )
    .await?;

    Ok(places
        .into_iter()
        .filter_map(|place| match Place::try_from(place) {
            Ok(place) => Some(place),
            Err(err) => {
                warn!(tag = "[Geocoding]", "Skipping place : {}", err);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GeocodeConfig {
        GeocodeConfig {
            nominatim_url: "https://nominatim.example.org/".to_string(),
            user_agent: "tests".to_string(),
            timeout_secs: 1,
            default_limit: 5,
        }
    }

    #[test]
    fn blank_query_is_a_bad_request() {
        let err = search_url(&cfg(), "   ", None).expect_err("blank query must fail");
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn url_carries_format_query_and_limit() {
        let url = search_url(&cfg(), " Baner Road, Pune ", None).expect("valid url");

        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "json".to_string()),
                ("q".to_string(), "Baner Road, Pune".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn limit_is_kept_within_bounds() {
        let url = search_url(&cfg(), "Pune", Some(0)).expect("valid url");
        assert!(url.query().unwrap_or_default().ends_with("limit=1"));

        let url = search_url(&cfg(), "Pune", Some(200)).expect("valid url");
        assert!(url.query().unwrap_or_default().ends_with("limit=50"));
    }
}
