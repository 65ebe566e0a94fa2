/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::Deserialize;
use shared::{
    middleware::HttpLimits,
    redis::types::{RedisConfig, RedisConnectionPool},
    utils::logger::*,
};
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodeConfig {
    pub nominatim_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub default_limit: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisConfig,
    pub geocode_cfg: GeocodeConfig,
    pub nearby_driver_radius_km: f64,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<RedisConnectionPool>,
    pub geocode_cfg: GeocodeConfig,
    pub nearby_driver_radius_km: f64,
    pub limits: HttpLimits,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> AppState {
        let redis = Arc::new(
            RedisConnectionPool::new(app_config.redis_cfg)
                .await
                .expect("Failed to create Redis connection pool"),
        );

        info!(
            tag = "[Geocoding]",
            nominatim_url = %app_config.geocode_cfg.nominatim_url,
            "Geocoding requests will be proxied"
        );

        AppState {
            redis,
            geocode_cfg: app_config.geocode_cfg,
            nearby_driver_radius_km: app_config.nearby_driver_radius_km,
            limits: HttpLimits {
                request_timeout: app_config.request_timeout,
                max_allowed_req_size: app_config.max_allowed_req_size,
            },
        }
    }
}
