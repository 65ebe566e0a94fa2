/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use rdkafka::producer::FutureProducer;
use serde::Deserialize;
use shared::{
    auth::AuthConfig,
    kafka::{producer::create_producer, KafkaConfig},
    middleware::HttpLimits,
    redis::types::{RedisConfig, RedisConnectionPool},
    utils::logger::*,
};
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisConfig,
    pub kafka_cfg: KafkaConfig,
    pub auth_cfg: AuthConfig,
    pub driver_location_topic: String,
    pub driver_location_group: String,
    pub booking_notification_topic: String,
    pub booking_notification_group: String,
    pub drainer_size: usize,
    pub drainer_delay: u64,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<RedisConnectionPool>,
    pub producer: Option<FutureProducer>,
    pub auth_cfg: AuthConfig,
    pub driver_location_topic: String,
    pub drainer_size: usize,
    pub drainer_delay: u64,
    pub limits: HttpLimits,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> AppState {
        let redis = Arc::new(
            RedisConnectionPool::new(app_config.redis_cfg)
                .await
                .expect("Failed to create Redis connection pool"),
        );

        let producer = create_producer(&app_config.kafka_cfg);

        info!(
            tag = "[Drainer]",
            drainer_size = app_config.drainer_size,
            drainer_delay = app_config.drainer_delay,
            "Driver positions are batched before reaching Redis"
        );

        AppState {
            redis,
            producer,
            auth_cfg: app_config.auth_cfg,
            driver_location_topic: app_config.driver_location_topic,
            drainer_size: app_config.drainer_size,
            drainer_delay: app_config.drainer_delay,
            limits: HttpLimits {
                request_timeout: app_config.request_timeout,
                max_allowed_req_size: app_config.max_allowed_req_size,
            },
        }
    }
}
