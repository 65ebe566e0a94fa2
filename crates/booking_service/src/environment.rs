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
    db::{create_pool, run_migrations, PostgresConfig},
    kafka::{producer::create_producer, KafkaConfig},
    middleware::HttpLimits,
    redis::types::{RedisConfig, RedisConnectionPool},
    utils::logger::*,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisConfig,
    pub postgres_cfg: PostgresConfig,
    pub kafka_cfg: KafkaConfig,
    pub auth_cfg: AuthConfig,
    pub run_migrations: bool,
    pub driver_notification_topic: String,
    pub booking_notification_topic: String,
    pub pending_request_ttl: u32,
    pub search_radius_km: f64,
    pub vehicle_type_cache_ttl: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: Arc<RedisConnectionPool>,
    pub producer: Option<FutureProducer>,
    pub auth_cfg: AuthConfig,
    pub driver_notification_topic: String,
    pub booking_notification_topic: String,
    pub pending_request_ttl: u32,
    pub search_radius_km: f64,
    pub vehicle_type_cache_ttl: u32,
    pub limits: HttpLimits,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> AppState {
        let db = create_pool(&app_config.postgres_cfg)
            .await
            .expect("Failed to create Postgres connection pool");

        if app_config.run_migrations {
            run_migrations(&db)
                .await
                .expect("Failed to run database migrations");
            info!(tag = "[Migrations]", "Database migrations applied");
        }

        let redis = Arc::new(
            RedisConnectionPool::new(app_config.redis_cfg)
                .await
                .expect("Failed to create Redis connection pool"),
        );

        let producer = create_producer(&app_config.kafka_cfg);

        AppState {
            db,
            redis,
            producer,
            auth_cfg: app_config.auth_cfg,
            driver_notification_topic: app_config.driver_notification_topic,
            booking_notification_topic: app_config.booking_notification_topic,
            pending_request_ttl: app_config.pending_request_ttl,
            search_radius_km: app_config.search_radius_km,
            vehicle_type_cache_ttl: app_config.vehicle_type_cache_ttl,
            limits: HttpLimits {
                request_timeout: app_config.request_timeout,
                max_allowed_req_size: app_config.max_allowed_req_size,
            },
        }
    }
}
