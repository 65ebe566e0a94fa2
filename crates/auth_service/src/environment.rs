/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::Deserialize;
use shared::{
    auth::AuthConfig,
    db::{create_pool, run_migrations, PostgresConfig},
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
    pub auth_cfg: AuthConfig,
    pub run_migrations: bool,
    pub vehicle_type_cache_ttl: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: Arc<RedisConnectionPool>,
    pub auth_cfg: AuthConfig,
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

        AppState {
            db,
            redis,
            auth_cfg: app_config.auth_cfg,
            vehicle_type_cache_ttl: app_config.vehicle_type_cache_ttl,
            limits: HttpLimits {
                request_timeout: app_config.request_timeout,
                max_allowed_req_size: app_config.max_allowed_req_size,
            },
        }
    }
}
