/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::AppError;
use fred::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_pool_size: usize,
    pub redis_partition: usize,
    pub reconnect_max_attempts: u32,
    /// Reconnect delay in milliseconds
    pub reconnect_delay: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            redis_host: String::from("localhost"),
            redis_port: 6379,
            redis_pool_size: 10,
            redis_partition: 0,
            reconnect_max_attempts: 5,
            reconnect_delay: 1000,
        }
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_partition
        )
    }
}

pub struct RedisConnectionPool {
    pub pool: RedisPool,
}

impl RedisConnectionPool {
    /// Connects every client of the pool, failing if the first connection cannot be made.
    pub async fn new(conf: RedisConfig) -> Result<Self, AppError> {
        let redis = Self::build(conf)?;

        redis
            .pool
            .init()
            .await
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;

        Ok(redis)
    }

    /// Builds the pool without connecting it.
    pub fn build(conf: RedisConfig) -> Result<Self, AppError> {
        let config = RedisConfig::url(&conf);
        let mut redis_config = fred::types::RedisConfig::from_url(&config)
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;
        redis_config.tracing = fred::types::TracingConfig::new(true);

        let reconnect_policy =
            ReconnectPolicy::new_constant(conf.reconnect_max_attempts, conf.reconnect_delay);

        let pool = Builder::from_config(redis_config)
            .set_policy(reconnect_policy)
            .build_pool(conf.redis_pool_size)
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))?;

        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_is_built_without_a_server() {
        let cfg = RedisConfig {
            redis_port: 1,
            ..RedisConfig::default()
        };
        assert!(RedisConnectionPool::build(cfg).is_ok());
    }

    #[test]
    fn url_includes_partition() {
        let cfg = RedisConfig {
            redis_partition: 3,
            ..RedisConfig::default()
        };
        assert_eq!(cfg.url(), "redis://localhost:6379/3");
    }
}
