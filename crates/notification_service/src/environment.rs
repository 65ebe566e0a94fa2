/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix::{Actor, Addr};
use serde::Deserialize;
use shared::{
    auth::AuthConfig,
    kafka::{consumer::create_consumer, producer::create_producer, KafkaConfig},
    middleware::HttpLimits,
    utils::logger::*,
};
use rdkafka::consumer::StreamConsumer;
use std::time::Duration;

use crate::{hub::Hub, session::Heartbeat};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub kafka_cfg: KafkaConfig,
    pub auth_cfg: AuthConfig,
    pub driver_location_topic: String,
    pub driver_notification_topic: String,
    pub driver_notification_group: String,
    pub booking_notification_topic: String,
    pub booking_notification_group: String,
    pub heartbeat_interval_secs: u64,
    pub client_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub hub: Addr<Hub>,
    pub jwt_secret: String,
    pub heartbeat: Heartbeat,
    pub limits: HttpLimits,
}

pub struct Consumers {
    pub driver_notification: (StreamConsumer, String),
    pub booking_notification: (StreamConsumer, String),
}

impl AppState {
    /// Starts the hub actor, so it must run inside the actix system.
    pub fn new(app_config: &AppConfig) -> AppState {
        let producer = create_producer(&app_config.kafka_cfg);
        let hub = Hub::new(producer, app_config.driver_location_topic.to_owned()).start();

        AppState {
            hub,
            jwt_secret: app_config.auth_cfg.jwt_secret.to_owned(),
            heartbeat: Heartbeat {
                interval: Duration::from_secs(app_config.heartbeat_interval_secs),
                client_timeout: Duration::from_secs(app_config.client_timeout_secs),
            },
            limits: HttpLimits {
                request_timeout: app_config.request_timeout,
                max_allowed_req_size: app_config.max_allowed_req_size,
            },
        }
    }
}

impl Consumers {
    pub fn new(app_config: &AppConfig) -> Consumers {
        let subscribe = |group: &str, topic: &str| {
            let consumer = create_consumer(&app_config.kafka_cfg, group, topic)
                .expect("Failed to create kafka consumer");
            info!(tag = "[Kafka Consumer]", %group, %topic, "Subscribed");
            (consumer, topic.to_string())
        };

        Consumers {
            driver_notification: subscribe(
                &app_config.driver_notification_group,
                &app_config.driver_notification_topic,
            ),
            booking_notification: subscribe(
                &app_config.booking_notification_group,
                &app_config.booking_notification_topic,
            ),
        }
    }
}
