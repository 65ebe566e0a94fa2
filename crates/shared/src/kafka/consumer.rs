/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::KafkaConfig;
use crate::tools::error::AppError;
use crate::utils::{logger::*, prometheus::KAFKA_CONSUMED};
use rdkafka::{
    consumer::{CommitMode, Consumer, StreamConsumer},
    ClientConfig, Message,
};
use serde::de::DeserializeOwned;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

pub fn create_consumer(
    kafka_cfg: &KafkaConfig,
    group_id: &str,
    topic: &str,
) -> Result<StreamConsumer, AppError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set(kafka_cfg.kafka_key.as_str(), kafka_cfg.kafka_host.as_str())
        .set("group.id", group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "latest")
        .create()
        .map_err(|err| AppError::KafkaConsumerError(err.to_string()))?;

    consumer
        .subscribe(&[topic])
        .map_err(|err| AppError::KafkaConsumerError(err.to_string()))?;

    Ok(consumer)
}

pub fn decode_message<T>(payload: Option<&str>) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    let payload = payload
        .ok_or_else(|| AppError::DeserializationError("Empty kafka payload".to_string()))?;
    serde_json::from_str(payload).map_err(|err| AppError::DeserializationError(err.to_string()))
}

/// Hands every message of `topic` to `handler` until shutdown is requested.
///
/// Offsets are committed once the handler returns, whatever its result, so a poison message is
/// logged and skipped rather than redelivered forever.
pub async fn run_consumer<T, F, Fut>(
    consumer: StreamConsumer,
    topic: String,
    handler: F,
    graceful_termination_requested: Arc<AtomicBool>,
) where
    T: DeserializeOwned,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    let mut shutdown_check = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            message = consumer.recv() => {
                let message = match message {
                    Ok(message) => message,
                    Err(err) => {
                        error!(tag = "[Kafka Consumer]", %topic, "{err}");
                        continue;
                    }
                };

                let status = match decode_message::<T>(message.payload_view::<str>().and_then(Result::ok)) {
                    Ok(decoded) => match handler(decoded).await {
                        Ok(()) => "SUCCESS",
                        Err(err) => {
                            error!(tag = "[Kafka Consumer]", %topic, error_code = %err.code(), "{}", err.message());
                            "FAILURE"
                        }
                    },
                    Err(err) => {
                        warn!(tag = "[Kafka Consumer]", %topic, "Skipping undecodable message : {}", err.message());
                        "DECODE_FAILURE"
                    }
                };
                KAFKA_CONSUMED.with_label_values(&[topic.as_str(), status]).inc();

                if let Err(err) = consumer.commit_message(&message, CommitMode::Async) {
                    warn!(tag = "[Kafka Consumer]", %topic, "Commit failed : {err}");
                }
            },
            _ = shutdown_check.tick() => {
                if graceful_termination_requested.load(Ordering::Relaxed) {
                    info!(tag = "[Kafka Consumer]", %topic, "Graceful shutdown requested, stopping consumer");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookedNotification;

    #[test]
    fn decodes_json_payload() {
        let payload = r#"{"user_id":"u1","driver_id":"d1","status":"completed"}"#;
        let decoded: BookedNotification = decode_message(Some(payload)).expect("decodes");
        assert_eq!(decoded.driver_id, "d1");
        assert!(decoded.status.is_terminal());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let result = decode_message::<BookedNotification>(None);
        assert!(matches!(result, Err(AppError::DeserializationError(_))));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let result = decode_message::<BookedNotification>(Some("{not json"));
        assert!(matches!(result, Err(AppError::DeserializationError(_))));
    }
}
