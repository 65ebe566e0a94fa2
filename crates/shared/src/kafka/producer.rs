/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::KafkaConfig;
use crate::tools::error::AppError;
use crate::utils::{logger::*, prometheus::KAFKA_PUBLISHED};
use rdkafka::{
    error::KafkaError,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
    ClientConfig,
};
use serde::Serialize;
use std::time::Duration;

/// Builds a producer, or `None` when the broker config is unusable so the service can still serve HTTP.
pub fn create_producer(kafka_cfg: &KafkaConfig) -> Option<FutureProducer> {
    let result: Result<FutureProducer, KafkaError> = ClientConfig::new()
        .set(kafka_cfg.kafka_key.as_str(), kafka_cfg.kafka_host.as_str())
        .set("compression.type", "lz4")
        .create();

    match result {
        Ok(producer) => Some(producer),
        Err(err) => {
            error!(
                tag = "[Kafka Connection]",
                "Error connecting to kafka config: {err}"
            );
            None
        }
    }
}

pub async fn push_to_kafka<T>(
    producer: &Option<FutureProducer>,
    topic: &str,
    key: &str,
    message: T,
) -> Result<(), AppError>
where
    T: Serialize,
{
    let message = serde_json::to_string(&message)
        .map_err(|err| AppError::SerializationError(err.to_string()))?;

    let Some(producer) = producer else {
        KAFKA_PUBLISHED.with_label_values(&[topic, "SKIPPED"]).inc();
        return Err(AppError::KafkaPushFailed(
            "Producer is None, unable to send message".to_string(),
        ));
    };

    match producer
        .send(
            FutureRecord::to(topic).key(key).payload(&message),
            Timeout::After(Duration::from_secs(1)),
        )
        .await
    {
        Ok(_) => {
            KAFKA_PUBLISHED.with_label_values(&[topic, "SUCCESS"]).inc();
            Ok(())
        }
        Err((err, _)) => {
            KAFKA_PUBLISHED.with_label_values(&[topic, "FAILURE"]).inc();
            warn!(tag = "[Kafka Push]", %topic, %key, "{err}");
            Err(AppError::KafkaPushFailed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_without_producer_fails() {
        let result = push_to_kafka(&None, "driver_locations", "driver-1", "payload").await;
        assert!(matches!(result, Err(AppError::KafkaPushFailed(_))));
    }
}
