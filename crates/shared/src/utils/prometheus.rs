/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
};

pub static INCOMING_API: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static CALL_EXTERNAL_API: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        opts!("external_request_duration", "Call external API requests").into(),
        &["method", "host", "service", "status"]
    )
    .expect("Failed to register call external API metrics")
});

pub static KAFKA_PUBLISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kafka_published_messages",
        "Messages published to kafka",
        &["topic", "status"]
    )
    .expect("Failed to register kafka publish metrics")
});

pub static KAFKA_CONSUMED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kafka_consumed_messages",
        "Messages consumed from kafka",
        &["topic", "status"]
    )
    .expect("Failed to register kafka consume metrics")
});

pub static CONNECTED_CLIENTS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        opts!("connected_clients", "Open websocket connections"),
        &["client_type"]
    )
    .expect("Failed to register connected clients metrics")
});

pub static QUEUE_COUNTER: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("queue_counter", "Queue Counter Monitoring")
        .expect("Failed to register queue counter metrics")
});

pub static QUEUE_DRAINER_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        opts!("queue_drainer_latency", "Queue Drainer Monitoring").into(),
        &["type"]
    )
    .expect("Failed to register queue drainer latency metrics")
});

/// Observes the latency of an incoming request.
///
/// * `$method` - HTTP method of the request.
/// * `$endpoint` - Route pattern of the request.
/// * `$status` - HTTP status of the response.
/// * `$code` - Error code of the response, `SUCCESS` otherwise.
/// * `$start` - `Instant` the request was received at.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        $crate::utils::prometheus::INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

/// Observes the latency of a call made to an external service.
#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        $crate::utils::prometheus::CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Observes how long a drain of queued entries took.
#[macro_export]
macro_rules! queue_drainer_latency {
    ($type:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        $crate::utils::prometheus::QUEUE_DRAINER_LATENCY
            .with_label_values(&[$type])
            .observe(duration);
    };
}

/// Builds the actix middleware that serves `/metrics` with every metric above registered.
///
/// # Panics
///
/// On failure to build the registry, only ever at start-up.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register call external API metrics");

    prometheus
        .registry
        .register(Box::new(KAFKA_PUBLISHED.to_owned()))
        .expect("Failed to register kafka publish metrics");

    prometheus
        .registry
        .register(Box::new(KAFKA_CONSUMED.to_owned()))
        .expect("Failed to register kafka consume metrics");

    prometheus
        .registry
        .register(Box::new(CONNECTED_CLIENTS.to_owned()))
        .expect("Failed to register connected clients metrics");

    prometheus
        .registry
        .register(Box::new(QUEUE_COUNTER.to_owned()))
        .expect("Failed to register queue counter metrics");

    prometheus
        .registry
        .register(Box::new(QUEUE_DRAINER_LATENCY.to_owned()))
        .expect("Failed to register queue drainer latency metrics");

    prometheus
}
