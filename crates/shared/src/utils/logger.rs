/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

#![allow(clippy::expect_used)]

use serde::Deserialize;
use tracing::subscriber::set_global_default;
pub use tracing::{debug, error, info, instrument, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
    OFF,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::TRACE => LevelFilter::TRACE,
            LogLevel::DEBUG => LevelFilter::DEBUG,
            LogLevel::INFO => LevelFilter::INFO,
            LogLevel::WARN => LevelFilter::WARN,
            LogLevel::ERROR => LevelFilter::ERROR,
            LogLevel::OFF => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
}

/// Installs the global bunyan JSON subscriber for a service.
///
/// `RUST_LOG` directives, when present, narrow the configured level per target
/// (e.g. `rdkafka=warn`). Keep the returned guard alive for the whole process,
/// dropping it stops the non-blocking writer.
pub fn setup_tracing(service_name: &str, logger_cfg: LoggerConfig) -> WorkerGuard {
    LogTracer::init().expect("Failed to setup logger");

    let app_name = format!("{service_name}-{}", env!("CARGO_PKG_VERSION"));

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(logger_cfg.level).into())
        .from_env_lossy();

    let (non_blocking_console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let bunyan_console_formatting_layer =
        BunyanFormattingLayer::new(app_name.clone(), non_blocking_console_writer);

    if logger_cfg.log_to_file {
        let non_blocking_file_writer =
            tracing_appender::rolling::daily("logs", format!("{app_name}.log"));
        let bunyan_file_formatting_layer =
            BunyanFormattingLayer::new(app_name, non_blocking_file_writer);

        let subscriber = Registry::default()
            .with(LevelFilter::from(logger_cfg.level))
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(bunyan_file_formatting_layer)
            .with(bunyan_console_formatting_layer);

        set_global_default(subscriber).expect("Unable to set global tracing subscriber");
    } else {
        let subscriber = Registry::default()
            .with(LevelFilter::from(logger_cfg.level))
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(bunyan_console_formatting_layer);

        set_global_default(subscriber).expect("Unable to set global tracing subscriber");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_read_from_dhall() {
        let cfg: LoggerConfig =
            serde_dhall::from_str("{ level = < TRACE | DEBUG | INFO | WARN | ERROR | OFF >.WARN, log_to_file = False }")
                .parse()
                .expect("valid logger config");
        assert_eq!(cfg.level, LogLevel::WARN);
        assert!(!cfg.log_to_file);
        assert_eq!(LevelFilter::from(cfg.level), LevelFilter::WARN);
    }
}
