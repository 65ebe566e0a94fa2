/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{web, App, HttpServer};
use notification_service::{
    consumer::{run_booking_notification_consumer, run_driver_notification_consumer},
    domain::api,
    environment::{AppConfig, AppState, Consumers},
};
use shared::{
    middleware::*,
    shutdown::graceful_termination_flag,
    utils::{
        config::{dhall_config_path, read_dhall_config},
        logger::*,
        prometheus::prometheus_metrics,
    },
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let app_config = read_dhall_config::<AppConfig>(&dhall_config_path("notification_service"))
        .unwrap_or_else(|err| {
            println!("Dhall Config Reading Error : {}", err);
            std::process::exit(1);
        });

    let _guard = setup_tracing("notification_service", app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;
    let shutdown_timeout = app_config.shutdown_timeout_secs;
    let cors_allowed_origins = app_config.cors_allowed_origins.to_owned();

    let app_state = AppState::new(&app_config);
    let Consumers {
        driver_notification,
        booking_notification,
    } = Consumers::new(&app_config);

    let graceful_termination_requested = graceful_termination_flag();

    let driver_notification_consumer = actix_web::rt::spawn(run_driver_notification_consumer(
        app_state.hub.to_owned(),
        driver_notification.0,
        driver_notification.1,
        graceful_termination_requested.to_owned(),
    ));
    let booking_notification_consumer = actix_web::rt::spawn(run_booking_notification_consumer(
        app_state.hub.to_owned(),
        booking_notification.0,
        booking_notification.1,
        graceful_termination_requested,
    ));

    let limits = web::Data::new(app_state.limits);
    let data = web::Data::new(app_state);
    let prometheus = prometheus_metrics();

    info!(tag = "[Server Start]", %port, "Notification service listening");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(limits.clone())
            .app_data(json_config())
            .wrap(CheckContentLength)
            .wrap(RequestTimeout)
            .wrap(IncomingRequestMetrics)
            .wrap(TracingLogger::<DomainRootSpanBuilder>::new())
            .wrap(prometheus.clone())
            .wrap(cors(&cors_allowed_origins))
            .configure(api::handler)
    })
    .workers(workers)
    .shutdown_timeout(shutdown_timeout)
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    for consumer in [driver_notification_consumer, booking_notification_consumer] {
        if let Err(err) = consumer.await {
            error!(tag = "[Kafka Consumer]", "Consumer task failed : {err}");
        }
    }

    info!(tag = "[Graceful Shutting Down]", "Notification service stopped");
    Ok(())
}

fn main() {
    start_server().expect("Failed to start the server");
}
