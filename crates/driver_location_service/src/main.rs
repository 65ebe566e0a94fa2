/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{web, App, HttpServer};
use driver_location_service::{
    consumer::{run_booking_notification_consumer, run_driver_location_consumer},
    domain::api,
    drainer::{run_drainer, PositionUpdate},
    environment::{AppConfig, AppState},
};
use shared::{
    kafka::consumer::create_consumer,
    middleware::*,
    shutdown::graceful_termination_flag,
    types::DriverId,
    utils::{
        config::{dhall_config_path, read_dhall_config},
        logger::*,
        prometheus::prometheus_metrics,
    },
};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let app_config =
        read_dhall_config::<AppConfig>(&dhall_config_path("driver_location_service"))
            .unwrap_or_else(|err| {
                println!("Dhall Config Reading Error : {}", err);
                std::process::exit(1);
            });

    let _guard = setup_tracing("driver_location_service", app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;
    let cors_allowed_origins = app_config.cors_allowed_origins.to_owned();

    let location_consumer = create_consumer(
        &app_config.kafka_cfg,
        &app_config.driver_location_group,
        &app_config.driver_location_topic,
    )
    .expect("Failed to create driver location consumer");
    let booking_consumer = create_consumer(
        &app_config.kafka_cfg,
        &app_config.booking_notification_group,
        &app_config.booking_notification_topic,
    )
    .expect("Failed to create booking notification consumer");
    let (location_topic, booking_topic) = (
        app_config.driver_location_topic.to_owned(),
        app_config.booking_notification_topic.to_owned(),
    );

    #[allow(clippy::type_complexity)]
    let (sender, receiver): (
        Sender<(DriverId, PositionUpdate)>,
        Receiver<(DriverId, PositionUpdate)>,
    ) = mpsc::channel(app_config.drainer_size);

    let app_state = AppState::new(app_config).await;
    let graceful_termination_requested = graceful_termination_flag();

    let (drainer_size, drainer_delay, redis) = (
        app_state.drainer_size,
        app_state.drainer_delay,
        app_state.redis.clone(),
    );
    let drainer_termination_requested = graceful_termination_requested.to_owned();
    let drainer_thread = tokio::spawn(async move {
        run_drainer(
            receiver,
            drainer_termination_requested,
            drainer_size,
            drainer_delay,
            &redis,
        )
        .await;
    });

    let consumer_threads = [
        tokio::spawn(run_driver_location_consumer(
            sender.to_owned(),
            location_consumer,
            location_topic,
            graceful_termination_requested.to_owned(),
        )),
        tokio::spawn(run_booking_notification_consumer(
            sender,
            booking_consumer,
            booking_topic,
            graceful_termination_requested,
        )),
    ];

    let limits = web::Data::new(app_state.limits);
    let auth_cfg = web::Data::new(app_state.auth_cfg.to_owned());
    let data = web::Data::new(app_state);
    let prometheus = prometheus_metrics();

    info!(tag = "[Server Start]", %port, "Driver location service listening");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(limits.clone())
            .app_data(auth_cfg.clone())
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
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    for consumer_thread in consumer_threads {
        if let Err(err) = consumer_thread.await {
            error!(tag = "[Kafka Consumer]", "Consumer task failed : {err}");
        }
    }

    if let Err(err) = drainer_thread.await {
        error!(tag = "[Drainer]", "Drainer task failed : {err}");
    }

    Ok(())
}

fn main() {
    start_server().expect("Failed to start the server");
}
