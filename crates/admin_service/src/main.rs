/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{web, App, HttpServer};
use admin_service::{
    domain::api,
    environment::{AppConfig, AppState},
};
use shared::{
    middleware::*,
    utils::{
        config::{dhall_config_path, read_dhall_config},
        logger::*,
        prometheus::prometheus_metrics,
    },
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let app_config = read_dhall_config::<AppConfig>(&dhall_config_path("admin_service"))
        .unwrap_or_else(|err| {
            println!("Dhall Config Reading Error : {}", err);
            std::process::exit(1);
        });

    let _guard = setup_tracing("admin_service", app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;
    let cors_allowed_origins = app_config.cors_allowed_origins.to_owned();

    let app_state = AppState::new(app_config).await;

    let limits = web::Data::new(app_state.limits);
    let auth_cfg = web::Data::new(app_state.auth_cfg.to_owned());
    let data = web::Data::new(app_state);
    let prometheus = prometheus_metrics();

    info!(tag = "[Server Start]", %port, "Admin service listening");

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
    .await
}

fn main() {
    start_server().expect("Failed to start the server");
}
