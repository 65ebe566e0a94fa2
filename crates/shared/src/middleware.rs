/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::time::Duration;

use crate::incoming_api;
use crate::tools::error::AppError;
use actix::fut::{ready, Ready};
use actix_cors::Cors;
use actix_http::{header::CONTENT_LENGTH, StatusCode};
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web::{self, Data},
    Error, HttpRequest,
};
use futures::future::LocalBoxFuture;
use serde::Deserialize;
use tokio::time::{timeout, Instant};
use tracing::Span;
use tracing::{error, info};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use uuid::Uuid;

/// Per-service request limits, registered as app data for [`RequestTimeout`] and [`CheckContentLength`].
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HttpLimits {
    /// Milliseconds
    pub request_timeout: u64,
    /// Bytes
    pub max_allowed_req_size: usize,
}

/// JSON extractor config turning body decode failures into `UNPROCESSIBLE_REQUEST`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _| AppError::UnprocessibleRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into())
}

/// CORS policy allowing the configured origins with any method and header. `*` allows every origin.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

/// Fails a request with `RequestTimeout` once it outlives the configured limit.
pub struct RequestTimeout;

impl<S: 'static> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware { service }))
    }
}

pub struct RequestTimeoutMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(request_timeout) = req
            .app_data::<Data<HttpLimits>>()
            .map(|limits| limits.request_timeout)
        {
            let timeout_duration = Duration::from_millis(request_timeout);
            let fut = self.service.call(req);
            Box::pin(async move {
                match timeout(timeout_duration, fut).await {
                    Ok(res) => Ok(res?),
                    Err(_) => Err(actix_web::Error::from(AppError::RequestTimeout)),
                }
            })
        } else {
            let fut = self.service.call(req);
            Box::pin(fut)
        }
    }
}

/// Root span of every request, tagged with the caller's `x-request-id` or a fresh one.
pub struct DomainRootSpanBuilder;

impl RootSpanBuilder for DomainRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|request_id| request_id.to_str().ok())
            .map(|str| str.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing_actix_web::root_span!(request, request_id)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Logs every request with its latency and records it in the `http_request_duration_seconds` histogram.
pub struct IncomingRequestMetrics;

impl<S> Transform<S, ServiceRequest> for IncomingRequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = IncomingRequestMetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IncomingRequestMetricsMiddleware { service }))
    }
}

pub struct IncomingRequestMetricsMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for IncomingRequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();

        let req_path = get_path(req.request());
        let req_method = req.method().to_string();

        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(response) => {
                    calculate_metrics(
                        response.response().error(),
                        response.status(),
                        &req_method,
                        &req_path,
                        start_time,
                    );
                    Ok(response)
                }
                Err(err) => {
                    let err_resp_status = err.error_response().status();
                    calculate_metrics(
                        Some(&err),
                        err_resp_status,
                        &req_method,
                        &req_path,
                        start_time,
                    );
                    Err(err)
                }
            }
        })
    }
}

/// Path with every matched segment replaced by its `:name`, keeping metric cardinality bounded.
fn get_path(request: &HttpRequest) -> String {
    let mut path = request.path().to_string();
    request
        .match_info()
        .iter()
        .for_each(|(path_name, path_val)| {
            path = path.replace(path_val, format!(":{path_name}").as_str());
        });
    path
}

fn calculate_metrics(
    err_resp: Option<&Error>,
    resp_status: StatusCode,
    req_method: &str,
    req_path: &str,
    time: Instant,
) {
    if let Some(err_resp) = err_resp {
        let err_resp_code = err_resp.to_string();
        error!(tag = "[INCOMING API - ERROR]", request_method = %req_method, request_path = %req_path, response_code = err_resp_code, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(
            req_method,
            req_path,
            resp_status.as_str(),
            err_resp_code.as_str(),
            time
        );
    } else {
        info!(tag = "[INCOMING API]", request_method = %req_method, request_path = %req_path, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(req_method, req_path, resp_status.as_str(), "SUCCESS", time);
    }
}

/// Rejects requests whose `Content-Length` exceeds the configured limit with `413`.
pub struct CheckContentLength;

impl<S> Transform<S, ServiceRequest> for CheckContentLength
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CheckContentLengthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckContentLengthMiddleware { service }))
    }
}

pub struct CheckContentLengthMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for CheckContentLengthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let (content_length, limit) = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|content_length| content_length.to_str().ok()?.parse::<usize>().ok())
            .map_or((usize::MAX, usize::MAX), |content_length| {
                req.app_data::<Data<HttpLimits>>()
                    .map(|limits| (content_length, limits.max_allowed_req_size))
                    .unwrap_or((usize::MAX, usize::MAX))
            });

        if content_length > limit {
            return Box::pin(async move {
                Err(actix_web::Error::from(AppError::LargePayloadSize(
                    content_length,
                    limit,
                )))
            });
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?) })
    }
}
