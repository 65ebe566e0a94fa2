/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    get,
    web::{Data, Payload},
    Error, HttpRequest, HttpResponse,
};
use actix_web_actors::ws;

use crate::{environment::AppState, hub::messages::ClientKind, session::WsSession};

fn start_session(
    kind: ClientKind,
    data: Data<AppState>,
    req: HttpRequest,
    stream: Payload,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        kind,
        data.hub.to_owned(),
        data.jwt_secret.to_owned(),
        data.heartbeat,
    );

    ws::start(session, &req, stream)
}

#[get("/driver/ws")]
async fn driver_ws(
    data: Data<AppState>,
    req: HttpRequest,
    stream: Payload,
) -> Result<HttpResponse, Error> {
    start_session(ClientKind::Driver, data, req, stream)
}

#[get("/user/ws")]
async fn user_ws(
    data: Data<AppState>,
    req: HttpRequest,
    stream: Payload,
) -> Result<HttpResponse, Error> {
    start_session(ClientKind::User, data, req, stream)
}
