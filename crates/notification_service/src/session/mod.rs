/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod frames;

use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws::{self, CloseCode, CloseReason};
use shared::{types::DriverId, utils::logger::*};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use crate::hub::{
    messages::{ClientKind, Connect, Disconnect, LocationUpdate, SessionCommand},
    Hub,
};
use frames::{authenticate, parse_location, AuthRejection};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    pub interval: Duration,
    pub client_timeout: Duration,
}

/// One websocket connection, driver or user. Unauthenticated until its first text frame.
pub struct WsSession {
    kind: ClientKind,
    conn_id: u64,
    account_id: Option<String>,
    last_seen: Instant,
    heartbeat: Heartbeat,
    jwt_secret: String,
    hub: Addr<Hub>,
}

impl WsSession {
    pub fn new(kind: ClientKind, hub: Addr<Hub>, jwt_secret: String, heartbeat: Heartbeat) -> Self {
        WsSession {
            kind,
            conn_id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            account_id: None,
            last_seen: Instant::now(),
            heartbeat,
            jwt_secret,
            hub,
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat.interval, |session, ctx| {
            if Instant::now().duration_since(session.last_seen) > session.heartbeat.client_timeout {
                warn!(tag = "[Websocket Heartbeat]", kind = %session.kind, conn_id = session.conn_id, "Client went silent, dropping connection");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });

        ctx.run_later(self.heartbeat.client_timeout, |session, ctx| {
            if session.account_id.is_none() {
                close(ctx, AuthRejection::AuthenticationRequired.close_reason());
            }
        });
    }

    fn on_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(account_id) = self.account_id.to_owned() else {
            match authenticate(text, &self.jwt_secret, self.kind) {
                Ok(account_id) => {
                    self.hub.do_send(Connect {
                        kind: self.kind,
                        id: account_id.to_owned(),
                        conn_id: self.conn_id,
                        session: ctx.address().recipient(),
                    });
                    self.account_id = Some(account_id);
                }
                Err(rejection) => {
                    warn!(tag = "[Websocket Auth]", kind = %self.kind, ?rejection);
                    close(ctx, rejection.close_reason());
                }
            }
            return;
        };

        // Users only listen; anything they send after authenticating is ignored.
        if self.kind == ClientKind::Driver {
            match parse_location(text, &DriverId(account_id)) {
                Ok(location) => self.hub.do_send(LocationUpdate(location)),
                Err(err) => {
                    warn!(tag = "[Driver Location]", conn_id = self.conn_id, "Ignoring frame : {}", err.message())
                }
            }
        }
    }
}

fn close(ctx: &mut ws::WebsocketContext<WsSession>, reason: String) {
    ctx.close(Some(CloseReason {
        code: CloseCode::Policy,
        description: Some(reason),
    }));
    ctx.stop();
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(account_id) = self.account_id.take() {
            self.hub.do_send(Disconnect {
                kind: self.kind,
                id: account_id,
                conn_id: self.conn_id,
            });
        }
    }
}

impl Handler<SessionCommand> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: SessionCommand, ctx: &mut Self::Context) {
        match msg {
            SessionCommand::Text(text) => ctx.text(text),
            SessionCommand::Close(reason) => close(ctx, reason),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                warn!(tag = "[Websocket]", kind = %self.kind, conn_id = self.conn_id, "Protocol error : {err}");
                ctx.stop();
                return;
            }
        };

        self.last_seen = Instant::now();

        match msg {
            ws::Message::Ping(bytes) => ctx.pong(&bytes),
            ws::Message::Pong(_) | ws::Message::Nop => {}
            ws::Message::Text(text) => self.on_text(&text, ctx),
            ws::Message::Binary(_) => {
                debug!(tag = "[Websocket]", conn_id = self.conn_id, "Ignoring binary frame")
            }
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) => ctx.stop(),
        }
    }
}
