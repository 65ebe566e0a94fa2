/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix::{Message, MessageResponse, Recipient};
use serde::{Deserialize, Serialize};
use shared::types::{BookedNotification, BookingNotification, DriverLocation, Role};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClientKind {
    Driver,
    User,
}

impl ClientKind {
    pub fn role(&self) -> Role {
        match self {
            ClientKind::Driver => Role::Driver,
            ClientKind::User => Role::User,
        }
    }
}

/// What the hub asks a websocket session to do.
#[derive(Message, Debug, Clone, PartialEq)]
#[rtype(result = "()")]
pub enum SessionCommand {
    Text(String),
    Close(String),
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub kind: ClientKind,
    pub id: String,
    pub conn_id: u64,
    pub session: Recipient<SessionCommand>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub kind: ClientKind,
    pub id: String,
    pub conn_id: u64,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct LocationUpdate(pub DriverLocation);

/// Resolves to whether the driver was connected.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct NotifyDriver(pub BookingNotification);

/// Resolves to whether the user was connected.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct BookingUpdate(pub BookedNotification);

#[derive(Message)]
#[rtype(result = "HubStats")]
pub struct GetStats;

#[derive(MessageResponse, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HubStats {
    pub drivers: usize,
    pub users: usize,
}
