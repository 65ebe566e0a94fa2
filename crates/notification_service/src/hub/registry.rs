/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use shared::types::{BookedNotification, BookingStatus};
use std::collections::HashMap;

struct Connection<S> {
    conn_id: u64,
    session: S,
}

/// Live sessions of one kind of client, keyed by account id.
struct Connections<S> {
    sessions: HashMap<String, Connection<S>>,
}

impl<S: Clone> Connections<S> {
    fn new() -> Self {
        Connections {
            sessions: HashMap::new(),
        }
    }

    fn register(&mut self, id: &str, conn_id: u64, session: S) -> Option<S> {
        self.sessions
            .insert(id.to_string(), Connection { conn_id, session })
            .filter(|previous| previous.conn_id != conn_id)
            .map(|previous| previous.session)
    }

    /// Only the connection that is still current for `id` may remove it.
    fn unregister(&mut self, id: &str, conn_id: u64) -> bool {
        match self.sessions.get(id) {
            Some(connection) if connection.conn_id == conn_id => {
                self.sessions.remove(id);
                true
            }
            _ => false,
        }
    }

    fn get(&self, id: &str) -> Option<S> {
        self.sessions.get(id).map(|connection| connection.session.clone())
    }

    fn remove(&mut self, id: &str) -> Option<S> {
        self.sessions.remove(id).map(|connection| connection.session)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

pub enum LocationRoute<S> {
    /// The driver is on a trip and its user is watching.
    ToUser { user_id: String, session: S },
    Publish,
}

/// Who is connected, and which driver is currently serving which user.
pub struct Registry<S> {
    drivers: Connections<S>,
    users: Connections<S>,
    driver_users: HashMap<String, String>,
}

impl<S: Clone> Default for Registry<S> {
    fn default() -> Self {
        Registry {
            drivers: Connections::new(),
            users: Connections::new(),
            driver_users: HashMap::new(),
        }
    }
}

impl<S: Clone> Registry<S> {
    /// Returns the session this one replaces, if any.
    pub fn register_driver(&mut self, driver_id: &str, conn_id: u64, session: S) -> Option<S> {
        self.drivers.register(driver_id, conn_id, session)
    }

    pub fn unregister_driver(&mut self, driver_id: &str, conn_id: u64) -> bool {
        self.drivers.unregister(driver_id, conn_id)
    }

    pub fn register_user(&mut self, user_id: &str, conn_id: u64, session: S) -> Option<S> {
        self.users.register(user_id, conn_id, session)
    }

    pub fn unregister_user(&mut self, user_id: &str, conn_id: u64) -> bool {
        self.users.unregister(user_id, conn_id)
    }

    pub fn driver(&self, driver_id: &str) -> Option<S> {
        self.drivers.get(driver_id)
    }

    pub fn assigned_user(&self, driver_id: &str) -> Option<&str> {
        self.driver_users.get(driver_id).map(String::as_str)
    }

    pub fn route_location(&self, driver_id: &str) -> LocationRoute<S> {
        self.driver_users
            .get(driver_id)
            .and_then(|user_id| {
                self.users.get(user_id).map(|session| LocationRoute::ToUser {
                    user_id: user_id.to_owned(),
                    session,
                })
            })
            .unwrap_or(LocationRoute::Publish)
    }

    /// Applies a booking status change and returns the session of the user to notify.
    pub fn apply_booking_update(&mut self, update: &BookedNotification) -> Option<S> {
        match update.status {
            BookingStatus::Booked => {
                self.driver_users
                    .insert(update.driver_id.to_owned(), update.user_id.to_owned());
                self.users.get(&update.user_id)
            }
            BookingStatus::Completed => {
                self.driver_users.remove(&update.driver_id);
                self.users.remove(&update.user_id)
            }
            BookingStatus::Cancelled => {
                self.driver_users.remove(&update.driver_id);
                self.users.get(&update.user_id)
            }
            _ => self.users.get(&update.user_id),
        }
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.drivers.len(), self.users.len())
    }
}
