/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix::{Actor, Context, Handler, Recipient};
use rdkafka::producer::FutureProducer;
use serde::Serialize;
use shared::{
    kafka::producer::push_to_kafka,
    types::{DriverId, DriverLocation},
    utils::{logger::*, prometheus::CONNECTED_CLIENTS},
};

use super::{
    messages::*,
    registry::{LocationRoute, Registry},
};
use crate::session::frames::LocationForward;

/// Owns every live websocket session and routes kafka events and driver locations between them.
pub struct Hub {
    registry: Registry<Recipient<SessionCommand>>,
    producer: Option<FutureProducer>,
    driver_location_topic: String,
}

impl Hub {
    pub fn new(producer: Option<FutureProducer>, driver_location_topic: String) -> Self {
        Hub {
            registry: Registry::default(),
            producer,
            driver_location_topic,
        }
    }

    fn publish_location(&self, location: DriverLocation) {
        let producer = self.producer.to_owned();
        let topic = self.driver_location_topic.to_owned();

        actix::spawn(async move {
            let key = location.driver_id.to_owned();
            if let Err(err) = push_to_kafka(&producer, &topic, &key, location).await {
                error!(tag = "[Driver Location]", driver_id = %key, "{}", err.message());
            }
        });
    }

    fn record_connections(&self) {
        let (drivers, users) = self.registry.counts();
        CONNECTED_CLIENTS
            .with_label_values(&[ClientKind::Driver.to_string().as_str()])
            .set(drivers as i64);
        CONNECTED_CLIENTS
            .with_label_values(&[ClientKind::User.to_string().as_str()])
            .set(users as i64);
    }
}

fn send_json<T: Serialize>(session: &Recipient<SessionCommand>, message: &T) {
    match serde_json::to_string(message) {
        Ok(text) => session.do_send(SessionCommand::Text(text)),
        Err(err) => error!(tag = "[Hub]", "Failed to serialize outgoing message : {err}"),
    }
}

impl Actor for Hub {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(tag = "[Hub]", "Connection hub started");
    }
}

impl Handler<Connect> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        let replaced = match msg.kind {
            ClientKind::Driver => self.registry.register_driver(&msg.id, msg.conn_id, msg.session),
            ClientKind::User => self.registry.register_user(&msg.id, msg.conn_id, msg.session),
        };

        if let Some(previous) = replaced {
            info!(tag = "[Hub]", kind = %msg.kind, id = %msg.id, "Replacing older connection");
            previous.do_send(SessionCommand::Close(
                "Replaced by a newer connection".to_string(),
            ));
        }

        info!(tag = "[Client Connected]", kind = %msg.kind, id = %msg.id);
        self.record_connections();
    }
}

impl Handler<Disconnect> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        let was_current = match msg.kind {
            ClientKind::Driver => self.registry.unregister_driver(&msg.id, msg.conn_id),
            ClientKind::User => self.registry.unregister_user(&msg.id, msg.conn_id),
        };

        if !was_current {
            return;
        }

        info!(tag = "[Client Disconnected]", kind = %msg.kind, id = %msg.id);
        self.record_connections();

        if msg.kind == ClientKind::Driver {
            self.publish_location(DriverLocation::offline(&DriverId(msg.id)));
        }
    }
}

impl Handler<LocationUpdate> for Hub {
    type Result = ();

    fn handle(&mut self, LocationUpdate(location): LocationUpdate, _ctx: &mut Self::Context) {
        match self.registry.route_location(&location.driver_id) {
            LocationRoute::ToUser { user_id, session } => {
                debug!(tag = "[Driver Location]", driver_id = %location.driver_id, %user_id, "Forwarding to user");
                send_json(&session, &LocationForward::from(&location));
            }
            LocationRoute::Publish => self.publish_location(location),
        }
    }
}

impl Handler<NotifyDriver> for Hub {
    type Result = bool;

    fn handle(&mut self, NotifyDriver(notification): NotifyDriver, _ctx: &mut Self::Context) -> bool {
        match self.registry.driver(&notification.driver_id) {
            Some(session) => {
                send_json(&session, &notification);
                true
            }
            None => false,
        }
    }
}

impl Handler<BookingUpdate> for Hub {
    type Result = bool;

    fn handle(&mut self, BookingUpdate(update): BookingUpdate, _ctx: &mut Self::Context) -> bool {
        let session = self.registry.apply_booking_update(&update);
        self.record_connections();

        match session {
            Some(session) => {
                send_json(&session, &update);
                true
            }
            None => false,
        }
    }
}

impl Handler<GetStats> for Hub {
    type Result = HubStats;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> HubStats {
        let (drivers, users) = self.registry.counts();
        HubStats { drivers, users }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::types::{
        BookedNotification, BookingNotification, BookingStatus, GeoPoint, Latitude, Longitude,
    };
    use std::sync::{Arc, Mutex};

    struct Recorder {
        inbox: Arc<Mutex<Vec<SessionCommand>>>,
    }

    impl Actor for Recorder {
        type Context = Context<Self>;
    }

    impl Handler<SessionCommand> for Recorder {
        type Result = ();

        fn handle(&mut self, msg: SessionCommand, _ctx: &mut Self::Context) {
            self.inbox.lock().expect("inbox lock").push(msg);
        }
    }

    fn recorder() -> (Recipient<SessionCommand>, Arc<Mutex<Vec<SessionCommand>>>) {
        let inbox = Arc::new(Mutex::new(Vec::new()));
        let addr = Recorder {
            inbox: inbox.to_owned(),
        }
        .start();
        (addr.recipient(), inbox)
    }

    /// Mailboxes are FIFO, so once a marker is handled everything sent before it has been too.
    async fn drain(session: &Recipient<SessionCommand>) {
        session
            .send(SessionCommand::Text("marker".to_string()))
            .await
            .expect("recorder alive");
    }

    fn hub() -> actix::Addr<Hub> {
        Hub::new(None, "driver_locations".to_string()).start()
    }

    #[actix_rt::test]
    async fn booked_driver_locations_reach_the_user() {
        let hub = hub();
        let (user, inbox) = recorder();

        hub.send(Connect {
            kind: ClientKind::User,
            id: "u1".to_string(),
            conn_id: 1,
            session: user.to_owned(),
        })
        .await
        .expect("hub alive");

        let delivered = hub
            .send(BookingUpdate(BookedNotification {
                user_id: "u1".to_string(),
                driver_id: "d1".to_string(),
                driver_name: "Ravi".to_string(),
                status: BookingStatus::Booked,
            }))
            .await
            .expect("hub alive");
        assert!(delivered);

        hub.send(LocationUpdate(DriverLocation {
            driver_id: "d1".to_string(),
            location: GeoPoint::new(Latitude(18.5), Longitude(73.8)),
            timestamp: Utc::now(),
        }))
        .await
        .expect("hub alive");
        drain(&user).await;

        let inbox = inbox.lock().expect("inbox lock");
        assert_eq!(inbox.len(), 3);

        let SessionCommand::Text(booked) = &inbox[0] else {
            panic!("expected booking update, got {:?}", inbox[0]);
        };
        let booked: BookedNotification = serde_json::from_str(booked).expect("booking json");
        assert_eq!(booked.status, BookingStatus::Booked);

        let SessionCommand::Text(location) = &inbox[1] else {
            panic!("expected location, got {:?}", inbox[1]);
        };
        let location: LocationForward = serde_json::from_str(location).expect("location json");
        assert_eq!(location.driver_id, "d1");
        assert_eq!((location.latitude, location.longitude), (18.5, 73.8));
    }

    #[actix_rt::test]
    async fn newer_driver_connection_closes_the_older_one() {
        let hub = hub();
        let (first, first_inbox) = recorder();
        let (second, _) = recorder();

        for (conn_id, session) in [(1, first.to_owned()), (2, second)] {
            hub.send(Connect {
                kind: ClientKind::Driver,
                id: "d1".to_string(),
                conn_id,
                session,
            })
            .await
            .expect("hub alive");
        }
        drain(&first).await;

        assert_eq!(
            first_inbox.lock().expect("inbox lock")[0],
            SessionCommand::Close("Replaced by a newer connection".to_string())
        );

        let stats = hub.send(GetStats).await.expect("hub alive");
        assert_eq!(stats, HubStats { drivers: 1, users: 0 });
    }

    #[actix_rt::test]
    async fn offers_reach_only_connected_drivers() {
        let hub = hub();
        let (driver, inbox) = recorder();
        hub.send(Connect {
            kind: ClientKind::Driver,
            id: "d1".to_string(),
            conn_id: 1,
            session: driver.to_owned(),
        })
        .await
        .expect("hub alive");

        let offer = |driver_id: &str| BookingNotification {
            user_id: "u1".to_string(),
            driver_id: driver_id.to_string(),
            price: 120.0,
            pickup: GeoPoint::default(),
            dropoff: GeoPoint::default(),
            user_name: "Asha".to_string(),
            request_id: "r1".to_string(),
            mongo_id: "r1".to_string(),
        };

        assert!(hub.send(NotifyDriver(offer("d1"))).await.expect("hub alive"));
        assert!(!hub.send(NotifyDriver(offer("d2"))).await.expect("hub alive"));

        hub.send(Disconnect {
            kind: ClientKind::Driver,
            id: "d1".to_string(),
            conn_id: 1,
        })
        .await
        .expect("hub alive");
        assert!(!hub.send(NotifyDriver(offer("d1"))).await.expect("hub alive"));

        drain(&driver).await;
        assert_eq!(inbox.lock().expect("inbox lock").len(), 2);
    }
}
