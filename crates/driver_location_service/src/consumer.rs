/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use rdkafka::consumer::StreamConsumer;
use shared::{
    kafka::consumer::run_consumer,
    tools::error::AppError,
    types::{BookedNotification, BookingStatus, DriverId, DriverLocation},
    utils::logger::*,
};
use std::sync::{atomic::AtomicBool, Arc};
use tokio::sync::mpsc::Sender;

use crate::drainer::PositionUpdate;

/// (0, 0) is how the notification service reports a driver going offline.
pub fn position_update(location: DriverLocation) -> (DriverId, PositionUpdate) {
    let update = if location.location.is_origin() {
        PositionUpdate::Offline
    } else {
        PositionUpdate::Moved(location.location)
    };

    (DriverId(location.driver_id), update)
}

/// Booked drivers leave the geo index so they are not offered further requests.
pub fn booking_update(notification: BookedNotification) -> Option<(DriverId, PositionUpdate)> {
    (notification.status == BookingStatus::Booked)
        .then(|| (DriverId(notification.driver_id), PositionUpdate::Offline))
}

async fn enqueue(
    sender: &Sender<(DriverId, PositionUpdate)>,
    entry: (DriverId, PositionUpdate),
) -> Result<(), AppError> {
    sender
        .send(entry)
        .await
        .map_err(|err| AppError::InternalError(format!("Drainer is gone : {err}")))
}

pub async fn run_driver_location_consumer(
    sender: Sender<(DriverId, PositionUpdate)>,
    consumer: StreamConsumer,
    topic: String,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    run_consumer(
        consumer,
        topic,
        |location: DriverLocation| {
            let sender = sender.to_owned();
            async move {
                debug!(tag = "[Driver Location]", driver_id = %location.driver_id);
                enqueue(&sender, position_update(location)).await
            }
        },
        graceful_termination_requested,
    )
    .await
}

pub async fn run_booking_notification_consumer(
    sender: Sender<(DriverId, PositionUpdate)>,
    consumer: StreamConsumer,
    topic: String,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    run_consumer(
        consumer,
        topic,
        |notification: BookedNotification| {
            let sender = sender.to_owned();
            async move {
                match booking_update(notification) {
                    Some((driver_id, update)) => {
                        info!(tag = "[Driver Booked]", driver_id = %driver_id.0, "Removing from geo index");
                        enqueue(&sender, (driver_id, update)).await
                    }
                    None => Ok(()),
                }
            }
        },
        graceful_termination_requested,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::types::{GeoPoint, Latitude, Longitude};

    fn booked(status: BookingStatus) -> BookedNotification {
        BookedNotification {
            user_id: "u1".to_string(),
            driver_id: "d1".to_string(),
            driver_name: String::new(),
            status,
        }
    }

    #[test]
    fn origin_means_offline() {
        let (driver_id, update) = position_update(DriverLocation::offline(&DriverId("d1".to_string())));
        assert_eq!(driver_id, DriverId("d1".to_string()));
        assert_eq!(update, PositionUpdate::Offline);
    }

    #[test]
    fn real_position_is_a_move() {
        let point = GeoPoint::new(Latitude(18.5), Longitude(73.8));
        let (_, update) = position_update(DriverLocation {
            driver_id: "d1".to_string(),
            location: point.to_owned(),
            timestamp: Utc::now(),
        });
        assert_eq!(update, PositionUpdate::Moved(point));
    }

    #[test]
    fn only_booked_events_remove_the_driver() {
        assert_eq!(
            booking_update(booked(BookingStatus::Booked)),
            Some((DriverId("d1".to_string()), PositionUpdate::Offline))
        );
        assert_eq!(booking_update(booked(BookingStatus::Completed)), None);
        assert_eq!(booking_update(booked(BookingStatus::InProgress)), None);
    }

    #[tokio::test]
    async fn enqueue_fails_once_the_drainer_is_gone() {
        let (sender, receiver) = tokio::sync::mpsc::channel(1);
        drop(receiver);

        let result = enqueue(&sender, (DriverId("d1".to_string()), PositionUpdate::Offline)).await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
