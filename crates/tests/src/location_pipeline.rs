/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! A driver position travels: websocket frame -> `driver_locations` topic -> drainer queue.

use driver_location_service::{
    consumer::{booking_update, position_update},
    drainer::{DrainerQueue, PositionUpdate},
};
use notification_service::session::frames::parse_location;
use shared::{
    kafka::consumer::decode_message,
    types::{BookedNotification, BookingStatus, DriverId, DriverLocation},
};

fn over_the_wire(location: &DriverLocation) -> anyhow::Result<DriverLocation> {
    let payload = serde_json::to_string(location)?;
    Ok(decode_message::<DriverLocation>(Some(payload.as_str()))?)
}

#[test]
fn websocket_position_lands_in_drainer_queue() -> anyhow::Result<()> {
    let driver_id = DriverId("17".to_string());

    let location = parse_location(
        r#"{"location": {"latitude": 12.97, "longitude": 77.59}}"#,
        &driver_id,
    )?;
    let (queued_for, update) = position_update(over_the_wire(&location)?);

    assert_eq!(queued_for, driver_id);
    match update {
        PositionUpdate::Moved(point) => {
            assert_eq!(point.latitude, 12.97);
            assert_eq!(point.longitude, 77.59);
        }
        PositionUpdate::Offline => panic!("expected a move"),
    }

    Ok(())
}

#[test]
fn disconnect_then_booking_leaves_driver_offline() -> anyhow::Result<()> {
    let driver_id = DriverId("17".to_string());
    let mut queue = DrainerQueue::default();

    let location = parse_location(r#"{"latitude": 12.97, "longitude": 77.59}"#, &driver_id)?;
    let (id, update) = position_update(over_the_wire(&location)?);
    queue.push(id, update);

    let (id, update) = position_update(over_the_wire(&DriverLocation::offline(&driver_id))?);
    queue.push(id, update);

    let booked = BookedNotification {
        user_id: "3".to_string(),
        driver_id: "17".to_string(),
        driver_name: "Ravi".to_string(),
        status: BookingStatus::Booked,
    };
    if let Some((id, update)) = booking_update(booked) {
        queue.push(id, update);
    }

    assert_eq!(queue.len(), 1);
    let batch = queue.take();
    assert!(batch.moved.is_empty());
    assert_eq!(batch.offline, vec!["17".to_string()]);
    assert!(queue.is_empty());

    Ok(())
}

#[test]
fn completed_booking_does_not_touch_the_index() {
    let completed = BookedNotification {
        user_id: "3".to_string(),
        driver_id: "17".to_string(),
        driver_name: String::new(),
        status: BookingStatus::Completed,
    };

    assert!(booking_update(completed).is_none());
}
