/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix::Addr;
use rdkafka::consumer::StreamConsumer;
use shared::{
    kafka::consumer::run_consumer,
    tools::error::AppError,
    types::{BookedNotification, BookingNotification},
    utils::logger::*,
};
use std::sync::{atomic::AtomicBool, Arc};

use crate::hub::{
    messages::{BookingUpdate, NotifyDriver},
    Hub,
};

/// Delivers booking offers to the drivers they were addressed to.
pub async fn run_driver_notification_consumer(
    hub: Addr<Hub>,
    consumer: StreamConsumer,
    topic: String,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    run_consumer(
        consumer,
        topic,
        |notification: BookingNotification| {
            let hub = hub.to_owned();
            async move {
                let driver_id = notification.driver_id.to_owned();
                let delivered = hub
                    .send(NotifyDriver(notification))
                    .await
                    .map_err(|err| AppError::InternalError(err.to_string()))?;

                if !delivered {
                    info!(tag = "[Driver Notification]", %driver_id, "Driver not connected, dropping offer");
                }
                Ok::<(), AppError>(())
            }
        },
        graceful_termination_requested,
    )
    .await
}

/// Keeps the driver to user assignments current and tells users about their booking.
pub async fn run_booking_notification_consumer(
    hub: Addr<Hub>,
    consumer: StreamConsumer,
    topic: String,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    run_consumer(
        consumer,
        topic,
        |update: BookedNotification| {
            let hub = hub.to_owned();
            async move {
                let (user_id, status) = (update.user_id.to_owned(), update.status);
                let delivered = hub
                    .send(BookingUpdate(update))
                    .await
                    .map_err(|err| AppError::InternalError(err.to_string()))?;

                if !delivered {
                    info!(tag = "[Booking Notification]", %user_id, %status, "User not connected");
                }
                Ok::<(), AppError>(())
            }
        },
        graceful_termination_requested,
    )
    .await
}
