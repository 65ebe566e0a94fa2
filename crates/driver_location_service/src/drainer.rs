/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use shared::{
    queue_drainer_latency,
    redis::{keys::driver_locations_key, types::RedisConnectionPool},
    types::{DriverId, GeoPoint},
    utils::{logger::*, prometheus::QUEUE_COUNTER},
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tokio::{sync::mpsc::Receiver, time::interval};

#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Moved(GeoPoint),
    /// Drop the driver from the geo index.
    Offline,
}

/// Pending writes to the geo index, at most one per driver.
#[derive(Debug, Default)]
pub struct DrainerQueue {
    pending: HashMap<String, PositionUpdate>,
}

pub struct Batch {
    pub moved: Vec<(String, GeoPoint)>,
    pub offline: Vec<String>,
}

impl DrainerQueue {
    /// Queues `update`, replacing whatever was pending for the driver. Returns the queue length.
    pub fn push(&mut self, DriverId(driver_id): DriverId, update: PositionUpdate) -> usize {
        self.pending.insert(driver_id, update);
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn take(&mut self) -> Batch {
        let mut batch = Batch {
            moved: Vec::new(),
            offline: Vec::new(),
        };

        for (driver_id, update) in self.pending.drain() {
            match update {
                PositionUpdate::Moved(point) => batch.moved.push((driver_id, point)),
                PositionUpdate::Offline => batch.offline.push(driver_id),
            }
        }

        batch
    }
}

async fn drain_driver_locations(queue: &mut DrainerQueue, redis: &RedisConnectionPool) {
    let start = Instant::now();
    let length = queue.len();
    let Batch { moved, offline } = queue.take();
    let key = driver_locations_key();

    if let Err(err) = redis.geo_add_batch(&key, moved).await {
        error!(tag = "[Error Pushing To Redis]", error = %err.message());
    }

    for driver_id in offline {
        if let Err(err) = redis.zrem(&key, &driver_id).await {
            error!(tag = "[Error Removing From Redis]", %driver_id, error = %err.message());
        }
    }

    QUEUE_COUNTER.reset();
    queue_drainer_latency!("DRIVER_LOCATIONS", start);
    info!(tag = "[Drained Queue]", %length, latency_ms = start.elapsed().as_millis() as u64);
}

/// Batches position updates into Redis, flushing every `drainer_delay` seconds or as soon as
/// `drainer_size` drivers are pending. Whatever is queued when shutdown is requested is flushed.
pub async fn run_drainer(
    mut rx: Receiver<(DriverId, PositionUpdate)>,
    graceful_termination_requested: Arc<AtomicBool>,
    drainer_size: usize,
    drainer_delay: u64,
    redis: &RedisConnectionPool,
) {
    let mut queue = DrainerQueue::default();
    let mut timer = interval(Duration::from_secs(drainer_delay));

    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            // Consumers have stopped; pick up whatever they managed to send.
            while let Ok((driver_id, update)) = rx.try_recv() {
                queue.push(driver_id, update);
            }
            info!(tag = "[Graceful Shutting Down]", length = %queue.len());
            if !queue.is_empty() {
                info!(tag = "[Force Draining Queue]", length = %queue.len());
                drain_driver_locations(&mut queue, redis).await;
            }
            break;
        }

        tokio::select! {
            item = rx.recv() => {
                match item {
                    Some((driver_id, update)) => {
                        QUEUE_COUNTER.inc();
                        if queue.push(driver_id, update) >= drainer_size {
                            info!(tag = "[Force Draining Queue]", length = %queue.len());
                            drain_driver_locations(&mut queue, redis).await;
                        }
                    },
                    None => {
                        if !queue.is_empty() {
                            drain_driver_locations(&mut queue, redis).await;
                        }
                        break;
                    },
                }
            },
            _ = timer.tick() => {
                if !queue.is_empty() {
                    info!(tag = "[Draining Queue]", length = %queue.len());
                    drain_driver_locations(&mut queue, redis).await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Latitude, Longitude};

    fn driver(id: &str) -> DriverId {
        DriverId(id.to_string())
    }

    fn at(lat: f64, lon: f64) -> PositionUpdate {
        PositionUpdate::Moved(GeoPoint::new(Latitude(lat), Longitude(lon)))
    }

    #[test]
    fn last_write_per_driver_wins() {
        let mut queue = DrainerQueue::default();

        assert_eq!(queue.push(driver("d1"), at(1.0, 1.0)), 1);
        assert_eq!(queue.push(driver("d1"), at(2.0, 2.0)), 1);
        assert_eq!(queue.push(driver("d2"), at(3.0, 3.0)), 2);

        let mut batch = queue.take();
        batch.moved.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(batch.moved.len(), 2);
        assert_eq!(batch.moved[0].0, "d1");
        assert_eq!(batch.moved[0].1.latitude, 2.0);
        assert!(batch.offline.is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn going_offline_cancels_a_pending_move() {
        let mut queue = DrainerQueue::default();
        queue.push(driver("d1"), at(1.0, 1.0));
        queue.push(driver("d1"), PositionUpdate::Offline);

        let batch = queue.take();
        assert!(batch.moved.is_empty());
        assert_eq!(batch.offline, vec!["d1".to_string()]);
    }

    #[test]
    fn moving_after_offline_brings_the_driver_back() {
        let mut queue = DrainerQueue::default();
        queue.push(driver("d1"), PositionUpdate::Offline);
        queue.push(driver("d1"), at(5.0, 6.0));

        let batch = queue.take();
        assert_eq!(batch.moved.len(), 1);
        assert!(batch.offline.is_empty());
    }
}
