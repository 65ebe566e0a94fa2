/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Needs a local Redis on 6379: `cargo test -p tests -- --ignored`.

use driver_location_service::drainer::{run_drainer, PositionUpdate};
use shared::{
    redis::types::{RedisConfig, RedisConnectionPool},
    types::{DriverId, GeoPoint, Latitude, Longitude},
};
use std::sync::{atomic::AtomicBool, Arc};
use tokio::sync::mpsc;

const KEY: &str = "tests:driver_locations";

fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(Latitude(lat), Longitude(lon))
}

async fn pool() -> anyhow::Result<RedisConnectionPool> {
    Ok(RedisConnectionPool::new(RedisConfig::default()).await?)
}

#[tokio::test]
#[ignore]
async fn geo_search_orders_by_distance() -> anyhow::Result<()> {
    let pool = pool().await?;
    pool.delete_key(KEY).await?;

    pool.geo_add_batch(
        KEY,
        vec![
            ("far".to_string(), point(13.10, 77.60)),
            ("near".to_string(), point(12.98, 77.60)),
        ],
    )
    .await?;

    let members = pool
        .geo_search_members(KEY, &point(12.97, 77.60), 50.0)
        .await?;
    assert_eq!(members, vec!["near".to_string(), "far".to_string()]);

    pool.zrem(KEY, "far").await?;
    assert_eq!(pool.zcard(KEY).await?, 1);
    assert!(pool.geo_pos(KEY, "far").await?.is_none());

    pool.delete_key(KEY).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn pending_keys_are_consumed_once() -> anyhow::Result<()> {
    let pool = pool().await?;

    pool.set_with_expiry("tests:pending", "payload".to_string(), 60)
        .await?;
    assert_eq!(
        pool.get_and_delete_key("tests:pending").await?,
        Some("payload".to_string())
    );
    assert_eq!(pool.get_and_delete_key("tests:pending").await?, None);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn drainer_flushes_on_shutdown() -> anyhow::Result<()> {
    let pool = Arc::new(pool().await?);
    pool.delete_key("driver_locations").await?;

    let (sender, receiver) = mpsc::channel(16);
    let flag = Arc::new(AtomicBool::new(false));

    let drainer_pool = pool.clone();
    let drainer_flag = flag.clone();
    let drainer = tokio::spawn(async move {
        run_drainer(receiver, drainer_flag, 100, 60, &drainer_pool).await;
    });

    sender
        .send((
            DriverId("tests-1".to_string()),
            PositionUpdate::Moved(point(12.97, 77.59)),
        ))
        .await?;
    sender
        .send((
            DriverId("tests-2".to_string()),
            PositionUpdate::Moved(point(12.98, 77.60)),
        ))
        .await?;
    sender
        .send((DriverId("tests-2".to_string()), PositionUpdate::Offline))
        .await?;
    drop(sender);

    drainer.await?;

    assert!(pool.geo_pos("driver_locations", "tests-1").await?.is_some());
    assert!(pool.geo_pos("driver_locations", "tests-2").await?.is_none());

    pool.delete_key("driver_locations").await?;
    Ok(())
}
