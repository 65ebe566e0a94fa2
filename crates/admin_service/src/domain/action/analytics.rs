/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use shared::{
    auth::AuthenticatedUser,
    redis::keys::driver_locations_key,
    tools::error::AppError,
    types::Role,
    utils::logger::*,
};
use std::collections::BTreeMap;

use super::run_query;
use crate::{domain::types::fleet::*, environment::AppState};

pub const FLEET_STATS_CACHE_KEY: &str = "fleet_stats";

pub async fn fleet_stats(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<FleetStats, AppError> {
    caller.require_role(Role::Admin)?;

    if let Some(stats) = data.fleet_stats_cache.get(FLEET_STATS_CACHE_KEY).await {
        return Ok(stats);
    }

    let db = &data.db;
    let stats = run_query(&data, || async move {
        let mut tx = db.begin().await?;

        let total_vehicles = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vehicle_drivers")
            .fetch_one(&mut *tx)
            .await?;

        let active_vehicles = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT driver_id) FROM booking WHERE status NOT IN ('completed', 'cancelled')",
        )
        .fetch_one(&mut *tx)
        .await?;

        let vehicle_type_breakdown: BTreeMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            "SELECT vehicle_type, COUNT(*) FROM vehicle_drivers GROUP BY vehicle_type",
        )
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        tx.commit().await?;

        Ok::<_, AppError>(FleetStats {
            total_vehicles,
            active_vehicles,
            vehicle_type_breakdown,
        })
    })
    .await?;

    data.fleet_stats_cache
        .set(FLEET_STATS_CACHE_KEY, stats.to_owned())
        .await;

    Ok(stats)
}

pub async fn driver_performance(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Vec<DriverPerformance>, AppError> {
    caller.require_role(Role::Admin)?;

    let db = &data.db;
    let rows = run_query(&data, || async move {
        sqlx::query_as::<_, DriverPerformanceRow>(
            "SELECT vd.id AS driver_id, vd.name, COUNT(b.id) AS trip_count, \
             AVG(EXTRACT(EPOCH FROM (b.completed_at - b.created_at)))::FLOAT8 AS avg_trip_secs, \
             SUM(b.price)::FLOAT8 AS total_revenue \
             FROM vehicle_drivers vd \
             JOIN booking b ON vd.id = b.driver_id AND b.status = 'completed' \
             WHERE b.completed_at IS NOT NULL \
             GROUP BY vd.id, vd.name \
             ORDER BY trip_count DESC",
        )
        .fetch_all(db)
        .await
        .map_err(AppError::from)
    })
    .await?;

    Ok(rows.into_iter().map(DriverPerformance::from).collect())
}

pub async fn booking_analytics(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<BookingAnalytics, AppError> {
    caller.require_role(Role::Admin)?;

    let db = &data.db;
    let row = run_query(&data, || async move {
        sqlx::query_as::<_, BookingAnalyticsRow>(
            "SELECT COUNT(*) AS total_bookings, \
             COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings, \
             COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_bookings, \
             (AVG(EXTRACT(EPOCH FROM (completed_at - created_at))) \
                FILTER (WHERE status = 'completed' AND completed_at IS NOT NULL))::FLOAT8 AS avg_trip_secs, \
             (SUM(price) FILTER (WHERE status = 'completed'))::FLOAT8 AS total_revenue \
             FROM booking",
        )
        .fetch_one(db)
        .await
        .map_err(AppError::from)
    })
    .await?;

    Ok(BookingAnalytics::from(row))
}

pub async fn vehicle_locations(
    data: Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<Vec<VehicleLocation>, AppError> {
    caller.require_role(Role::Admin)?;

    let db = &data.db;
    let rows = run_query(&data, || async move {
        sqlx::query_as::<_, VehicleLocationRow>(
            "SELECT vd.id, vd.name, vd.vehicle_type, b.pickup_latitude, b.pickup_longitude, b.status \
             FROM vehicle_drivers vd \
             LEFT JOIN booking b ON vd.id = b.driver_id AND b.status = ANY($1) \
             ORDER BY vd.id",
        )
        .bind(on_trip_statuses().to_vec())
        .fetch_all(db)
        .await
        .map_err(AppError::from)
    })
    .await?;

    let mut locations = Vec::with_capacity(rows.len());
    for row in rows {
        let live = match data
            .redis
            .geo_pos(&driver_locations_key(), &row.id.to_string())
            .await
        {
            Ok(position) => position.map(|point| (point.latitude, point.longitude)),
            Err(err) => {
                warn!(tag = "[Vehicle Locations]", driver_id = row.id, "{}", err.message());
                None
            }
        };
        locations.push(row.into_location(live));
    }

    Ok(locations)
}
