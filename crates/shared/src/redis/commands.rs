/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::redis::{keys::health_check_key, types::RedisConnectionPool};
use crate::tools::error::AppError;
use crate::types::{GeoPoint, Latitude, Longitude};
use crate::utils::logger::instrument;
use fred::{
    interfaces::{ClientLike, GeoInterface, KeysInterface, SortedSetsInterface},
    types::{Expiration, GeoPosition, GeoUnit, GeoValue, RedisValue, SortOrder},
};
use std::fmt::Debug;

impl RedisConnectionPool {
    // set key with expiry
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_with_expiry<V>(&self, key: &str, value: V, expiry: u32) -> Result<(), AppError>
    where
        V: TryInto<RedisValue> + Debug + Send + Sync,
        V::Error: Into<fred::error::RedisError> + Send + Sync,
    {
        self.pool
            .set::<(), _, _>(key, value, Some(Expiration::EX(expiry.into())), None, false)
            .await
            .map_err(|err| AppError::SetFailed(err.to_string()))
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_key(&self, key: &str) -> Result<Option<String>, AppError> {
        self.pool
            .get::<Option<String>, _>(key)
            .await
            .map_err(|err| AppError::GetFailed(err.to_string()))
    }

    /// Reads and removes a key in one round trip, so only one caller ever observes the value.
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_and_delete_key(&self, key: &str) -> Result<Option<String>, AppError> {
        self.pool
            .getdel::<Option<String>, _>(key)
            .await
            .map_err(|err| AppError::GetFailed(err.to_string()))
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub async fn delete_key(&self, key: &str) -> Result<(), AppError> {
        self.pool
            .del::<i64, _>(key)
            .await
            .map(|_| ())
            .map_err(|err| AppError::DeleteFailed(err.to_string()))
    }

    /// Adds or moves many members in a single GEOADD.
    #[instrument(level = "DEBUG", skip(self, members), fields(members = members.len()))]
    pub async fn geo_add_batch(
        &self,
        key: &str,
        members: Vec<(String, GeoPoint)>,
    ) -> Result<(), AppError> {
        if members.is_empty() {
            return Ok(());
        }

        let values: Vec<GeoValue> = members
            .into_iter()
            .map(|(member, point)| GeoValue {
                coordinates: GeoPosition {
                    longitude: point.longitude,
                    latitude: point.latitude,
                },
                member: member.into(),
            })
            .collect();

        self.pool
            .geoadd::<RedisValue, _, _>(key, None, false, values)
            .await
            .map(|_| ())
            .map_err(|err| AppError::GeoAddFailed(err.to_string()))
    }

    //GEOSEARCH FROMLONLAT BYRADIUS ASC
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn geo_search_members(
        &self,
        key: &str,
        center: &GeoPoint,
        radius_in_km: f64,
    ) -> Result<Vec<String>, AppError> {
        self.pool
            .geosearch::<Vec<String>, _>(
                key,
                None,
                Some(GeoPosition {
                    longitude: center.longitude,
                    latitude: center.latitude,
                }),
                Some((radius_in_km, GeoUnit::Kilometers)),
                None,
                Some(SortOrder::Asc),
                None,
                false,
                false,
                false,
            )
            .await
            .map_err(|err| AppError::GeoSearchFailed(err.to_string()))
    }

    //GEOPOS
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn geo_pos(&self, key: &str, member: &str) -> Result<Option<GeoPoint>, AppError> {
        let output = self
            .pool
            .geopos::<RedisValue, _, _>(key, member)
            .await
            .map_err(|err| AppError::GeoPosFailed(err.to_string()))?;

        let position = match output {
            RedisValue::Array(points) if points.len() == 2 && points.iter().all(|p| !p.is_array()) => {
                match (points[0].as_f64(), points[1].as_f64()) {
                    (Some(longitude), Some(latitude)) => Some(GeoPosition { longitude, latitude }),
                    _ => None,
                }
            }
            RedisValue::Array(points) => match points.first() {
                Some(point) => point
                    .as_geo_position()
                    .map_err(|err| AppError::GeoPosFailed(err.to_string()))?,
                None => None,
            },
            _ => None,
        };

        Ok(position.map(|pos| GeoPoint::new(Latitude(pos.latitude), Longitude(pos.longitude))))
    }

    //ZREM
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn zrem(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.pool
            .zrem::<i64, _, _>(key, member)
            .await
            .map(|_| ())
            .map_err(|err| AppError::ZRemFailed(err.to_string()))
    }

    //ZCARD
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn zcard(&self, key: &str) -> Result<u64, AppError> {
        self.pool
            .zcard::<u64, _>(key)
            .await
            .map_err(|err| AppError::ZCardFailed(err.to_string()))
    }

    //PING
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn ping(&self) -> Result<String, AppError> {
        self.pool
            .next()
            .ping::<String>()
            .await
            .map_err(|err| AppError::RedisConnectionError(err.to_string()))
    }

    /// Round-trips a marker key, failing when Redis cannot serve a write followed by a read.
    pub async fn check_health(&self, service_name: &str) -> Result<(), AppError> {
        let key = health_check_key(service_name);
        self.set_with_expiry(&key, service_name, 60).await?;

        match self.get_key(&key).await? {
            Some(_) => Ok(()),
            None => Err(AppError::InternalError(
                "Health check failed as cannot get key from redis".to_string(),
            )),
        }
    }
}
