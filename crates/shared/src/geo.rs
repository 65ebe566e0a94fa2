/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::types::GeoPoint;

pub const EARTH_RADIUS_IN_KM: f64 = 6371.0;

/// Great-circle distance between two points on the earth, in kilometres.
pub fn distance_between_in_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let rlat1 = from.latitude.to_radians();
    let rlat2 = to.latitude.to_radians();

    let sq = |x: f64| x * x;

    // Clamped so that rounding never pushes h outside [0, 1] for antipodal points.
    let h = (sq((dlat / 2.0).sin()) + rlat1.cos() * rlat2.cos() * sq((dlon / 2.0).sin()))
        .clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_IN_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
