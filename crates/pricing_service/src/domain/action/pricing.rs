/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use chrono::{Timelike, Utc};
use shared::{
    redis::keys::driver_locations_key, tools::error::AppError, types::BookingRequest,
    utils::logger::*,
};

use super::fare;
use crate::{domain::types::pricing::PriceEstimateResponse, environment::AppState};

pub async fn estimate_price(
    data: Data<AppState>,
    request: BookingRequest,
) -> Result<PriceEstimateResponse, AppError> {
    let demand = match data
        .redis
        .geo_search_members(
            &driver_locations_key(),
            &request.pickup,
            data.nearby_driver_radius_km,
        )
        .await
    {
        Ok(drivers) => Some(fare::demand(drivers.len())),
        Err(err) => {
            warn!(tag = "[Pricing]", "Demand unavailable, skipping demand surge : {}", err.message());
            None
        }
    };

    let quote = fare::estimate(
        &request.pickup,
        &request.dropoff,
        request.vehicle_type,
        demand,
        Utc::now().hour(),
    );

    info!(
        tag = "[Pricing]",
        vehicle_type = %request.vehicle_type,
        price = quote.price,
        surge = quote.breakdown.surge,
        "Estimated fare"
    );

    Ok(quote)
}
