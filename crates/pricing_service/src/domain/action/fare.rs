/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::domain::types::pricing::{PriceBreakdown, PriceEstimateResponse};
use shared::{geo::distance_between_in_km, types::GeoPoint, types::VehicleType};

pub const AVERAGE_SPEED_KMPH: f64 = 40.0;

/// Driver count at which demand is considered fully met.
pub const DRIVER_SATURATION: f64 = 100.0;

const HIGH_DEMAND: f64 = 0.8;
const MODERATE_DEMAND: f64 = 0.6;
const HIGH_DEMAND_SURGE: f64 = 1.5;
const MODERATE_DEMAND_SURGE: f64 = 1.2;
const PEAK_HOUR_SURGE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareRate {
    pub base_price: f64,
    pub price_per_km: f64,
    pub price_per_minute: f64,
}

pub fn fare_rate(vehicle_type: VehicleType) -> FareRate {
    let (base_price, price_per_km, price_per_minute) = match vehicle_type {
        VehicleType::LightTruck => (20.0, 0.1117, 0.34),
        VehicleType::Van => (20.0, 0.1791, 0.34),
        VehicleType::Truck => (50.0, 0.2924, 0.5),
        VehicleType::HeavyTruck => (100.0, 0.3488, 0.6),
        VehicleType::Trailer => (200.0, 0.7859, 0.8),
    };

    FareRate {
        base_price,
        price_per_km,
        price_per_minute,
    }
}

pub fn duration_in_minutes(distance_km: f64) -> f64 {
    distance_km / AVERAGE_SPEED_KMPH * 60.0
}

/// 1.0 when no driver is around, 0.0 once `DRIVER_SATURATION` drivers are.
pub fn demand(nearby_drivers: usize) -> f64 {
    1.0 - (nearby_drivers as f64 / DRIVER_SATURATION).min(1.0)
}

pub fn demand_factor(demand: f64) -> f64 {
    if demand > HIGH_DEMAND {
        HIGH_DEMAND_SURGE
    } else if demand > MODERATE_DEMAND {
        MODERATE_DEMAND_SURGE
    } else {
        1.0
    }
}

/// Morning 07-09 and evening 17-19, UTC.
pub fn is_peak_hour(hour: u32) -> bool {
    (7..10).contains(&hour) || (17..20).contains(&hour)
}

/// `demand` is `None` when the driver count could not be read; the demand factor is then neutral.
pub fn surge_multiplier(demand: Option<f64>, hour: u32) -> f64 {
    let demand_surge = demand.map(demand_factor).unwrap_or(1.0);
    let time_surge = if is_peak_hour(hour) {
        PEAK_HOUR_SURGE
    } else {
        1.0
    };

    demand_surge * time_surge
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn estimate(
    pickup: &GeoPoint,
    dropoff: &GeoPoint,
    vehicle_type: VehicleType,
    demand: Option<f64>,
    hour: u32,
) -> PriceEstimateResponse {
    let rate = fare_rate(vehicle_type);
    let distance_km = distance_between_in_km(pickup, dropoff);
    let duration_minutes = duration_in_minutes(distance_km);

    let base_price = rate.base_price
        + distance_km * rate.price_per_km
        + duration_minutes * rate.price_per_minute;
    let surge = surge_multiplier(demand, hour);

    PriceEstimateResponse {
        price: round_to_cents(base_price * surge),
        breakdown: PriceBreakdown {
            base_price: round_to_cents(base_price),
            distance_km: round_to_cents(distance_km),
            duration_minutes: round_to_cents(duration_minutes),
            surge,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Latitude, Longitude};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn demand_falls_with_nearby_drivers() {
        assert_eq!(demand(0), 1.0);
        assert!(approx(demand(10), 0.9));
        assert!(approx(demand(50), 0.5));
        assert_eq!(demand(100), 0.0);
        assert_eq!(demand(250), 0.0);
    }

    #[test]
    fn demand_factor_thresholds_are_exclusive() {
        assert_eq!(demand_factor(0.9), 1.5);
        assert_eq!(demand_factor(0.8), 1.2);
        assert_eq!(demand_factor(0.7), 1.2);
        assert_eq!(demand_factor(0.6), 1.0);
        assert_eq!(demand_factor(0.0), 1.0);
    }

    #[test]
    fn peak_hours_cover_morning_and_evening() {
        for hour in [7, 8, 9, 17, 18, 19] {
            assert!(is_peak_hour(hour), "{hour} should be peak");
        }
        for hour in [0, 6, 10, 12, 16, 20, 23] {
            assert!(!is_peak_hour(hour), "{hour} should be off-peak");
        }
    }

    #[test]
    fn surge_combines_demand_and_time() {
        assert!(approx(surge_multiplier(Some(0.95), 8), 1.8));
        assert!(approx(surge_multiplier(Some(0.95), 12), 1.5));
        assert!(approx(surge_multiplier(Some(0.1), 18), 1.2));
        assert_eq!(surge_multiplier(None, 12), 1.0);
        assert!(approx(surge_multiplier(None, 7), 1.2));
    }

    #[test]
    fn same_pickup_and_dropoff_costs_the_base_price() {
        let point = GeoPoint::new(Latitude(18.5204), Longitude(73.8567));

        let quote = estimate(&point, &point, VehicleType::Trailer, Some(0.0), 12);

        assert_eq!(quote.price, 200.0);
        assert_eq!(quote.breakdown.distance_km, 0.0);
        assert_eq!(quote.breakdown.duration_minutes, 0.0);
        assert_eq!(quote.breakdown.surge, 1.0);
    }

    #[test]
    fn price_grows_with_distance_and_surge() {
        let pune = GeoPoint::new(Latitude(18.5204), Longitude(73.8567));
        let mumbai = GeoPoint::new(Latitude(19.0760), Longitude(72.8777));

        let calm = estimate(&pune, &mumbai, VehicleType::Van, Some(0.0), 12);
        let busy = estimate(&pune, &mumbai, VehicleType::Van, Some(0.95), 8);

        let distance = distance_between_in_km(&pune, &mumbai);
        let expected = 20.0 + distance * 0.1791 + duration_in_minutes(distance) * 0.34;

        assert_eq!(calm.price, round_to_cents(expected));
        assert_eq!(
            busy.price,
            round_to_cents(expected * surge_multiplier(Some(0.95), 8))
        );
        assert!(busy.price > calm.price);
    }

    #[test]
    fn heavier_vehicles_cost_more() {
        let from = GeoPoint::new(Latitude(12.9716), Longitude(77.5946));
        let to = GeoPoint::new(Latitude(13.0827), Longitude(80.2707));

        let prices: Vec<f64> = [
            VehicleType::LightTruck,
            VehicleType::Van,
            VehicleType::Truck,
            VehicleType::HeavyTruck,
            VehicleType::Trailer,
        ]
        .into_iter()
        .map(|vehicle_type| estimate(&from, &to, vehicle_type, None, 12).price)
        .collect();

        assert!(prices.windows(2).all(|pair| pair[0] < pair[1]), "{prices:?}");
    }

    #[test]
    fn forty_km_take_an_hour() {
        assert_eq!(duration_in_minutes(40.0), 60.0);
        assert_eq!(duration_in_minutes(10.0), 15.0);
    }
}
