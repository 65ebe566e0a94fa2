/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::types::DriverId;

// Persistent Redis
pub fn driver_locations_key() -> String {
    "driver_locations".to_string()
}

// Persistent Redis
pub fn driver_vehicle_type_key(DriverId(driver_id): &DriverId) -> String {
    format!("{driver_id}-veh")
}

pub fn health_check_key(service_name: &str) -> String {
    format!("health_check:{service_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_key_is_suffixed() {
        assert_eq!(
            driver_vehicle_type_key(&DriverId("17".to_string())),
            "17-veh"
        );
    }
}
