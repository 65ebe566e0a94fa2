/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::de::DeserializeOwned;
use std::env::var;

/// Location of a service's Dhall config: `$DHALL_CONFIG`, else `./dhall_configs/<service>.dhall`.
pub fn dhall_config_path(service_name: &str) -> String {
    var("DHALL_CONFIG").unwrap_or_else(|_| format!("./dhall_configs/{service_name}.dhall"))
}

pub fn read_dhall_config<T>(config_path: &str) -> Result<T, String>
where
    T: DeserializeOwned,
{
    serde_dhall::from_file(config_path)
        .parse::<T>()
        .map_err(|err| format!("Error reading config: {err}"))
}
