/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u8>,
}

/// One entry of a Nominatim `/search?format=json` answer. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<NominatimPlace> for Place {
    type Error = String;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| format!("Invalid latitude : {}", place.lat))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| format!("Invalid longitude : {}", place.lon))?;

        Ok(Place {
            display_name: place.display_name,
            latitude,
            longitude,
        })
    }
}
