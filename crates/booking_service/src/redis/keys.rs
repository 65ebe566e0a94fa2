/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use shared::types::UserId;

// Persistent Redis
pub fn booking_request_key(request_id: &str) -> String {
    format!("booking:request:{request_id}")
}

// Persistent Redis
pub fn user_booking_request_key(UserId(user_id): &UserId) -> String {
    format!("booking:user:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_keys_are_namespaced() {
        assert_eq!(booking_request_key("r-1"), "booking:request:r-1");
        assert_eq!(
            user_booking_request_key(&UserId("7".to_string())),
            "booking:user:7"
        );
    }
}
