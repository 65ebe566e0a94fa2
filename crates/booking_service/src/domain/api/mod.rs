/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod booking;
pub mod healthcheck;

use actix_web::web::ServiceConfig;

pub fn handler(config: &mut ServiceConfig) {
    config
        .service(booking::create_booking)
        .service(booking::accept_booking)
        .service(booking::update_booking)
        .service(booking::get_user_booking)
        .service(booking::get_user_booking_history)
        .service(booking::get_driver_booking)
        .service(booking::get_driver_booking_history)
        .service(healthcheck::ping)
        .service(healthcheck::health_check);
}
