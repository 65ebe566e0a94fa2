/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Prints the stored form of a password, for provisioning rows of the `admin` table:
//!
//! ```text
//! cargo run -p auth_service --bin hash_password -- '<password>'
//! psql "$DATABASE_URL" -c "INSERT INTO admin (name, email, password) VALUES ('Ops', 'ops@example.com', '<hash>')"
//! ```

use shared::auth::hash_password;

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("Usage: hash_password <password>");
        std::process::exit(2);
    };

    match hash_password(&password) {
        Ok(hash) => println!("{hash}"),
        Err(err) => {
            eprintln!("{}", err.message());
            std::process::exit(1);
        }
    }
}
