/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod analytics;
pub mod vehicle;

use shared::{
    db::{with_retry, with_timeout},
    tools::error::AppError,
};
use std::{future::Future, time::Duration};

use crate::environment::AppState;

/// Runs a read or write against Postgres with the configured retry budget, each attempt bounded
/// by the query timeout.
pub async fn run_query<T, F, Fut>(data: &AppState, mut query: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let timeout = Duration::from_secs(data.query_timeout_secs);

    with_retry(
        data.query_retry_attempts,
        Duration::from_millis(data.query_retry_delay_ms),
        || with_timeout(timeout, query()),
    )
    .await
}
