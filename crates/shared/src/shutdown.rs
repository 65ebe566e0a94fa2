/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::utils::logger::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::signal::unix::{signal, SignalKind};

/// Spawns SIGTERM and SIGINT listeners that flip the returned flag.
///
/// Must be called from within a tokio runtime.
pub fn graceful_termination_flag() -> Arc<AtomicBool> {
    let graceful_termination_requested = Arc::new(AtomicBool::new(false));

    for (name, kind) in [
        ("SIGTERM", SignalKind::terminate()),
        ("SIGINT", SignalKind::interrupt()),
    ] {
        let graceful_termination_requested = graceful_termination_requested.to_owned();
        tokio::spawn(async move {
            match signal(kind) {
                Ok(mut listener) => {
                    listener.recv().await;
                    info!(tag = "[Graceful Shutting Down]", signal = name);
                    graceful_termination_requested.store(true, Ordering::Relaxed);
                }
                Err(err) => error!(tag = "[Signal Listener]", signal = name, "{err}"),
            }
        });
    }

    graceful_termination_requested
}
