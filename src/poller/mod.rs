//! Background status poller
//!
//! One long-lived task on a fixed 1 s cadence. Each tick calls the
//! long-poll status endpoint and publishes the result wholesale into the
//! store. The server-side long-poll absorbs quiescent periods, so the
//! effective request rate stays ~1/s no matter how often playback changes.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::WebClient;
use crate::store::SharedStore;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Run the polling loop until `cancel` fires.
///
/// A failed poll is logged and the previous snapshot stays in place; the
/// loop never gives up on its own. A dead session is only recovered by
/// restarting the process, which re-runs the handshake.
pub async fn run(client: WebClient, store: SharedStore, cancel: CancellationToken) {
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("status poller stopped");
                return;
            }
            _ = ticker.tick() => {
                match client.status().await {
                    Ok(snapshot) => store.replace(snapshot).await,
                    Err(e) => warn!("status poll failed: {e}"),
                }
            }
        }
    }
}
