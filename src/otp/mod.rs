mod ledger;

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::debug;

pub use ledger::{Clock, OtpError, OtpLedger, SystemClock, CODE_LENGTH};

/// Periodically drop codes that expired without ever being checked.
pub fn spawn_sweeper(ledger: Arc<OtpLedger>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let removed = ledger.purge_expired();
            if removed > 0 {
                debug!(removed, "purged expired otps");
            }
        }
    })
}
