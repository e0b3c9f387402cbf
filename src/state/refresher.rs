use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Re-queries the schedule once a minute so statuses and scores in the game
/// picker stay current. Tracking a game has its own timer in the tracker.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests, period: Duration::from_secs(60) }
    }

    pub async fn run(self) {
        let mut schedule_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        schedule_interval.tick().await;

        loop {
            schedule_interval.tick().await;
            if self
                .network_requests
                .send(NetworkRequest::RefreshSchedule)
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
