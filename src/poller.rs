use crate::telegram::{Update, UpdateSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{error, info};

/// Background task that long-polls the platform and feeds the worker queue
pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    sender: mpsc::Sender<Update>,
    retry_delay: Duration,
    offset: Option<i64>,
}

impl UpdatePoller {
    /// Create a new poller pushing into `sender`
    pub fn new(source: Arc<dyn UpdateSource>, sender: mpsc::Sender<Update>) -> Self {
        Self {
            source,
            sender,
            retry_delay: Duration::from_secs(5),
            offset: None,
        }
    }

    /// Set the pause after a failed fetch
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Poll until the worker side of the queue goes away
    pub async fn start(mut self) {
        info!("Update poller started");

        while !self.sender.is_closed() {
            let updates = match self.source.fetch_updates(self.offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    error!("Failed to fetch updates: {}", e);
                    time::sleep(self.retry_delay).await;
                    continue;
                }
            };

            for update in updates {
                let next = update.update_id + 1;
                if self.offset.map_or(true, |current| next > current) {
                    self.offset = Some(next);
                }

                // Waits while the queue is full
                if self.sender.send(update).await.is_err() {
                    break;
                }
            }
        }

        info!("Update queue closed, poller stopping");
    }
}
