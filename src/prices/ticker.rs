//! Periodic price refresh.
//!
//! # Responsibilities
//! - Refresh the snapshot on a fixed interval, starting immediately
//! - Keep the last good prices (marked stale) when a refresh fails
//! - Stop when the subscription is dropped or shutdown is signalled

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::DashboardResult;
use crate::prices::feed::PriceFeed;
use crate::prices::types::PriceSnapshot;

/// Anything that can produce a fresh snapshot.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    fn asset_ids(&self) -> Vec<String>;

    async fn fetch(&self) -> DashboardResult<PriceSnapshot>;
}

#[async_trait]
impl PriceSource for PriceFeed {
    fn asset_ids(&self) -> Vec<String> {
        PriceFeed::asset_ids(self).to_vec()
    }

    async fn fetch(&self) -> DashboardResult<PriceSnapshot> {
        PriceFeed::fetch(self).await
    }
}

/// Periodic refresher for one price view.
pub struct PriceTicker {
    source: Arc<dyn PriceSource>,
    interval: Duration,
}

impl PriceTicker {
    pub fn new(source: Arc<dyn PriceSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Start refreshing in the background.
    ///
    /// The returned subscription owns the task; dropping it cancels the
    /// refresh loop.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> TickerSubscription {
        let (tx, rx) = watch::channel(PriceSnapshot::placeholder(&self.source.asset_ids()));

        let handle = tokio::spawn(async move {
            tracing::debug!(interval_secs = self.interval.as_secs(), "Price ticker starting");
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        refresh(self.source.as_ref(), &tx).await;
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Price ticker received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        });

        TickerSubscription { rx, handle }
    }
}

async fn refresh(source: &dyn PriceSource, tx: &watch::Sender<PriceSnapshot>) {
    match source.fetch().await {
        Ok(snapshot) => {
            tx.send_replace(snapshot);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Price refresh failed, keeping previous prices");
            tx.send_modify(|snapshot| snapshot.stale = true);
        }
    }
}

/// Handle to a running ticker.
pub struct TickerSubscription {
    rx: watch::Receiver<PriceSnapshot>,
    handle: JoinHandle<()>,
}

impl TickerSubscription {
    /// Latest snapshot without waiting.
    pub fn latest(&self) -> PriceSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next refresh. `None` once the ticker has stopped.
    pub async fn next(&mut self) -> Option<PriceSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stop the refresh loop.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for TickerSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
