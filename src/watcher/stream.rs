use alloy::primitives::Address;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chain::LogSubscriber;

use super::types::LogRecord;

/// How a single subscription session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Connection dropped; resubscribe after the backoff.
    Dropped,
    /// Shutdown requested or nobody is reading the channel anymore.
    Stopped,
}

/// Keeps one log subscription for the monitored contract alive for the
/// lifetime of the process and forwards every record into a bounded channel.
///
/// The first attempt happens immediately; every later attempt waits a fixed
/// delay. There is no retry limit. When the channel is full the send blocks,
/// so a stalled consumer holds back the subscription instead of growing
/// memory.
pub struct StreamManager {
    subscriber: Arc<dyn LogSubscriber>,
    contract: Address,
    subscribe_timeout: Duration,
    reconnect_delay: Duration,
}

impl StreamManager {
    pub fn new(
        subscriber: Arc<dyn LogSubscriber>,
        contract: Address,
        subscribe_timeout: Duration,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            subscriber,
            contract,
            subscribe_timeout,
            reconnect_delay,
        }
    }

    pub async fn run(self, sender: mpsc::Sender<LogRecord>, shutdown: CancellationToken) {
        let mut attempt: u64 = 0;

        loop {
            if attempt > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.reconnect_delay) => {}
                    _ = shutdown.cancelled() => break,
                }
            }
            attempt += 1;

            match self.session(&sender, &shutdown, attempt).await {
                Ok(SessionEnd::Stopped) => break,
                Ok(SessionEnd::Dropped) => {
                    tracing::warn!(attempt, "Connection lost, resubscribing");
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        delay_ms = self.reconnect_delay.as_millis() as u64,
                        "Subscribe error, retrying"
                    );
                }
            }
        }

        tracing::info!(contract = %self.contract, "Log stream manager stopped");
    }

    async fn session(
        &self,
        sender: &mpsc::Sender<LogRecord>,
        shutdown: &CancellationToken,
        attempt: u64,
    ) -> eyre::Result<SessionEnd> {
        let subscribe = tokio::time::timeout(
            self.subscribe_timeout,
            self.subscriber.subscribe_logs(self.contract),
        );

        let mut stream = tokio::select! {
            res = subscribe => res
                .map_err(|_| eyre::eyre!("subscribe timed out after {:?}", self.subscribe_timeout))??,
            _ = shutdown.cancelled() => return Ok(SessionEnd::Stopped),
        };

        tracing::info!(contract = %self.contract, attempt, "Log subscription active");

        // Tell the consumer the connection is live.
        if sender.send(LogRecord::default()).await.is_err() {
            return Ok(SessionEnd::Stopped);
        }

        loop {
            tokio::select! {
                maybe_log = stream.next() => {
                    match maybe_log {
                        Some(record) => {
                            if sender.send(record).await.is_err() {
                                tracing::info!("Log consumer closed, stopping subscription");
                                return Ok(SessionEnd::Stopped);
                            }
                        }
                        None => return Ok(SessionEnd::Dropped),
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown received, closing log subscription");
                    return Ok(SessionEnd::Stopped);
                }
            }
        }
    }
}
