use crate::ports::{DomainScanner, ResultSink, ScanProgress};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nsgeo_domain::{DomainError, ScanResult};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const RESULT_CHANNEL_CAPACITY: usize = 256;

/// Admission limits of a run. A zero disables the corresponding limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_concurrency: usize,
    pub max_scans_per_second: u32,
}

impl ScanLimits {
    pub fn new(max_concurrency: usize, max_scans_per_second: u32) -> Self {
        Self {
            max_concurrency,
            max_scans_per_second,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0, 0)
    }

    fn permits(&self) -> usize {
        match self.max_concurrency {
            0 => Semaphore::MAX_PERMITS,
            n => n.min(Semaphore::MAX_PERMITS),
        }
    }

    /// Token bucket refilled at `max_scans_per_second`, with a burst of the
    /// same size.
    fn rate_limiter(&self) -> Option<DefaultDirectRateLimiter> {
        NonZeroU32::new(self.max_scans_per_second)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Domains that passed admission and were handed to a scan task.
    pub admitted: usize,
    /// Results written to the sink.
    pub written: usize,
}

/// Drives a whole batch: admission, one task per domain, and a single
/// consumer streaming results to the sink as they complete.
pub struct RunScanUseCase {
    scanner: Arc<dyn DomainScanner>,
    progress: Arc<dyn ScanProgress>,
    limits: ScanLimits,
}

impl RunScanUseCase {
    pub fn new(
        scanner: Arc<dyn DomainScanner>,
        progress: Arc<dyn ScanProgress>,
        limits: ScanLimits,
    ) -> Self {
        Self {
            scanner,
            progress,
            limits,
        }
    }

    pub async fn execute(
        &self,
        domains: Vec<String>,
        sink: &mut dyn ResultSink,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, DomainError> {
        info!(
            domains = domains.len(),
            max_concurrency = self.limits.max_concurrency,
            max_scans_per_second = self.limits.max_scans_per_second,
            "Starting scan run"
        );

        // Stops the dispatcher and every scan task on any early return.
        let run_token = cancel.child_token();
        let _stop_on_exit = run_token.clone().drop_guard();

        let (tx, mut rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let dispatcher = tokio::spawn(dispatch(
            domains,
            Arc::clone(&self.scanner),
            Arc::new(Semaphore::new(self.limits.permits())),
            self.limits.rate_limiter(),
            tx,
            run_token.clone(),
        ));

        let mut written = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(written, "Scan run cancelled");
                    if let Err(e) = sink.flush() {
                        warn!(error = %e, "Failed to flush output after cancellation");
                    }
                    return Err(DomainError::Cancelled);
                }
                next = rx.recv() => match next {
                    Some(result) => {
                        sink.write(&result)?;
                        written += 1;
                        self.progress.on_result(&result);
                    }
                    None => break,
                },
            }
        }

        sink.flush()?;
        self.progress.finish();

        let admitted = dispatcher
            .await
            .map_err(|e| DomainError::IoError(format!("dispatcher task failed: {}", e)))?;

        info!(admitted, written, "Scan run complete");
        Ok(RunSummary { admitted, written })
    }
}

/// Admits domains one at a time: a concurrency permit first, then a rate
/// token. Returns the number of domains admitted.
async fn dispatch(
    domains: Vec<String>,
    scanner: Arc<dyn DomainScanner>,
    semaphore: Arc<Semaphore>,
    limiter: Option<DefaultDirectRateLimiter>,
    tx: mpsc::Sender<ScanResult>,
    cancel: CancellationToken,
) -> usize {
    let mut admitted = 0usize;

    for fqdn in domains {
        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        if let Some(limiter) = &limiter {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = limiter.until_ready() => {}
            }
        }

        admitted += 1;
        let scanner = Arc::clone(&scanner);
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = scanner.scan(&fqdn) => result,
            };
            tokio::select! {
                _ = cancel.cancelled() => {}
                sent = tx.send(result) => {
                    if sent.is_err() {
                        debug!(fqdn = %fqdn, "Result dropped, consumer gone");
                    }
                }
            }
        });
    }

    debug!(admitted, "Dispatcher finished");
    admitted
}
