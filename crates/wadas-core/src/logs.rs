// ── Log tail ──
//
// Polls the server's application log at a fixed cadence while the tail
// is alive. Each tick runs as its own task so a slow request never
// delays the next one; ticks are numbered and a tick's result (lines or
// error) is only applied if no newer tick has been applied already.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};
use wadas_api::WadasClient;

use crate::session::Session;
use crate::stream::StateStream;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogState {
    pub lines: Vec<String>,
    pub error: Option<String>,
}

/// Where log lines come from.
pub trait LogSource: Send + Sync + 'static {
    fn fetch_lines(&self) -> impl Future<Output = Result<Vec<String>, wadas_api::Error>> + Send;
}

impl LogSource for WadasClient {
    fn fetch_lines(&self) -> impl Future<Output = Result<Vec<String>, wadas_api::Error>> + Send {
        self.logs()
    }
}

/// Handle to a running log poller. Dropping it stops polling.
pub struct LogTail {
    state: watch::Receiver<LogState>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl LogTail {
    /// Start polling `source` every `period`, beginning immediately.
    pub fn start<L: LogSource>(source: Arc<L>, session: Session, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(LogState::default());

        let poller = Poller {
            source,
            session,
            state: Arc::new(tx),
            cancel: cancel.clone(),
            last_applied: Arc::new(AtomicU64::new(0)),
            redirected: Arc::new(AtomicBool::new(false)),
        };
        tokio::spawn(poller.run(period));

        Self {
            state: rx,
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    pub fn state(&self) -> LogState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<LogState> {
        StateStream::new(self.state.clone())
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Resolves once polling has stopped (explicitly or after the
    /// session was lost).
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }
}

struct Poller<L> {
    source: Arc<L>,
    session: Session,
    state: Arc<watch::Sender<LogState>>,
    cancel: CancellationToken,
    /// Number of the newest tick whose lines were applied.
    last_applied: Arc<AtomicU64>,
    redirected: Arc<AtomicBool>,
}

impl<L> Clone for Poller<L> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            session: self.session.clone(),
            state: Arc::clone(&self.state),
            cancel: self.cancel.clone(),
            last_applied: Arc::clone(&self.last_applied),
            redirected: Arc::clone(&self.redirected),
        }
    }
}

impl<L: LogSource> Poller<L> {
    async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    tick += 1;
                    tokio::spawn(self.clone().poll_once(tick));
                }
            }
        }
        debug!(ticks = tick, "log tail stopped");
    }

    async fn poll_once(self, tick: u64) {
        let source = &self.source;
        let result = self.session.call(|| source.fetch_lines()).await;
        if self.cancel.is_cancelled() {
            return;
        }

        match result {
            Ok(lines) => {
                let last_applied = &self.last_applied;
                // The watch lock serializes the check with the write.
                self.state.send_if_modified(|s| {
                    if last_applied.load(Ordering::SeqCst) >= tick {
                        return false;
                    }
                    last_applied.store(tick, Ordering::SeqCst);
                    s.lines = lines;
                    s.error = None;
                    true
                });
            }
            Err(e) if e.is_unauthorized() => {
                self.cancel.cancel();
                if !self.redirected.swap(true, Ordering::SeqCst) {
                    self.session.redirect_to_login();
                }
            }
            Err(e) => {
                warn!(error = %e, tick, "log poll failed");
                let message = e.user_message();
                let last_applied = &self.last_applied;
                self.state.send_if_modified(|s| {
                    if last_applied.load(Ordering::SeqCst) >= tick {
                        return false;
                    }
                    last_applied.store(tick, Ordering::SeqCst);
                    s.error = Some(message);
                    true
                });
            }
        }
    }
}
