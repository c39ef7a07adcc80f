#![allow(clippy::unwrap_used)]
// Log tail cadence, ordering and teardown, on paused tokio time.

mod common;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::sleep;
use wadas_core::{LogSource, LogTail, Redirect};

use common::{StubBackend, session};

/// Numbers its fetches; the first one can be made slow.
#[derive(Default)]
struct CountingLogs {
    fetches: AtomicU64,
    slow_first: bool,
    fail_first: bool,
    expired: bool,
}

impl CountingLogs {
    fn count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl LogSource for CountingLogs {
    fn fetch_lines(&self) -> impl Future<Output = Result<Vec<String>, wadas_api::Error>> + Send {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let slow = self.slow_first && n == 1;
        let fail = self.fail_first && n == 1;
        let expired = self.expired;
        async move {
            if expired {
                return Err(wadas_api::Error::TokenExpired);
            }
            if slow {
                sleep(Duration::from_millis(1500)).await;
            }
            if fail {
                return Err(wadas_api::Error::Api {
                    status: 500,
                    message: "stale".into(),
                });
            }
            Ok(vec![format!("line {n}")])
        }
    }
}

#[tokio::test(start_paused = true)]
async fn polls_every_period_starting_immediately() {
    let logs = Arc::new(CountingLogs::default());
    let tail = LogTail::start(
        logs.clone(),
        session(StubBackend::new(true)).await,
        Duration::from_secs(1),
    );

    sleep(Duration::from_millis(2500)).await;

    assert_eq!(logs.count(), 3);
    assert_eq!(tail.state().lines, vec!["line 3".to_owned()]);
    assert!(tail.is_running());
}

#[tokio::test(start_paused = true)]
async fn slow_older_tick_never_overwrites_newer_output() {
    let logs = Arc::new(CountingLogs {
        slow_first: true,
        ..CountingLogs::default()
    });
    let tail = LogTail::start(
        logs.clone(),
        session(StubBackend::new(true)).await,
        Duration::from_secs(1),
    );

    // tick 2 lands at 1.0s, tick 1 only at 1.5s
    sleep(Duration::from_millis(1700)).await;

    assert_eq!(tail.state().lines, vec!["line 2".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn slow_older_failure_never_overwrites_newer_output() {
    let logs = Arc::new(CountingLogs {
        slow_first: true,
        fail_first: true,
        ..CountingLogs::default()
    });
    let tail = LogTail::start(
        logs.clone(),
        session(StubBackend::new(true)).await,
        Duration::from_secs(1),
    );

    sleep(Duration::from_millis(1700)).await;

    let state = tail.state();
    assert_eq!(state.lines, vec!["line 2".to_owned()]);
    assert!(state.error.is_none(), "{:?}", state.error);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_tail_stops_polling() {
    let logs = Arc::new(CountingLogs::default());
    let tail = LogTail::start(
        logs.clone(),
        session(StubBackend::new(true)).await,
        Duration::from_secs(1),
    );
    sleep(Duration::from_millis(1500)).await;

    drop(tail);
    tokio::task::yield_now().await;
    let stopped_at = logs.count();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(logs.count(), stopped_at);
}

#[tokio::test(start_paused = true)]
async fn lost_session_stops_tail_and_redirects_once() {
    let logs = Arc::new(CountingLogs {
        expired: true,
        ..CountingLogs::default()
    });
    let session = session(StubBackend::new(false)).await;
    let mut redirects = session.subscribe_redirects();
    let tail = LogTail::start(logs.clone(), session, Duration::from_secs(1));

    tail.stopped().await;
    sleep(Duration::from_secs(3)).await;

    assert!(!tail.is_running());
    assert!(tail.state().error.is_none());
    assert_eq!(redirects.try_recv().unwrap(), Redirect::Login);
    assert!(matches!(redirects.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(logs.count(), 1);
}
