// ── Filtered pagination controller ──
//
// Owns the view state of one event list: active filters, current page,
// rows, loading flags and the inline error. Every load takes a sequence
// number at dispatch and only the newest dispatched load may merge its
// response; older responses are dropped on arrival, success or failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::export::ExportState;
use crate::session::Session;
use crate::sources::ListSource;
use crate::stream::StateStream;

// ── ViewState ────────────────────────────────────────────────────────

/// Everything a presentation layer needs to render a list page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    /// Whole-view spinner (initial load).
    pub loading: bool,
    /// Table-only spinner (filter or page change); rows stay visible.
    pub table_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_count: 0,
            loading: false,
            table_loading: false,
            error: None,
        }
    }
}

/// What became of a requested load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response (or its error) was merged into the view state.
    Applied,
    /// A newer load was dispatched first; this response was dropped.
    Superseded,
    /// The request was invalid and nothing was sent.
    Rejected,
    /// The controller was detached before the response arrived.
    Detached,
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Row offset of `page` (1-based).
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

#[derive(Debug, Clone, Copy)]
enum Spinner {
    View,
    Table,
}

// ── ListController ───────────────────────────────────────────────────

/// Filtered, paginated view over a [`ListSource`].
///
/// Cheaply cloneable; clones drive the same view.
pub struct ListController<S: ListSource> {
    pub(crate) inner: Arc<ListInner<S>>,
}

impl<S: ListSource> Clone for ListController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct ListInner<S: ListSource> {
    source: S,
    session: Session,
    page_size: u32,
    /// Highest sequence number dispatched so far.
    seq: AtomicU64,
    /// Same, for exports.
    pub(crate) export_seq: AtomicU64,
    filters: Mutex<S::Filters>,
    state: watch::Sender<ViewState<S::Item>>,
    options: watch::Sender<S::Options>,
    pub(crate) export: watch::Sender<ExportState>,
    alive: CancellationToken,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S, session: Session, page_size: u32) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        let (options, _) = watch::channel(S::Options::default());
        let (export, _) = watch::channel(ExportState::default());
        Self {
            inner: Arc::new(ListInner {
                source,
                session,
                page_size,
                seq: AtomicU64::new(0),
                export_seq: AtomicU64::new(0),
                filters: Mutex::new(S::Filters::default()),
                state,
                options,
                export,
                alive: CancellationToken::new(),
            }),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn state(&self) -> ViewState<S::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<ViewState<S::Item>> {
        StateStream::new(self.inner.state.subscribe())
    }

    pub fn options(&self) -> S::Options {
        self.inner.options.borrow().clone()
    }

    /// The filters applied to the last dispatched load.
    pub fn filters(&self) -> S::Filters {
        self.inner
            .filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the filter options, then page 1 with empty filters.
    ///
    /// If the options cannot be fetched, page 1 is not requested. A load
    /// dispatched while the options were in flight keeps its filters and
    /// page 1 is skipped.
    pub async fn initialize(&self) -> LoadOutcome {
        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        self.update(|s| s.loading = true);

        let inner = &self.inner;
        let started = inner.seq.load(Ordering::SeqCst);
        let options = inner.session.call(|| inner.source.fetch_options()).await;
        if self.is_detached() {
            return LoadOutcome::Detached;
        }

        let outcome = match options {
            Ok(options) => {
                inner.options.send_replace(options);
                if inner.seq.load(Ordering::SeqCst) == started {
                    self.set_filters(S::Filters::default());
                    self.load(1, Spinner::View).await
                } else {
                    debug!("filters changed during initialize, skipping first page");
                    LoadOutcome::Superseded
                }
            }
            Err(e) => {
                self.fail(&e);
                LoadOutcome::Applied
            }
        };

        if !self.is_detached() {
            self.update(|s| s.loading = false);
        }
        outcome
    }

    /// Replace the active filters and reload page 1.
    pub async fn apply_filters(&self, filters: S::Filters) -> LoadOutcome {
        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        self.set_filters(filters);
        self.load(1, Spinner::Table).await
    }

    /// Load page `page` with the active filters.
    ///
    /// Page 0 and pages past the known last page are ignored.
    pub async fn go_to_page(&self, page: u32) -> LoadOutcome {
        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        let last = self.inner.state.borrow().total_pages.max(1);
        if page == 0 || page > last {
            debug!(page, last, "ignoring out-of-range page request");
            return LoadOutcome::Rejected;
        }
        self.load(page, Spinner::Table).await
    }

    /// Re-request the current page.
    pub async fn reload(&self) -> LoadOutcome {
        let page = self.inner.state.borrow().current_page.max(1);
        self.go_to_page(page).await
    }

    /// Tear down: responses arriving after this are ignored.
    pub fn detach(&self) {
        self.inner.alive.cancel();
    }

    pub fn is_detached(&self) -> bool {
        self.inner.alive.is_cancelled()
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn load(&self, page: u32, spinner: Spinner) -> LoadOutcome {
        let inner = &self.inner;
        let seq = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let filters = self.filters();
        let limit = inner.page_size;
        let offset = page_offset(page, limit);

        self.update(|s| {
            if matches!(spinner, Spinner::Table) {
                s.table_loading = true;
            }
            s.error = None;
        });
        debug!(seq, page, offset, limit, "loading page");

        let result = inner
            .session
            .call(|| inner.source.fetch_page(offset, limit, &filters))
            .await;

        if self.is_detached() {
            return LoadOutcome::Detached;
        }
        if inner.seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "dropping superseded page response");
            // A refresh that failed here still ended the session.
            if matches!(&result, Err(e) if e.is_unauthorized())
                && !inner.session.credentials().is_authenticated()
            {
                inner.session.redirect_to_login();
            }
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(result) => {
                let pages = total_pages(result.total, limit);
                self.update(|s| {
                    s.items = result.data;
                    s.total_count = result.total;
                    s.total_pages = pages;
                    s.current_page = page;
                    s.table_loading = false;
                    s.error = None;
                });
            }
            Err(e) => self.fail(&e),
        }
        LoadOutcome::Applied
    }

    /// Merge a failure: a lost session resets the view and redirects;
    /// anything else becomes the inline error, rows untouched.
    fn fail(&self, err: &CoreError) {
        if err.is_unauthorized() {
            self.inner.state.send_replace(ViewState::default());
            self.inner.session.redirect_to_login();
        } else {
            let message = err.user_message();
            self.update(|s| {
                s.table_loading = false;
                s.error = Some(message);
            });
        }
    }

    fn set_filters(&self, filters: S::Filters) {
        *self
            .inner
            .filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = filters;
    }

    fn update(&self, f: impl FnOnce(&mut ViewState<S::Item>)) {
        self.inner.state.send_modify(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
    }

    #[test]
    fn offsets_are_zero_based() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }
}
