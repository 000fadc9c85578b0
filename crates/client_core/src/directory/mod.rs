//! Public-profile directory: debounced search, pagination, and fetch
//! ordering for one mounted directory screen.

use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
    time::Duration,
};

use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::ProfileDirectory;

pub mod debounce;
pub mod fetch;
pub mod pagination;
pub mod query;
pub mod view;

pub use debounce::{SearchDebouncer, SEARCH_DEBOUNCE_DELAY};
pub use fetch::{FetchCoordinator, FetchKind, FetchState, FetchTicket, PageResult, Settle};
pub use pagination::{compute_window, render_window, PageSlot, DEFAULT_WINDOW_DELTA};
pub use query::{Query, QueryState, DEFAULT_PAGE_SIZE};
pub use view::{about_excerpt, display_name, DirectoryView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectorySettings {
    pub page_size: u32,
    pub debounce: Duration,
    pub window_delta: u32,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: SEARCH_DEBOUNCE_DELAY,
            window_delta: DEFAULT_WINDOW_DELTA,
        }
    }
}

struct DirectoryState {
    query: QueryState,
    fetch: FetchCoordinator,
}

pub struct DirectoryController {
    api: Arc<dyn ProfileDirectory>,
    settings: DirectorySettings,
    inner: Mutex<DirectoryState>,
    debouncer: SearchDebouncer,
    view: watch::Sender<DirectoryView>,
    listener: StdMutex<Option<JoinHandle<()>>>,
}

impl DirectoryController {
    /// Must be called inside a tokio runtime: the debounced-term listener is
    /// spawned here.
    pub fn new(api: Arc<dyn ProfileDirectory>, settings: DirectorySettings) -> Arc<Self> {
        let (debouncer, debounced) = SearchDebouncer::new(settings.debounce);
        let state = DirectoryState {
            query: QueryState::new(settings.page_size),
            fetch: FetchCoordinator::new(),
        };
        let (view, _) = watch::channel(build_view(&state, settings.window_delta));

        let controller = Arc::new(Self {
            api,
            settings,
            inner: Mutex::new(state),
            debouncer,
            view,
            listener: StdMutex::new(None),
        });

        let listener = Self::spawn_debounce_listener(Arc::downgrade(&controller), debounced);
        *controller
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);
        controller
    }

    fn spawn_debounce_listener(
        controller: Weak<Self>,
        mut debounced: mpsc::UnboundedReceiver<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(term) = debounced.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                // The ticket is taken here, in emission order; only the network
                // wait runs detached so a slow search never blocks the next one.
                if let Some(ticket) = controller.begin_for_debounced_term(&term).await {
                    tokio::spawn(async move {
                        controller.run_fetch(ticket).await;
                    });
                }
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> DirectoryView {
        self.view.borrow().clone()
    }

    pub async fn fetch_state(&self) -> FetchState {
        self.inner.lock().await.fetch.state().clone()
    }

    /// Initial load when the screen appears.
    pub async fn mount(self: &Arc<Self>) -> Settle {
        let ticket = {
            let mut state = self.inner.lock().await;
            let query = state.query.snapshot();
            let ticket = state.fetch.begin(query);
            self.publish(&state);
            ticket
        };
        self.complete(ticket).await
    }

    /// Text field edits. The fetch follows once the input settles.
    pub async fn on_search_term_change(&self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut state = self.inner.lock().await;
            state.query.set_search_term(text.clone());
            self.publish(&state);
        }
        self.debouncer.push(text);
    }

    /// Applies a debounced term directly; `None` when the term did not change.
    pub async fn on_debounced_term_changed(self: &Arc<Self>, term: &str) -> Option<Settle> {
        let ticket = self.begin_for_debounced_term(term).await?;
        Some(self.complete(ticket).await)
    }

    async fn begin_for_debounced_term(&self, term: &str) -> Option<FetchTicket> {
        let mut state = self.inner.lock().await;
        if !state.query.on_debounced_term_changed(term) {
            return None;
        }
        let query = state.query.snapshot();
        let ticket = state.fetch.begin(query);
        self.publish(&state);
        Some(ticket)
    }

    /// Returns `false` without fetching when the page is out of range or a
    /// fetch is still running.
    pub async fn on_page_change(self: &Arc<Self>, page: u32) -> bool {
        let ticket = {
            let mut state = self.inner.lock().await;
            let total_pages = state.fetch.page().pagination.total_pages;
            let in_flight = state.fetch.is_in_flight();
            if !state.query.set_page(page, total_pages, in_flight) {
                debug!(page, total_pages, in_flight, "ignoring page change");
                return false;
            }
            let query = state.query.snapshot();
            let ticket = state.fetch.begin(query);
            self.publish(&state);
            ticket
        };
        self.complete(ticket).await;
        true
    }

    /// Re-runs the last attempted query; `None` before anything was loaded.
    pub async fn on_retry(self: &Arc<Self>) -> Option<Settle> {
        let ticket = {
            let mut state = self.inner.lock().await;
            let ticket = state.fetch.retry()?;
            self.publish(&state);
            ticket
        };
        Some(self.complete(ticket).await)
    }

    /// Fetches an explicit query, bypassing debounce and the page guard.
    pub async fn load(self: &Arc<Self>, query: Query) -> Settle {
        let ticket = {
            let mut state = self.inner.lock().await;
            state.query.adopt(&query);
            let query = state.query.snapshot();
            let ticket = state.fetch.begin(query);
            self.publish(&state);
            ticket
        };
        self.complete(ticket).await
    }

    /// Runs detached: a dropped caller must not leave the fetch in flight.
    async fn complete(self: &Arc<Self>, ticket: FetchTicket) -> Settle {
        let controller = Arc::clone(self);
        match tokio::spawn(async move { controller.run_fetch(ticket).await }).await {
            Ok(settle) => settle,
            Err(err) => {
                warn!("directory fetch task did not finish: {err}");
                Settle::Stale
            }
        }
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Settle {
        let query = ticket.query();
        debug!(
            request = ticket.id(),
            kind = ticket.kind().as_str(),
            page = query.page,
            search = %query.search_term,
            "fetching public profiles"
        );
        let outcome = self
            .api
            .list_profiles(query.page, query.page_size, &query.search_term)
            .await;

        let mut state = self.inner.lock().await;
        let settle = state.fetch.settle(&ticket, outcome);
        if settle == Settle::Applied {
            self.publish(&state);
        }
        settle
    }

    fn publish(&self, state: &DirectoryState) {
        self.view
            .send_replace(build_view(state, self.settings.window_delta));
    }
}

impl Drop for DirectoryController {
    fn drop(&mut self) {
        if let Some(listener) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listener.abort();
        }
    }
}

fn build_view(state: &DirectoryState, window_delta: u32) -> DirectoryView {
    let page = state.fetch.page();
    let current_page = state.query.page();
    DirectoryView {
        items: page.items.clone(),
        pagination: page.pagination.clone(),
        current_page,
        search_input: state.query.raw_term().to_string(),
        search_term: state.query.debounced_term().to_string(),
        is_loading_full: matches!(state.fetch.state(), FetchState::Loading),
        is_searching: matches!(state.fetch.state(), FetchState::Searching),
        error_message: state.fetch.error_message().map(str::to_string),
        page_window: compute_window(current_page, page.pagination.total_pages, window_delta),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod view_tests;
