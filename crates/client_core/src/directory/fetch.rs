//! Request bookkeeping for directory fetches: loading/searching
//! classification, payload validation, and the stale-response guard.

use serde_json::Value;
use shared::protocol::{PaginationInfo, Profile};
use tracing::{debug, warn};

use super::query::Query;
use crate::error::{ClientError, ClientResult};

pub const FETCH_FAILURE_FALLBACK: &str = "Failed to load profiles. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub items: Vec<Profile>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Searching,
    Success(PageResult),
    Failure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Same search term as the last settled fetch, e.g. a page change.
    Loading,
    /// The search term changed since the last settled fetch.
    Searching,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Searching => "searching",
        }
    }
}

/// Identity of one issued fetch. Only the ticket of the latest fetch may
/// change state when it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    kind: FetchKind,
    query: Query,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Applied,
    /// A newer fetch was issued in the meantime; the result was dropped.
    Stale,
}

#[derive(Debug)]
pub struct FetchCoordinator {
    state: FetchState,
    latest_request: u64,
    settled_term: String,
    last_query: Option<Query>,
    // Last applied page; stays visible while the next fetch is running.
    current: PageResult,
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self {
            state: FetchState::Idle,
            latest_request: 0,
            settled_term: String::new(),
            last_query: None,
            current: PageResult::default(),
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn page(&self) -> &PageResult {
        &self.current
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, FetchState::Loading | FetchState::Searching)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            FetchState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn begin(&mut self, query: Query) -> FetchTicket {
        self.latest_request += 1;
        let kind = if query.search_term != self.settled_term {
            FetchKind::Searching
        } else {
            FetchKind::Loading
        };
        self.state = match kind {
            FetchKind::Loading => FetchState::Loading,
            FetchKind::Searching => FetchState::Searching,
        };
        self.last_query = Some(query.clone());
        FetchTicket {
            id: self.latest_request,
            kind,
            query,
        }
    }

    /// Re-issues the last attempted query, if any.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let query = self.last_query.clone()?;
        Some(self.begin(query))
    }

    pub fn settle(&mut self, ticket: &FetchTicket, outcome: ClientResult<Value>) -> Settle {
        if ticket.id != self.latest_request {
            debug!(
                request = ticket.id,
                latest = self.latest_request,
                page = ticket.query.page,
                "discarding stale directory response"
            );
            return Settle::Stale;
        }

        self.settled_term = ticket.query.search_term.clone();
        match outcome.and_then(|body| parse_page(body, ticket.query.page)) {
            Ok(page) => {
                debug!(
                    request = ticket.id,
                    page = ticket.query.page,
                    items = page.items.len(),
                    total_pages = page.pagination.total_pages,
                    "directory page applied"
                );
                self.current = page.clone();
                self.state = FetchState::Success(page);
            }
            Err(err) => {
                warn!(
                    request = ticket.id,
                    kind = err.kind(),
                    page = ticket.query.page,
                    search = %ticket.query.search_term,
                    "error fetching public profiles: {err}"
                );
                self.current = PageResult::default();
                self.state = FetchState::Failure(err.display_message(FETCH_FAILURE_FALLBACK));
            }
        }
        Settle::Applied
    }
}

/// Validates a list body. Anything that is not an object is rejected; a
/// missing or malformed `data` becomes an empty list and a missing
/// `pagination` becomes the zeroed structure.
pub fn parse_page(body: Value, requested_page: u32) -> ClientResult<PageResult> {
    let Value::Object(mut body) = body else {
        return Err(ClientError::invalid_shape("list response is not an object"));
    };

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = shared::error::ErrorEnvelope::from_json(&Value::Object(body.clone()))
            .and_then(|envelope| envelope.server_message().map(str::to_string))
            .unwrap_or_else(|| FETCH_FAILURE_FALLBACK.to_string());
        return Err(ClientError::application(message));
    }

    let items = match body.remove("data") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Profile>(entry) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    warn!("dropping malformed profile entry: {err}");
                    None
                }
            })
            .collect(),
        Some(other) if !other.is_null() => {
            warn!("profile list `data` is not an array; treating as empty");
            Vec::new()
        }
        _ => Vec::new(),
    };

    // Serde would read an array positionally; only an object is a pagination.
    let pagination = match body.remove("pagination") {
        Some(raw @ Value::Object(_)) => serde_json::from_value::<PaginationInfo>(raw)
            .unwrap_or_else(|err| {
                warn!("malformed pagination, using defaults: {err}");
                PaginationInfo::default()
            }),
        Some(other) if !other.is_null() => {
            warn!("profile list `pagination` is not an object; using defaults");
            PaginationInfo::default()
        }
        _ => PaginationInfo::default(),
    };

    Ok(PageResult {
        items,
        pagination: normalize_pagination(pagination, requested_page),
    })
}

/// `has_prev`/`has_next` follow from the requested page, not the server.
pub fn normalize_pagination(pagination: PaginationInfo, current_page: u32) -> PaginationInfo {
    PaginationInfo {
        has_prev: current_page > 1,
        has_next: current_page < pagination.total_pages,
        ..pagination
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
