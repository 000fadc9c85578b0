//! Received connection requests and the accept/reject actions on them.

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use futures::future::join_all;
use shared::{
    domain::{RequestId, RequestStatus},
    protocol::{ConnectionRequest, RequesterSummary},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::ClientResult,
    ProfileDirectory, RequestAction, RequestsApi,
};

pub const REQUESTER_NAME_FALLBACK: &str = "Unknown User";
pub const REQUESTS_FAILURE_FALLBACK: &str = "Failed to load requests";
pub const ACTION_FAILURE_FALLBACK: &str = "Failed to update request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespondOutcome {
    Updated(RequestStatus),
    /// Another accept/reject is still running.
    Busy,
    /// Unknown id, or the request is no longer pending.
    NotActionable,
}

#[derive(Default)]
struct RequestListState {
    requests: Vec<ConnectionRequest>,
    action_in_flight: Option<RequestId>,
    error: Option<String>,
}

pub struct RequestList {
    requests_api: Arc<dyn RequestsApi>,
    profiles: Arc<dyn ProfileDirectory>,
    state: Mutex<RequestListState>,
}

impl RequestList {
    pub fn new(requests_api: Arc<dyn RequestsApi>, profiles: Arc<dyn ProfileDirectory>) -> Self {
        Self {
            requests_api,
            profiles,
            state: Mutex::new(RequestListState::default()),
        }
    }

    pub async fn refresh(&self) -> ClientResult<Vec<ConnectionRequest>> {
        match self.requests_api.list_received_requests().await {
            Ok(requests) => {
                debug!(count = requests.len(), "received requests loaded");
                let mut state = self.state.lock().await;
                state.requests = requests.clone();
                state.error = None;
                Ok(requests)
            }
            Err(err) => {
                warn!(kind = err.kind(), "failed to load received requests: {err}");
                self.state.lock().await.error =
                    Some(err.display_message(REQUESTS_FAILURE_FALLBACK));
                Err(err)
            }
        }
    }

    pub async fn requests(&self) -> Vec<ConnectionRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Action buttons stay disabled while this returns `true`.
    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.action_in_flight.is_some()
    }

    pub async fn accept(&self, request_id: &RequestId) -> ClientResult<RespondOutcome> {
        self.respond(request_id, RequestAction::Accept).await
    }

    pub async fn reject(&self, request_id: &RequestId) -> ClientResult<RespondOutcome> {
        self.respond(request_id, RequestAction::Reject).await
    }

    async fn respond(
        &self,
        request_id: &RequestId,
        action: RequestAction,
    ) -> ClientResult<RespondOutcome> {
        {
            let mut state = self.state.lock().await;
            if state.action_in_flight.is_some() {
                return Ok(RespondOutcome::Busy);
            }
            let actionable = state
                .requests
                .iter()
                .any(|request| &request.id == request_id && is_actionable(request));
            if !actionable {
                return Ok(RespondOutcome::NotActionable);
            }
            state.action_in_flight = Some(request_id.clone());
            state.error = None;
        }

        let result = self
            .requests_api
            .respond_to_request(request_id, action)
            .await;

        let mut state = self.state.lock().await;
        state.action_in_flight = None;
        match result {
            Ok(()) => {
                let status = match action {
                    RequestAction::Accept => RequestStatus::Accepted,
                    RequestAction::Reject => RequestStatus::Rejected,
                };
                if let Some(request) = state
                    .requests
                    .iter_mut()
                    .find(|request| &request.id == request_id)
                {
                    request.status = status;
                }
                info!(request_id = %request_id, action = action.as_str(), "request updated");
                Ok(RespondOutcome::Updated(status))
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    action = action.as_str(),
                    kind = err.kind(),
                    "failed to update request: {err}"
                );
                state.error = Some(err.display_message(ACTION_FAILURE_FALLBACK));
                Err(err)
            }
        }
    }

    /// Display names for every loaded request, looked up concurrently.
    pub async fn requester_names(&self) -> Vec<(RequestId, String)> {
        let requests = self.requests().await;
        let names = join_all(
            requests
                .iter()
                .map(|request| resolve_requester_name(self.profiles.as_ref(), &request.requester)),
        )
        .await;
        requests
            .into_iter()
            .map(|request| request.id)
            .zip(names)
            .collect()
    }
}

pub fn is_actionable(request: &ConnectionRequest) -> bool {
    request.status == RequestStatus::Pending
}

/// Profile full name first, then whatever the request itself carried.
pub async fn resolve_requester_name(
    profiles: &dyn ProfileDirectory,
    requester: &RequesterSummary,
) -> String {
    match profiles.get_profile_by_user_id(&requester.id).await {
        Ok(profile) => match profile.fullname.filter(|name| !name.trim().is_empty()) {
            Some(name) => name,
            None => embedded_requester_name(requester).to_string(),
        },
        Err(err) => {
            debug!(user_id = %requester.id, kind = err.kind(), "requester profile lookup failed");
            embedded_requester_name(requester).to_string()
        }
    }
}

fn embedded_requester_name(requester: &RequesterSummary) -> &str {
    [requester.fullname.as_deref(), requester.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(REQUESTER_NAME_FALLBACK)
}

pub fn requester_headline(requester: &RequesterSummary) -> &str {
    requester
        .headline
        .as_deref()
        .filter(|headline| !headline.trim().is_empty())
        .unwrap_or("No headline")
}

pub fn status_label(status: RequestStatus) -> String {
    status.as_str().to_uppercase()
}

/// e.g. `May 1, 2024, 10:00 AM`
pub fn format_received_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
#[path = "tests/requests_tests.rs"]
mod tests;
