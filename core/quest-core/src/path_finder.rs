//! The path request service.
//!
//! A lookup commits `ShowLoader`, issues one GET built from a snapshot of the
//! current parameters, and commits exactly one of `SetPath` or `SetError`.
//! Each lookup gets a token. Only the newest token may commit a terminal
//! state, so a slow response to an older lookup can never overwrite a newer
//! one.
//!
//! `find_path` does all of this on the calling thread. Callers that want the
//! blocking GET elsewhere use `begin`, run [`PendingRequest::execute`] on their
//! own thread, and hand the result back to `complete`.

use std::sync::Arc;

use url::Url;

use crate::mutation::Mutation;
use crate::outcome::ErrorInfo;
use crate::parameters::query::{path_query_pairs, with_query};
use crate::parameters::Parameters;
use crate::store::AppStore;
use crate::transport::{ApiResponse, PathTransport, TransportError};
use crate::types::Path;

/// Monotonic request tokens.
#[derive(Debug, Default)]
pub(crate) struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub(crate) fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub(crate) fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

/// A lookup that has been started but not completed.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub token: u64,
    pub url: Url,
    /// Snapshot taken when the lookup began.
    pub parameters: Parameters,
}

impl PendingRequest {
    pub fn execute(
        &self,
        transport: &dyn PathTransport,
    ) -> std::result::Result<ApiResponse, TransportError> {
        transport.get(&self.url)
    }
}

pub struct PathFinder {
    transport: Arc<dyn PathTransport>,
    endpoint: Url,
    sequencer: RequestSequencer,
}

impl PathFinder {
    pub fn new(transport: Arc<dyn PathTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
            sequencer: RequestSequencer::default(),
        }
    }

    pub fn transport(&self) -> Arc<dyn PathTransport> {
        Arc::clone(&self.transport)
    }

    pub fn begin(&mut self, store: &mut AppStore) -> PendingRequest {
        let token = self.sequencer.issue();
        store.commit(Mutation::ShowLoader);

        let parameters = store.parameters().clone();
        let url = with_query(&self.endpoint, &path_query_pairs(&parameters));
        tracing::debug!(token, %url, "Finding path");

        PendingRequest {
            token,
            url,
            parameters,
        }
    }

    /// Commits the terminal state; returns `false` if the lookup was superseded.
    pub fn complete(
        &mut self,
        store: &mut AppStore,
        pending: &PendingRequest,
        result: std::result::Result<ApiResponse, TransportError>,
    ) -> bool {
        if !self.sequencer.is_current(pending.token) {
            tracing::debug!(token = pending.token, "Discarding stale path response");
            return false;
        }
        store.commit(path_outcome(result, &pending.parameters));
        true
    }

    pub fn find_path(&mut self, store: &mut AppStore) {
        let pending = self.begin(store);
        let result = pending.execute(&*self.transport);
        self.complete(store, &pending, result);
    }
}

/// Maps a transport result to `SetPath` or `SetError`.
pub(crate) fn path_outcome(
    result: std::result::Result<ApiResponse, TransportError>,
    parameters: &Parameters,
) -> Mutation {
    match result {
        Ok(response) if response.is_success() => {
            match serde_json::from_slice::<Path>(&response.body) {
                Ok(path) => Mutation::SetPath(path.rounded()),
                Err(err) => {
                    tracing::warn!(error = %err, "Path response is not a path");
                    Mutation::SetError(ErrorInfo::unparseable(
                        response.status,
                        &err.to_string(),
                        parameters,
                    ))
                }
            }
        }
        Ok(response) => {
            tracing::warn!(status = response.status, "Failed to find path");
            Mutation::SetError(ErrorInfo::from_response(
                response.status,
                &response.body,
                parameters,
            ))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to find path");
            Mutation::SetError(ErrorInfo::from_transport(err.to_string(), parameters))
        }
    }
}
