//! Loads the incomplete-quest list used to edit quest priorities.

use std::sync::Arc;

use url::Url;

use crate::mutation::Mutation;
use crate::outcome::ErrorInfo;
use crate::parameters::query::{quests_query_pairs, with_query};
use crate::parameters::Parameters;
use crate::path_finder::{PendingRequest, RequestSequencer};
use crate::store::AppStore;
use crate::transport::{ApiResponse, PathTransport, TransportError};
use crate::types::Quest;

pub struct QuestLoader {
    transport: Arc<dyn PathTransport>,
    endpoint: Url,
    sequencer: RequestSequencer,
}

impl QuestLoader {
    pub fn new(transport: Arc<dyn PathTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
            sequencer: RequestSequencer::default(),
        }
    }

    /// Commits `SetQuestsLoading` and snapshots the request.
    pub fn begin(&mut self, store: &mut AppStore) -> PendingRequest {
        let token = self.sequencer.issue();
        store.commit(Mutation::SetQuestsLoading);

        let parameters = store.parameters().clone();
        let url = with_query(&self.endpoint, &quests_query_pairs(&parameters));
        tracing::debug!(token, %url, "Loading quests");

        PendingRequest {
            token,
            url,
            parameters,
        }
    }

    /// Commits the quest list or its error; returns `false` if superseded.
    pub fn complete(
        &mut self,
        store: &mut AppStore,
        pending: &PendingRequest,
        result: std::result::Result<ApiResponse, TransportError>,
    ) -> bool {
        if !self.sequencer.is_current(pending.token) {
            tracing::debug!(token = pending.token, "Discarding stale quest list");
            return false;
        }
        store.commit(quests_outcome(result, &pending.parameters));
        true
    }

    pub fn load_quests(&mut self, store: &mut AppStore) {
        let pending = self.begin(store);
        let result = pending.execute(&*self.transport);
        self.complete(store, &pending, result);
    }
}

fn quests_outcome(
    result: std::result::Result<ApiResponse, TransportError>,
    parameters: &Parameters,
) -> Mutation {
    match result {
        Ok(response) if response.is_success() => {
            match serde_json::from_slice::<Vec<Quest>>(&response.body) {
                Ok(quests) => Mutation::SetQuests(prepare_quests(quests, parameters)),
                Err(err) => {
                    tracing::warn!(error = %err, "Quest list response is not a quest list");
                    Mutation::SetQuestsError(ErrorInfo::unparseable(
                        response.status,
                        &err.to_string(),
                        parameters,
                    ))
                }
            }
        }
        Ok(response) => {
            tracing::warn!(status = response.status, "Failed to load quests");
            Mutation::SetQuestsError(ErrorInfo::from_response(
                response.status,
                &response.body,
                parameters,
            ))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load quests");
            Mutation::SetQuestsError(ErrorInfo::from_transport(err.to_string(), parameters))
        }
    }
}

/// Drops placeholder entries (negative ids) and applies priority overrides.
fn prepare_quests(quests: Vec<Quest>, parameters: &Parameters) -> Vec<Quest> {
    quests
        .into_iter()
        .filter(|quest| quest.id >= 0)
        .map(|mut quest| {
            quest.priority = parameters.priority_of(quest.id);
            quest
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::QuestList;
    use crate::types::QuestPriority;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct Canned(ApiResponse);

    impl PathTransport for Canned {
        fn get(&self, _url: &Url) -> std::result::Result<ApiResponse, TransportError> {
            Ok(self.0.clone())
        }
    }

    fn loader(status: u16, body: serde_json::Value) -> QuestLoader {
        QuestLoader::new(
            Arc::new(Canned(ApiResponse {
                status,
                body: body.to_string().into_bytes(),
            })),
            Url::parse("http://localhost/api/quests").unwrap(),
        )
    }

    #[test]
    fn test_negative_ids_dropped_and_priorities_applied() {
        let mut store = AppStore::default();
        store.set_parameters(Parameters {
            quest_priorities: BTreeMap::from([(2, QuestPriority::High)]),
            ..Parameters::default()
        });

        loader(
            200,
            json!([
                { "id": -1, "displayName": "Unknown" },
                { "id": 1, "displayName": "Cook's Assistant", "priority": "LOW" },
                { "id": 2, "displayName": "Dragon Slayer" }
            ]),
        )
        .load_quests(&mut store);

        let quests = store.state().quests.quests();
        assert_eq!(quests.len(), 2);
        assert_eq!(quests[0].priority, QuestPriority::Normal);
        assert_eq!(quests[1].priority, QuestPriority::High);
    }

    #[test]
    fn test_error_response_is_captured() {
        let mut store = AppStore::default();
        loader(404, json!({ "message": "player not found" })).load_quests(&mut store);

        match &store.state().quests {
            QuestList::Failure(error) => {
                assert_eq!(error.message(), "player not found");
                assert_eq!(error.status, Some(404));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_superseded_quest_list_is_discarded() {
        let mut store = AppStore::default();
        let mut loader = loader(200, json!([]));

        let first = loader.begin(&mut store);
        let second = loader.begin(&mut store);

        let newer = ApiResponse {
            status: 200,
            body: br#"[{ "id": 7, "displayName": "Druidic Ritual" }]"#.to_vec(),
        };
        assert!(loader.complete(&mut store, &second, Ok(newer)));

        let older = ApiResponse {
            status: 500,
            body: b"{}".to_vec(),
        };
        assert!(!loader.complete(&mut store, &first, Ok(older)));

        assert_eq!(store.state().quests.quests().len(), 1);
        assert_eq!(store.state().quests.quests()[0].id, 7);
    }
}
