//! The mutation stream.
//!
//! Every state change is one [`Mutation`] applied to [`AppState`]. Mutations
//! are plain "set" operations, so applying the same one twice leaves the state
//! as if it had been applied once; sibling windows rely on this when a
//! broadcast arrives more than once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{QuestError, Result};
use crate::outcome::{ErrorInfo, QuestList, ResultState};
use crate::parameters::{FieldUpdate, Parameters};
use crate::types::{Path, Quest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Mutation {
    SetParameters(Parameters),
    UpdateField(FieldUpdate),
    ShowLoader,
    SetPath(Path),
    SetError(ErrorInfo),
    SelectAction(Option<usize>),
    SetQuestsLoading,
    SetQuests(Vec<Quest>),
    SetQuestsError(ErrorInfo),
}

impl Mutation {
    /// Wire name, as used in sync envelopes and share whitelists.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetParameters(_) => "setParameters",
            Mutation::UpdateField(_) => "updateField",
            Mutation::ShowLoader => "showLoader",
            Mutation::SetPath(_) => "setPath",
            Mutation::SetError(_) => "setError",
            Mutation::SelectAction(_) => "selectAction",
            Mutation::SetQuestsLoading => "setQuestsLoading",
            Mutation::SetQuests(_) => "setQuests",
            Mutation::SetQuestsError(_) => "setQuestsError",
        }
    }

    /// Splits into `(name, payload)` for a sync envelope.
    pub fn to_parts(&self) -> Result<(String, Option<Value>)> {
        let value =
            serde_json::to_value(self).map_err(|e| QuestError::json("encoding mutation", e))?;
        let payload = match value {
            Value::Object(mut map) => map.remove("payload"),
            _ => None,
        };
        Ok((self.name().to_string(), payload))
    }

    pub fn from_parts(name: &str, payload: Option<Value>) -> Result<Self> {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(name.to_string()));
        if let Some(payload) = payload {
            map.insert("payload".to_string(), payload);
        }
        serde_json::from_value(Value::Object(map))
            .map_err(|e| QuestError::json(format!("decoding mutation '{}'", name), e))
    }
}

/// Everything a window renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub parameters: Parameters,
    pub results: ResultState,
    pub quests: QuestList,
}

impl AppState {
    pub fn with_parameters(parameters: Parameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::SetParameters(parameters) => {
                self.parameters = parameters.clone();
                self.refresh_quest_priorities();
            }
            Mutation::UpdateField(update) => {
                self.parameters.apply(update);
                self.refresh_quest_priorities();
            }
            Mutation::ShowLoader => self.results.show_loader(),
            Mutation::SetPath(path) => self.results.set_path(path.clone().rounded()),
            Mutation::SetError(error) => self.results.set_error(error.clone()),
            Mutation::SelectAction(index) => self.results.select(*index),
            Mutation::SetQuestsLoading => self.quests = QuestList::Loading,
            Mutation::SetQuests(quests) => {
                self.quests = QuestList::Loaded(quests.clone());
                self.refresh_quest_priorities();
            }
            Mutation::SetQuestsError(error) => self.quests = QuestList::Failure(error.clone()),
        }
    }

    fn refresh_quest_priorities(&mut self) {
        if let QuestList::Loaded(quests) = &mut self.quests {
            for quest in quests.iter_mut() {
                quest.priority = self.parameters.priority_of(quest.id);
            }
        }
    }
}
