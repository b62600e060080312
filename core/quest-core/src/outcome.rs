//! Request outcomes: the result of the last path lookup and the quest list.
//!
//! Each lookup moves through `Idle -> Loading -> Success | Failure`, and the
//! terminal state is always written as a whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{QuestError, Result};
use crate::parameters::Parameters;
use crate::types::{Action, Path, Quest};

/// A failed lookup: what the server said, and what was asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Parsed error body, `{}` when there was none or it was not JSON.
    pub response: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Transport-level description when no response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Copy of the parameters that produced the failure.
    pub parameters: Parameters,
}

impl ErrorInfo {
    pub fn from_response(status: u16, body: &[u8], parameters: &Parameters) -> Self {
        Self {
            response: parse_body(body),
            status: Some(status),
            detail: None,
            parameters: parameters.clone(),
        }
    }

    pub fn from_transport(detail: impl Into<String>, parameters: &Parameters) -> Self {
        Self {
            response: placeholder(),
            status: None,
            detail: Some(detail.into()),
            parameters: parameters.clone(),
        }
    }

    /// A 2xx response whose body was not a path.
    pub fn unparseable(status: u16, details: &str, parameters: &Parameters) -> Self {
        Self {
            response: placeholder(),
            status: Some(status),
            detail: Some(format!("unexpected response body: {}", details)),
            parameters: parameters.clone(),
        }
    }

    /// Human-readable summary for logs and the CLI.
    pub fn message(&self) -> String {
        if let Some(message) = self.response.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        match (&self.detail, self.status) {
            (Some(detail), _) => detail.clone(),
            (None, Some(status)) => format!("request failed with HTTP {}", status),
            (None, None) => "request failed".to_string(),
        }
    }
}

fn placeholder() -> Value {
    Value::Object(Map::new())
}

fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return placeholder();
    }
    serde_json::from_slice(body).unwrap_or_else(|_| placeholder())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestOutcome {
    #[default]
    Idle,
    Loading,
    Success(Path),
    Failure(ErrorInfo),
}

impl RequestOutcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestOutcome::Loading)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            RequestOutcome::Success(path) => Some(path),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestOutcome::Failure(error) => Some(error),
            _ => None,
        }
    }
}

/// The last path lookup plus the action the View has selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultState {
    outcome: RequestOutcome,
    selected_action: Option<usize>,
}

impl ResultState {
    pub fn outcome(&self) -> &RequestOutcome {
        &self.outcome
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_action
    }

    pub fn selected_action(&self) -> Option<&Action> {
        let index = self.selected_action?;
        self.outcome.path()?.actions.get(index)
    }

    pub(crate) fn show_loader(&mut self) {
        self.outcome = RequestOutcome::Loading;
        self.selected_action = None;
    }

    pub(crate) fn set_path(&mut self, path: Path) {
        self.selected_action = if path.actions.is_empty() {
            None
        } else {
            Some(0)
        };
        self.outcome = RequestOutcome::Success(path);
    }

    pub(crate) fn set_error(&mut self, error: ErrorInfo) {
        self.outcome = RequestOutcome::Failure(error);
        self.selected_action = None;
    }

    /// Checks `index` against the current path without changing anything.
    pub fn validate_selection(&self, index: Option<usize>) -> Result<()> {
        let Some(index) = index else {
            return Ok(());
        };
        let len = self.outcome.path().map_or(0, |path| path.actions.len());
        if index < len {
            Ok(())
        } else {
            Err(QuestError::ActionOutOfRange { index, len })
        }
    }

    /// Sets the selection; out-of-range indices clear it.
    pub(crate) fn select(&mut self, index: Option<usize>) {
        self.selected_action = match self.validate_selection(index) {
            Ok(()) => index,
            Err(_) => None,
        };
    }
}

/// Incomplete quests for the current character.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuestList {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Quest>),
    Failure(ErrorInfo),
}

impl QuestList {
    pub fn quests(&self) -> &[Quest] {
        match self {
            QuestList::Loaded(quests) => quests,
            _ => &[],
        }
    }
}
