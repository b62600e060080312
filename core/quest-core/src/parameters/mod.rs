//! Path finder search parameters.
//!
//! [`Parameters`] is always fully populated: every field has a default and
//! loading merges stored values over those defaults one field at a time, so
//! a stored `false` or `[]` survives while a missing or malformed field falls
//! back on its own.
//!
//! Edits go through [`FieldUpdate`], a closed set of typed setters. Form
//! bindings that only know a key path such as `parameters.name` can use
//! [`FieldUpdate::from_path`], which maps the known paths onto the same enum.

pub(crate) mod query;
mod store;

pub use query::{encode_query, path_query_pairs, quests_query_pairs};
pub use store::{FileSlot, MemorySlot, ParameterSlot, ParameterStore};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{QuestError, Result};
use crate::types::{PathFinderAlgorithm, QuestAccessFilter, QuestPriority, QuestTypeFilter, Skill};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Character name; empty means unset.
    pub name: String,
    pub access_filter: QuestAccessFilter,
    pub type_filter: QuestTypeFilter,
    pub ironman: bool,
    pub recommended: bool,
    /// Ordered set; earlier skills get lamp rewards first.
    pub lamp_skills: Vec<Skill>,
    /// Quests without an entry are `NORMAL`.
    pub quest_priorities: BTreeMap<i32, QuestPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<PathFinderAlgorithm>,
}

impl Parameters {
    /// Parses a persisted blob, falling back to defaults on any problem.
    ///
    /// `None`, empty text and invalid JSON all yield the defaults.
    pub fn from_stored(text: Option<&str>) -> Self {
        let text = match text.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Self::default(),
        };

        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::merged_over_defaults(&value),
            Err(err) => {
                tracing::warn!(error = %err, "Stored parameters are not valid JSON; using defaults");
                Self::default()
            }
        }
    }

    /// Merges a stored JSON value over the defaults field by field.
    pub fn merged_over_defaults(value: &Value) -> Self {
        let empty = Map::new();
        let object = match value.as_object() {
            Some(object) => object,
            None => {
                tracing::warn!("Stored parameters are not a JSON object; using defaults");
                &empty
            }
        };

        let defaults = Self::default();
        Self {
            name: field(object, "name").unwrap_or(defaults.name),
            access_filter: field(object, "accessFilter").unwrap_or(defaults.access_filter),
            type_filter: field(object, "typeFilter").unwrap_or(defaults.type_filter),
            ironman: field(object, "ironman").unwrap_or(defaults.ironman),
            recommended: field(object, "recommended").unwrap_or(defaults.recommended),
            lamp_skills: stored_lamp_skills(object).unwrap_or(defaults.lamp_skills),
            quest_priorities: stored_quest_priorities(object)
                .unwrap_or(defaults.quest_priorities),
            algorithm: field(object, "algorithm").or(defaults.algorithm),
        }
    }

    pub fn priority_of(&self, quest_id: i32) -> QuestPriority {
        self.quest_priorities
            .get(&quest_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn apply(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Name(name) => self.name = name.clone(),
            FieldUpdate::AccessFilter(filter) => self.access_filter = *filter,
            FieldUpdate::TypeFilter(filter) => self.type_filter = *filter,
            FieldUpdate::Ironman(value) => self.ironman = *value,
            FieldUpdate::Recommended(value) => self.recommended = *value,
            FieldUpdate::LampSkills(skills) => self.lamp_skills = dedup_skills(skills),
            FieldUpdate::QuestPriority { id, priority } => match priority {
                Some(priority) => {
                    self.quest_priorities.insert(*id, *priority);
                }
                None => {
                    self.quest_priorities.remove(id);
                }
            },
            FieldUpdate::QuestPriorities(priorities) => {
                self.quest_priorities = priorities.clone();
            }
            FieldUpdate::Algorithm(algorithm) => self.algorithm = *algorithm,
        }
    }
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key).filter(|value| !value.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = key, error = %err, "Ignoring malformed stored parameter");
            None
        }
    }
}

/// Keeps the recognised skills of a stored array, in order.
fn stored_lamp_skills(object: &Map<String, Value>) -> Option<Vec<Skill>> {
    let items = object.get("lampSkills")?.as_array()?;
    let skills: Vec<Skill> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    Some(dedup_skills(&skills))
}

/// Keeps the well-formed entries of a stored `{ "<id>": "<PRIORITY>" }` map.
fn stored_quest_priorities(
    object: &Map<String, Value>,
) -> Option<BTreeMap<i32, QuestPriority>> {
    let entries = object.get("questPriorities")?.as_object()?;
    Some(
        entries
            .iter()
            .filter_map(|(id, priority)| {
                let id = id.parse::<i32>().ok()?;
                let priority = serde_json::from_value(priority.clone()).ok()?;
                Some((id, priority))
            })
            .collect(),
    )
}

/// Drops repeated skills, keeping the first occurrence.
pub fn dedup_skills(skills: &[Skill]) -> Vec<Skill> {
    let mut seen = Vec::with_capacity(skills.len());
    for skill in skills {
        if !seen.contains(skill) {
            seen.push(*skill);
        }
    }
    seen
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field Updates
// ═══════════════════════════════════════════════════════════════════════════════

/// A single typed edit to [`Parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    Name(String),
    AccessFilter(QuestAccessFilter),
    TypeFilter(QuestTypeFilter),
    Ironman(bool),
    Recommended(bool),
    LampSkills(Vec<Skill>),
    /// `None` removes the override, restoring `NORMAL`.
    QuestPriority {
        id: i32,
        priority: Option<QuestPriority>,
    },
    QuestPriorities(BTreeMap<i32, QuestPriority>),
    Algorithm(Option<PathFinderAlgorithm>),
}

impl FieldUpdate {
    /// Builds an update from a form-binding key path and a JSON value.
    ///
    /// Accepts `name`, `parameters.name`, `parameters.lampSkills`,
    /// `parameters.questPriorities[12]` and so on. Segments are split on `.`,
    /// `[` and `]`.
    pub fn from_path(path: &str, value: &Value) -> Result<Self> {
        let segments: Vec<&str> = path
            .split(['.', '[', ']'])
            .filter(|segment| !segment.is_empty())
            .collect();
        let segments = match segments.split_first() {
            Some((&"parameters", rest)) => rest,
            _ => segments.as_slice(),
        };

        match segments {
            ["name"] => Ok(FieldUpdate::Name(typed(path, value)?)),
            ["accessFilter"] => Ok(FieldUpdate::AccessFilter(typed(path, value)?)),
            ["typeFilter"] => Ok(FieldUpdate::TypeFilter(typed(path, value)?)),
            ["ironman"] => Ok(FieldUpdate::Ironman(typed(path, value)?)),
            ["recommended"] => Ok(FieldUpdate::Recommended(typed(path, value)?)),
            ["lampSkills"] => Ok(FieldUpdate::LampSkills(typed(path, value)?)),
            ["questPriorities"] => Ok(FieldUpdate::QuestPriorities(typed(path, value)?)),
            ["questPriorities", id] => {
                let id = id.parse::<i32>().map_err(|_| QuestError::InvalidFieldValue {
                    field: path.to_string(),
                    details: format!("'{}' is not a quest id", id),
                })?;
                Ok(FieldUpdate::QuestPriority {
                    id,
                    priority: typed(path, value)?,
                })
            }
            ["algorithm"] => Ok(FieldUpdate::Algorithm(typed(path, value)?)),
            _ => Err(QuestError::UnknownField(path.to_string())),
        }
    }
}

fn typed<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| QuestError::InvalidFieldValue {
        field: path.to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zezima() -> Parameters {
        Parameters {
            name: "Zezima".to_string(),
            access_filter: QuestAccessFilter::Members,
            type_filter: QuestTypeFilter::Sagas,
            ironman: true,
            recommended: false,
            lamp_skills: vec![Skill::Herblore, Skill::Agility],
            quest_priorities: BTreeMap::from([(12, QuestPriority::High), (3, QuestPriority::Low)]),
            algorithm: Some(PathFinderAlgorithm::SmartPriorities),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_or_empty_blob_yields_defaults() {
        assert_eq!(Parameters::from_stored(None), Parameters::default());
        assert_eq!(Parameters::from_stored(Some("")), Parameters::default());
        assert_eq!(Parameters::from_stored(Some("{}")), Parameters::default());
    }

    #[test]
    fn test_defaults_are_documented_values() {
        let defaults = Parameters::default();
        assert_eq!(defaults.name, "");
        assert_eq!(defaults.access_filter, QuestAccessFilter::All);
        assert_eq!(defaults.type_filter, QuestTypeFilter::All);
        assert!(!defaults.ironman);
        assert!(!defaults.recommended);
        assert!(defaults.lamp_skills.is_empty());
        assert!(defaults.quest_priorities.is_empty());
        assert_eq!(defaults.algorithm, None);
    }

    #[test]
    fn test_partial_blob_backfills_every_other_field() {
        let loaded = Parameters::from_stored(Some(r#"{ "ironman": true }"#));
        assert!(loaded.ironman);
        assert!(!loaded.recommended);
        assert_eq!(
            loaded,
            Parameters {
                ironman: true,
                ..Parameters::default()
            }
        );
    }

    #[test]
    fn test_malformed_blob_yields_defaults() {
        assert_eq!(
            Parameters::from_stored(Some("{ not json")),
            Parameters::default()
        );
        assert_eq!(Parameters::from_stored(Some("[1, 2]")), Parameters::default());
    }

    #[test]
    fn test_falsy_stored_values_are_kept() {
        let loaded = Parameters::from_stored(Some(
            r#"{ "name": "", "ironman": false, "lampSkills": [], "recommended": false }"#,
        ));
        assert_eq!(loaded, Parameters::default());
    }

    #[test]
    fn test_malformed_field_falls_back_alone() {
        let loaded = Parameters::from_stored(Some(
            r#"{ "name": "Zezima", "ironman": "yes", "typeFilter": "SAGAS", "accessFilter": null }"#,
        ));
        assert_eq!(loaded.name, "Zezima");
        assert!(!loaded.ironman);
        assert_eq!(loaded.type_filter, QuestTypeFilter::Sagas);
        assert_eq!(loaded.access_filter, QuestAccessFilter::All);
    }

    #[test]
    fn test_unknown_lamp_skills_and_bad_priorities_are_skipped() {
        let loaded = Parameters::from_stored(Some(
            r#"{
                "lampSkills": ["ATTACK", "WIZARDRY", "MAGIC", "ATTACK"],
                "questPriorities": { "7": "MAXIMUM", "x": "HIGH", "9": "URGENT" }
            }"#,
        ));
        assert_eq!(loaded.lamp_skills, vec![Skill::Attack, Skill::Magic]);
        assert_eq!(
            loaded.quest_priorities,
            BTreeMap::from([(7, QuestPriority::Maximum)])
        );
    }

    #[test]
    fn test_stored_archaeology_lamp_skill_survives_load() {
        let params =
            Parameters::from_stored(Some(r#"{"lampSkills":["ARCHAEOLOGY","SLAYER"]}"#));
        assert_eq!(params.lamp_skills, vec![Skill::Archaeology, Skill::Slayer]);
    }

    #[test]
    fn test_serialized_form_is_stable_across_round_trip() {
        for params in [Parameters::default(), zezima()] {
            let first = serde_json::to_string(&params).unwrap();
            let reloaded = Parameters::from_stored(Some(&first));
            let second = serde_json::to_string(&reloaded).unwrap();
            assert_eq!(first, second);
            assert_eq!(reloaded, params);
        }
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = serde_json::to_value(zezima()).unwrap();
        assert_eq!(value["accessFilter"], "MEMBERS");
        assert_eq!(value["lampSkills"], json!(["HERBLORE", "AGILITY"]));
        assert_eq!(value["questPriorities"]["12"], "HIGH");
        assert_eq!(value["algorithm"], "SMART_PRIORITIES");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Updates
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_lamp_skills_deduplicates_in_order() {
        let mut params = Parameters::default();
        params.apply(&FieldUpdate::LampSkills(vec![
            Skill::Agility,
            Skill::Attack,
            Skill::Agility,
        ]));
        assert_eq!(params.lamp_skills, vec![Skill::Agility, Skill::Attack]);
    }

    #[test]
    fn test_apply_quest_priority_sets_and_clears() {
        let mut params = Parameters::default();
        params.apply(&FieldUpdate::QuestPriority {
            id: 42,
            priority: Some(QuestPriority::Minimum),
        });
        assert_eq!(params.priority_of(42), QuestPriority::Minimum);

        params.apply(&FieldUpdate::QuestPriority {
            id: 42,
            priority: None,
        });
        assert_eq!(params.priority_of(42), QuestPriority::Normal);
        assert!(params.quest_priorities.is_empty());
    }

    #[test]
    fn test_from_path_accepts_nested_and_bare_paths() {
        assert_eq!(
            FieldUpdate::from_path("parameters.name", &json!("Zezima")).unwrap(),
            FieldUpdate::Name("Zezima".to_string())
        );
        assert_eq!(
            FieldUpdate::from_path("ironman", &json!(true)).unwrap(),
            FieldUpdate::Ironman(true)
        );
        assert_eq!(
            FieldUpdate::from_path("parameters.questPriorities[12]", &json!("HIGH")).unwrap(),
            FieldUpdate::QuestPriority {
                id: 12,
                priority: Some(QuestPriority::High)
            }
        );
        assert_eq!(
            FieldUpdate::from_path("parameters.lampSkills", &json!(["AGILITY", "ATTACK"]))
                .unwrap(),
            FieldUpdate::LampSkills(vec![Skill::Agility, Skill::Attack])
        );
    }

    #[test]
    fn test_from_path_rejects_unknown_and_ill_typed() {
        assert!(matches!(
            FieldUpdate::from_path("parameters.colour", &json!("red")),
            Err(QuestError::UnknownField(_))
        ));
        assert!(matches!(
            FieldUpdate::from_path("parameters.ironman", &json!("yes")),
            Err(QuestError::InvalidFieldValue { .. })
        ));
        assert!(matches!(
            FieldUpdate::from_path("parameters.questPriorities[abc]", &json!("HIGH")),
            Err(QuestError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_field_update_wire_shape() {
        let value = serde_json::to_value(FieldUpdate::QuestPriority {
            id: 5,
            priority: Some(QuestPriority::Low),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "field": "questPriority", "value": { "id": 5, "priority": "LOW" } })
        );
    }
}
