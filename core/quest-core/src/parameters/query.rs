//! Query-string form of [`Parameters`].
//!
//! Arrays repeat their key (`lampSkills=AGILITY&lampSkills=ATTACK`) and the
//! priority map uses bracketed keys (`questPriorities[12]=HIGH`), which is what
//! the path finder API binds against.

use url::form_urlencoded;
use url::Url;

use super::Parameters;

/// Query pairs for `GET /quests/path`, in a stable order.
pub fn path_query_pairs(params: &Parameters) -> Vec<(String, String)> {
    let mut pairs = quests_query_pairs(params);
    pairs.push(("ironman".to_string(), params.ironman.to_string()));
    pairs.push(("recommended".to_string(), params.recommended.to_string()));
    for skill in &params.lamp_skills {
        pairs.push(("lampSkills".to_string(), skill.to_string()));
    }
    for (id, priority) in &params.quest_priorities {
        pairs.push((format!("questPriorities[{}]", id), priority.to_string()));
    }
    if let Some(algorithm) = params.algorithm {
        pairs.push(("algorithm".to_string(), algorithm.to_string()));
    }
    pairs
}

/// Query pairs for `GET /quests`: only the character and its filters.
pub fn quests_query_pairs(params: &Parameters) -> Vec<(String, String)> {
    vec![
        ("name".to_string(), params.name.clone()),
        ("accessFilter".to_string(), params.access_filter.to_string()),
        ("typeFilter".to_string(), params.type_filter.to_string()),
    ]
}

/// `application/x-www-form-urlencoded` encoding of `pairs`.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Returns `endpoint` with `pairs` appended to its query.
pub(crate) fn with_query(endpoint: &Url, pairs: &[(String, String)]) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().extend_pairs(pairs);
    url
}
