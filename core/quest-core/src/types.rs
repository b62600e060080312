//! Core types shared between the store, the API client and the views.
//!
//! Enum values travel as their SCREAMING_CASE wire names in JSON bodies,
//! persisted parameters and query strings alike.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declares a closed enum with a fixed wire name per variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_ascii_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == upper)
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parameter Enums
// ═══════════════════════════════════════════════════════════════════════════════

wire_enum! {
    /// A trainable skill; also the domain of lamp-skill selection.
    pub enum Skill {
        Agility => "AGILITY",
        Archaeology => "ARCHAEOLOGY",
        Attack => "ATTACK",
        Constitution => "CONSTITUTION",
        Construction => "CONSTRUCTION",
        Cooking => "COOKING",
        Crafting => "CRAFTING",
        Defence => "DEFENCE",
        Divination => "DIVINATION",
        Dungeoneering => "DUNGEONEERING",
        Farming => "FARMING",
        Firemaking => "FIREMAKING",
        Fishing => "FISHING",
        Fletching => "FLETCHING",
        Herblore => "HERBLORE",
        Hunter => "HUNTER",
        Invention => "INVENTION",
        Magic => "MAGIC",
        Mining => "MINING",
        Prayer => "PRAYER",
        Ranged => "RANGED",
        Runecrafting => "RUNECRAFTING",
        Slayer => "SLAYER",
        Smithing => "SMITHING",
        Strength => "STRENGTH",
        Summoning => "SUMMONING",
        Thieving => "THIEVING",
        Woodcutting => "WOODCUTTING",
    }
}

wire_enum! {
    /// Filter quests by membership access.
    #[derive(Default)]
    pub enum QuestAccessFilter {
        #[default]
        All => "ALL",
        Free => "FREE",
        Members => "MEMBERS",
    }
}

wire_enum! {
    /// Filter quests by type.
    #[derive(Default)]
    pub enum QuestTypeFilter {
        #[default]
        All => "ALL",
        Quests => "QUESTS",
        Sagas => "SAGAS",
        Miniquests => "MINIQUESTS",
    }
}

wire_enum! {
    #[derive(Default)]
    pub enum QuestPriority {
        Maximum => "MAXIMUM",
        High => "HIGH",
        #[default]
        Normal => "NORMAL",
        Low => "LOW",
        Minimum => "MINIMUM",
    }
}

wire_enum! {
    /// Server-side path finding algorithm selector.
    pub enum PathFinderAlgorithm {
        Default => "DEFAULT",
        SmartPriorities => "SMART_PRIORITIES",
    }
}

wire_enum! {
    pub enum ActionType {
        Lamp => "LAMP",
        Quest => "QUEST",
        Train => "TRAIN",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Path Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Character state after an action has been performed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub name: String,
    /// Skills the server reports that this client does not know are skipped.
    #[serde(deserialize_with = "known_skill_levels")]
    pub levels: BTreeMap<Skill, u32>,
    pub quest_points: u32,
    pub total_level: u32,
    pub combat_level: u32,
}

fn known_skill_levels<'de, D>(deserializer: D) -> Result<BTreeMap<Skill, u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, level)| match name.parse::<Skill>() {
            Ok(skill) => Some((skill, level)),
            Err(_) => {
                tracing::debug!(skill = %name, "Skipping unknown skill level");
                None
            }
        })
        .collect())
}

/// Quest reference attached to LAMP and QUEST actions.
///
/// Older API revisions send only `displayName`, so `id` and `priority` are
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<QuestPriority>,
}

/// One step of a computed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub player: Player,
    #[serde(default)]
    pub future: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest: Option<QuestRef>,
}

impl Action {
    /// The associated quest; TRAIN actions never carry one.
    pub fn quest(&self) -> Option<&QuestRef> {
        match self.action_type {
            ActionType::Lamp | ActionType::Quest => self.quest.as_ref(),
            ActionType::Train => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathStats {
    pub percent_complete: f64,
}

/// The full ordered sequence of actions plus completion statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub stats: PathStats,
}

impl Path {
    /// Rounds the completion percentage to the nearest integer for display.
    pub fn rounded(mut self) -> Self {
        self.stats.percent_complete = self.stats.percent_complete.round();
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Quest List Types
// ═══════════════════════════════════════════════════════════════════════════════

/// An incomplete quest as listed by the `/quests` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: i32,
    pub display_name: String,
    #[serde(default)]
    pub priority: QuestPriority,
}
