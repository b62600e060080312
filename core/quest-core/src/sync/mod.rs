//! Cross-window sync.
//!
//! Each window wraps its committed mutations in a [`SyncEnvelope`] and hands
//! them to a [`SyncStrategy`], which delivers them to sibling windows. Two
//! strategies exist:
//!
//! - [`HubChannel`]: a Unix socket connection to the local sync hub, which
//!   relays every envelope to the other connected windows.
//! - [`JournalStrategy`]: an append-only JSON-lines file that every window
//!   appends to and polls. Used when the hub is not running.
//!
//! Receivers drop their own echoes and any `(origin, seq)` pair they have
//! already applied. Mutations are plain sets, so a duplicate that slips past
//! the bounded seen-set is still harmless.

mod hub;
mod journal;

pub use hub::HubChannel;
pub use journal::JournalStrategy;

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use ironquest_sync_protocol::{SyncEnvelope, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::mutation::Mutation;
use crate::storage::StorageConfig;

/// How many delivery keys a sharer remembers for duplicate detection.
const SEEN_CAPACITY: usize = 1024;

/// A delivery channel between sibling windows.
pub trait SyncStrategy: Send {
    fn name(&self) -> &'static str;

    fn publish(&mut self, envelope: &SyncEnvelope) -> Result<()>;

    /// Returns envelopes that arrived since the last poll, oldest first.
    fn poll(&mut self) -> Result<Vec<SyncEnvelope>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Hub when reachable, otherwise the journal.
    #[default]
    Auto,
    Hub,
    Journal,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Auto => "auto",
            StrategyKind::Hub => "hub",
            StrategyKind::Journal => "journal",
        })
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyKind::Auto),
            "hub" => Ok(StrategyKind::Hub),
            "journal" => Ok(StrategyKind::Journal),
            other => Err(format!(
                "unknown sync strategy '{}' (expected auto, hub or journal)",
                other
            )),
        }
    }
}

/// Which mutations cross window boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePredicate {
    #[default]
    All,
    Whitelist(Vec<String>),
}

impl SharePredicate {
    /// The mutations that keep sibling windows consistent: parameters and the
    /// path outcome. Selection and the quest list stay per window.
    pub fn consistency_whitelist() -> Self {
        SharePredicate::Whitelist(
            ["setParameters", "updateField", "showLoader", "setPath", "setError"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )
    }

    pub fn allows(&self, mutation_name: &str) -> bool {
        match self {
            SharePredicate::All => true,
            SharePredicate::Whitelist(names) => names.iter().any(|name| name == mutation_name),
        }
    }
}

/// Opens the configured strategy.
///
/// `Auto` tries the hub, then the journal. Failing both is fatal: a window
/// that cannot sync must not run silently out of step with its siblings.
pub fn select_strategy(
    kind: StrategyKind,
    storage: &StorageConfig,
) -> Result<Box<dyn SyncStrategy>> {
    let hub = || HubChannel::connect(&storage.hub_socket());
    let journal = || JournalStrategy::open(storage.sync_journal_file());

    match kind {
        StrategyKind::Hub => match hub() {
            Ok(channel) => Ok(Box::new(channel)),
            Err(err) => Err(QuestError::NoSyncStrategy {
                hub: err.to_string(),
                journal: "not selected".to_string(),
            }),
        },
        StrategyKind::Journal => match journal() {
            Ok(journal) => Ok(Box::new(journal)),
            Err(err) => Err(QuestError::NoSyncStrategy {
                hub: "not selected".to_string(),
                journal: err.to_string(),
            }),
        },
        StrategyKind::Auto => {
            let hub_err = match hub() {
                Ok(channel) => return Ok(Box::new(channel)),
                Err(err) => err,
            };
            tracing::debug!(error = %hub_err, "Sync hub unavailable; using journal");
            match journal() {
                Ok(journal) => Ok(Box::new(journal)),
                Err(journal_err) => Err(QuestError::NoSyncStrategy {
                    hub: hub_err.to_string(),
                    journal: journal_err.to_string(),
                }),
            }
        }
    }
}

/// Bounded memory of delivery keys, oldest evicted first.
#[derive(Debug, Default)]
struct SeenSet {
    order: VecDeque<(String, u64)>,
    keys: HashSet<(String, u64)>,
}

impl SeenSet {
    /// Returns `false` if `key` was already present.
    fn insert(&mut self, key: (String, u64)) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        if self.order.len() == SEEN_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.keys.insert(key);
        true
    }
}

/// Shares one window's mutations and receives its siblings'.
pub struct MutationSharer {
    strategy: Box<dyn SyncStrategy>,
    predicate: SharePredicate,
    origin: String,
    next_seq: u64,
    seen: SeenSet,
}

impl MutationSharer {
    pub fn new(strategy: Box<dyn SyncStrategy>, predicate: SharePredicate) -> Self {
        Self {
            strategy,
            predicate,
            origin: ulid::Ulid::new().to_string(),
            next_seq: 1,
            seen: SeenSet::default(),
        }
    }

    pub fn open(
        kind: StrategyKind,
        predicate: SharePredicate,
        storage: &StorageConfig,
    ) -> Result<Self> {
        let strategy = select_strategy(kind, storage)?;
        tracing::info!(strategy = strategy.name(), "Cross-window sync ready");
        Ok(Self::new(strategy, predicate))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Publishes `mutation` if the predicate allows it; returns whether it was sent.
    pub fn share(&mut self, mutation: &Mutation) -> Result<bool> {
        if !self.predicate.allows(mutation.name()) {
            return Ok(false);
        }

        let (name, payload) = mutation.to_parts()?;
        let envelope = SyncEnvelope {
            protocol_version: PROTOCOL_VERSION,
            origin: self.origin.clone(),
            seq: self.next_seq,
            recorded_at: Utc::now().to_rfc3339(),
            mutation: name,
            payload,
        };
        self.strategy.publish(&envelope)?;
        self.next_seq += 1;
        Ok(true)
    }

    /// Mutations from sibling windows not yet applied here, oldest first.
    pub fn receive(&mut self) -> Result<Vec<Mutation>> {
        let envelopes = self.strategy.poll()?;
        let mut mutations = Vec::with_capacity(envelopes.len());

        for envelope in envelopes {
            if envelope.origin == self.origin {
                continue;
            }
            if let Err(err) = envelope.validate() {
                tracing::warn!(error = %err, "Dropping invalid sync envelope");
                continue;
            }
            if !self.predicate.allows(&envelope.mutation) {
                continue;
            }
            if !self.seen.insert(envelope.delivery_key()) {
                tracing::debug!(
                    origin = %envelope.origin,
                    seq = envelope.seq,
                    "Dropping duplicate sync envelope"
                );
                continue;
            }
            match Mutation::from_parts(&envelope.mutation, envelope.payload) {
                Ok(mutation) => mutations.push(mutation),
                Err(err) => {
                    tracing::warn!(error = %err, "Dropping undecodable sync envelope");
                }
            }
        }

        Ok(mutations)
    }
}
