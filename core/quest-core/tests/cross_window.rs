//! Two windows sharing one storage root through the journal strategy.

use quest_core::{
    ApiResponse, App, ClientConfig, FieldUpdate, Mutation, Parameters, PathTransport,
    QuestPriority, RequestOutcome, SharePredicate, StorageConfig, StrategyKind, TransportError,
};
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

struct Canned(u16, &'static str);

impl PathTransport for Canned {
    fn get(&self, _url: &Url) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse {
            status: self.0,
            body: self.1.as_bytes().to_vec(),
        })
    }
}

fn window(root: &TempDir, share: SharePredicate, transport: Canned) -> App {
    let storage = StorageConfig::with_root(root.path().to_path_buf());
    let config = ClientConfig {
        sync_strategy: StrategyKind::Journal,
        share,
        ..ClientConfig::default()
    };
    App::with_transport(storage, config, Arc::new(transport)).expect("window bootstrap")
}

const ONE_ACTION: &str = r#"{
    "actions": [{ "type": "TRAIN", "player": { "name": "Zezima" }, "future": false, "message": "Train" }],
    "stats": { "percentComplete": 12.4 }
}"#;

#[test]
fn parameter_edits_reach_sibling_window() {
    let root = TempDir::new().unwrap();
    let mut settings = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));
    let mut results = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));

    settings
        .store
        .update_field(FieldUpdate::Name("Zezima".to_string()));
    settings.store.update_field(FieldUpdate::QuestPriority {
        id: 12,
        priority: Some(QuestPriority::High),
    });

    assert_eq!(results.sync(), 2);
    assert_eq!(results.store.parameters().name, "Zezima");
    assert_eq!(results.store.parameters().priority_of(12), QuestPriority::High);

    // The sender never applies its own echoes.
    assert_eq!(settings.sync(), 0);
}

#[test]
fn path_outcome_reaches_sibling_window() {
    let root = TempDir::new().unwrap();
    let mut settings = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));
    let mut results = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));

    settings.find_path();
    results.sync();

    let path = results.store.results().outcome().path().expect("shared path");
    assert_eq!(path.stats.percent_complete, 12.0);
    assert_eq!(results.store.results().selected_index(), Some(0));
}

#[test]
fn remote_mutations_are_not_rebroadcast() {
    let root = TempDir::new().unwrap();
    let mut a = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));
    let mut b = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));
    let mut c = window(&root, SharePredicate::All, Canned(200, ONE_ACTION));

    a.store.update_field(FieldUpdate::Ironman(true));
    assert_eq!(b.sync(), 1);
    assert_eq!(c.sync(), 1);
    assert_eq!(a.sync(), 0);
    assert_eq!(c.sync(), 0);
}

#[test]
fn whitelist_keeps_selection_local() {
    let root = TempDir::new().unwrap();
    let whitelist = SharePredicate::consistency_whitelist();
    let mut a = window(&root, whitelist.clone(), Canned(200, ONE_ACTION));
    let mut b = window(&root, whitelist, Canned(200, ONE_ACTION));

    a.find_path();
    b.sync();
    a.store.select_action(None).unwrap();

    assert_eq!(b.sync(), 0);
    assert_eq!(b.store.results().selected_index(), Some(0));
    assert_eq!(a.store.results().selected_index(), None);
}

#[test]
fn replayed_broadcast_is_idempotent() {
    let root = TempDir::new().unwrap();
    let mut b = window(&root, SharePredicate::All, Canned(500, "{}"));

    let mutation = Mutation::SetParameters(Parameters {
        name: "Zezima".to_string(),
        recommended: true,
        ..Parameters::default()
    });
    b.store.apply_remote(mutation.clone());
    let once = b.store.state().clone();
    b.store.apply_remote(mutation);

    assert_eq!(b.store.state(), &once);
}

#[test]
fn parameters_persist_for_next_session() {
    let root = TempDir::new().unwrap();
    {
        let mut first = window(&root, SharePredicate::All, Canned(500, "{}"));
        first
            .store
            .update_field(FieldUpdate::Name("Zezima".to_string()));
        first.store.update_field(FieldUpdate::Recommended(true));
    }

    let second = window(&root, SharePredicate::All, Canned(500, "{}"));
    assert_eq!(second.store.parameters().name, "Zezima");
    assert!(second.store.parameters().recommended);
    assert!(matches!(second.store.results().outcome(), RequestOutcome::Idle));
}
