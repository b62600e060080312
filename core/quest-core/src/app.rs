//! Application wiring.
//!
//! [`App::bootstrap`] builds every service exactly once: the store (with its
//! persisted parameters and persistence subscriber), the cross-window sharer,
//! the path finder and the quest loader. Consumers receive the `App` or its
//! parts; nothing is reachable through globals.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::parameters::{FileSlot, ParameterStore};
use crate::path_finder::PathFinder;
use crate::quests::QuestLoader;
use crate::storage::StorageConfig;
use crate::store::AppStore;
use crate::sync::MutationSharer;
use crate::transport::{HttpTransport, PathTransport};

pub struct App {
    pub storage: StorageConfig,
    pub config: ClientConfig,
    pub store: AppStore,
    pub path_finder: PathFinder,
    pub quest_loader: QuestLoader,
}

impl App {
    /// Production wiring over HTTP.
    ///
    /// Fails if the API URL is invalid, the HTTP client cannot be built, or no
    /// sync strategy can be opened.
    pub fn bootstrap(storage: StorageConfig, config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
        Self::with_transport(storage, config, transport)
    }

    pub fn with_transport(
        storage: StorageConfig,
        config: ClientConfig,
        transport: Arc<dyn PathTransport>,
    ) -> Result<Self> {
        storage.ensure_dirs()?;
        let endpoints = config.endpoints()?;

        let parameters = ParameterStore::new(FileSlot::new(storage.parameters_file()));
        let mut store = AppStore::with_parameter_store(parameters);

        let sharer = MutationSharer::open(config.sync_strategy, config.share.clone(), &storage)?;
        store.attach_sharer(sharer);

        tracing::debug!(
            api = %endpoints.path,
            root = %storage.root().display(),
            "IronQuest core ready"
        );

        Ok(Self {
            path_finder: PathFinder::new(Arc::clone(&transport), endpoints.path),
            quest_loader: QuestLoader::new(transport, endpoints.quests),
            storage,
            config,
            store,
        })
    }

    pub fn find_path(&mut self) {
        self.path_finder.find_path(&mut self.store);
    }

    pub fn load_quests(&mut self) {
        self.quest_loader.load_quests(&mut self.store);
    }

    /// Applies pending mutations from sibling windows.
    pub fn sync(&mut self) -> usize {
        self.store.sync()
    }
}
