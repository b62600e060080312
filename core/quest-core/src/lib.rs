//! # quest-core
//!
//! Core library for IronQuest, the client side of the quest path finder.
//! Shared by the overlay windows and the `ironquest` CLI.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. The path request is the only
//!   blocking call, and it can be split into `begin`/`complete` halves.
//! - **Single writer per window**: `AppStore` is not thread-safe; every state
//!   change is a [`Mutation`] committed through it.
//! - **Graceful degradation**: Missing or corrupt persisted parameters load as
//!   defaults, never as errors.
//! - **No globals**: [`App::bootstrap`] builds each service once and hands it
//!   to its consumers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quest_core::{App, ClientConfig, StorageConfig};
//!
//! let storage = StorageConfig::from_env()?;
//! let config = quest_core::load_client_config(&storage);
//! let mut app = App::bootstrap(storage, config)?;
//! app.find_path();
//! println!("{:?}", app.store.results().outcome());
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod mutation;
pub mod outcome;
pub mod parameters;
pub mod path_finder;
pub mod quests;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;

pub use app::App;
pub use config::{load_client_config, save_client_config, ClientConfig, Endpoints};
pub use error::{QuestError, Result};
pub use host::{Controller, HostEvent, HostReply, OverlayHost, WindowName, WindowState};
pub use mutation::{AppState, Mutation};
pub use outcome::{ErrorInfo, QuestList, RequestOutcome, ResultState};
pub use parameters::{FieldUpdate, FileSlot, MemorySlot, ParameterSlot, ParameterStore, Parameters};
pub use path_finder::{PathFinder, PendingRequest};
pub use quests::QuestLoader;
pub use storage::StorageConfig;
pub use store::{AppStore, Subscriber};
pub use sync::{
    select_strategy, HubChannel, JournalStrategy, MutationSharer, SharePredicate, StrategyKind,
    SyncStrategy,
};
pub use transport::{ApiResponse, HttpTransport, PathTransport, TransportError};
pub use types::*;
