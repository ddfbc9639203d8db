//! Escriba - auto-text and template engine core for legal document drafting
//!
//! The two subsystems with real engineering live here: the keystroke-driven
//! auto-replacement engine and the transactional state store with debounced,
//! bounded, crash-safe snapshotting. The surrounding editor UI embeds
//! [`EscribaCore`] and drives it through its narrow API.

mod app;
pub mod core;
pub mod engine;
pub mod store;

pub use crate::app::EscribaCore;
pub use crate::core::config::CoreConfig;
pub use crate::core::error::{CoreError, Result};
pub use crate::core::state::{AppState, Model, Rule, Snapshot, Tab, MAX_HISTORY_ITEMS};
pub use crate::engine::browser::{RuleBrowser, PAGE_SIZE};
pub use crate::engine::surface::TextSurface;
pub use crate::engine::{PendingReplacement, RuleEngine, Substitution, DELIMITERS, NBSP};
pub use crate::store::storage::{JsonFileStorage, MemoryStorage, StateStorage};
pub use crate::store::{ModifyOptions, Store, StoreObserver};
