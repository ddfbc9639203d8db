//! Application core facade tying the store, rule engine and rule browser
//! together for the UI host

use std::collections::HashMap;

use uuid::Uuid;

use crate::core::config::CoreConfig;
use crate::core::error::{CoreError, Result};
use crate::core::state::{AppState, Rule, Snapshot};
use crate::core::template;
use crate::engine::browser::RuleBrowser;
use crate::engine::surface::TextSurface;
use crate::engine::{PendingReplacement, RuleEngine, Substitution};
use crate::store::archive;
use crate::store::storage::{JsonFileStorage, StateStorage};
use crate::store::{ModifyOptions, Store, StoreObserver};

/// The core the UI host embeds: one store, one rule engine, one browser.
///
/// Everything the surrounding application does (editor wiring, modals,
/// sidebar, toasts) goes through this object's narrow API.
pub struct EscribaCore {
    config: CoreConfig,
    store: Store,
    engine: RuleEngine,
    browser: RuleBrowser,
}

impl EscribaCore {
    /// Create a core instance backed by the platform data directory.
    pub fn new() -> Result<Self> {
        // Load config or use defaults
        let config = CoreConfig::load().unwrap_or_default();

        let path = config
            .state_file
            .clone()
            .or_else(CoreConfig::default_state_path)
            .ok_or_else(|| {
                CoreError::Storage(anyhow::anyhow!("Could not determine data directory"))
            })?;

        Self::with_storage(config, Box::new(JsonFileStorage::new(path)))
    }

    /// Create a core instance over a caller-supplied storage backend.
    pub fn with_storage(config: CoreConfig, storage: Box<dyn StateStorage>) -> Result<Self> {
        let store = Store::open(storage, &config)?;
        let engine = RuleEngine::new(config.undo_toast());

        Ok(Self {
            config,
            store,
            engine,
            browser: RuleBrowser::new(),
        })
    }

    /// Read-only view of the live state.
    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    /// The core configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Register a collaborator for change/backup notifications.
    pub fn add_observer(&mut self, observer: Box<dyn StoreObserver>) {
        self.store.add_observer(observer);
    }

    // --- typing surface ---

    /// Forward a text-insertion event from the document surface.
    ///
    /// Returns the toast payload when a shortcut was expanded.
    pub fn handle_text_inserted(
        &mut self,
        inserted: char,
        preceding: &str,
        surface: &mut dyn TextSurface,
    ) -> Option<Substitution> {
        self.engine.on_text_inserted(
            &self.store.state().replacements,
            inserted,
            preceding,
            surface,
        )
    }

    /// Undo the most recent substitution, if its toast is still alive.
    pub fn undo_substitution(&mut self, surface: &mut dyn TextSurface) -> bool {
        self.engine.undo_last(surface)
    }

    /// The substitution whose undo toast is still alive, if any.
    pub fn pending_substitution(&self) -> Option<&PendingReplacement> {
        self.engine.pending()
    }

    /// Dismiss the undo toast without touching the document.
    pub fn dismiss_toast(&mut self) {
        self.engine.dismiss();
    }

    // --- replacement rules ---

    /// Insert an empty, immediately editable rule at the head of the list.
    pub fn add_rule(&mut self) -> Result<()> {
        self.store
            .modify(ModifyOptions::default(), |s| s.add_rule())
    }

    /// Save edits to the rule at `index`. An emptied shortcut keeps the
    /// rule in the list but inert.
    pub fn update_rule(&mut self, index: usize, find: &str, replace: &str) -> Result<bool> {
        self.store
            .modify(ModifyOptions::default(), |s| s.update_rule(index, find, replace))
    }

    /// Delete the rule at `index`.
    pub fn delete_rule(&mut self, index: usize) -> Result<bool> {
        self.store
            .modify(ModifyOptions::default(), |s| s.delete_rule(index))
    }

    /// Update the rule search term.
    pub fn search_rules(&mut self, term: impl Into<String>) {
        self.browser.set_term(term);
    }

    /// Jump to a page of the (filtered) rule list.
    pub fn set_rules_page(&mut self, page: usize) {
        self.browser.set_page(page);
    }

    /// The rules visible under the current filter and page, as
    /// `(index, rule)` pairs addressing the full list.
    pub fn visible_rules(&mut self) -> Vec<(usize, &Rule)> {
        self.browser.visible(&self.store.state().replacements)
    }

    /// Number of pages under the current filter.
    pub fn rules_page_count(&self) -> usize {
        self.browser.page_count(&self.store.state().replacements)
    }

    // --- tabs & models ---

    /// Create a tab. The name must be non-empty after trimming.
    pub fn add_tab(&mut self, name: &str) -> Result<Uuid> {
        let name = non_empty(name, "tab name")?;
        self.store
            .modify(ModifyOptions::default(), |s| s.add_tab(name))
    }

    /// Rename a tab. The name must be non-empty after trimming.
    pub fn rename_tab(&mut self, id: Uuid, name: &str) -> Result<bool> {
        let name = non_empty(name, "tab name")?;
        self.store
            .modify(ModifyOptions::default(), |s| s.rename_tab(id, name))
    }

    /// Delete a tab; its models are detached, not deleted.
    pub fn delete_tab(&mut self, id: Uuid) -> Result<bool> {
        self.store
            .modify(ModifyOptions::default(), |s| s.delete_tab(id))
    }

    /// Create a model. The name must be non-empty after trimming.
    pub fn add_model(
        &mut self,
        name: &str,
        content: &str,
        tab_id: Option<Uuid>,
    ) -> Result<Uuid> {
        let name = non_empty(name, "model name")?;
        let content = content.to_string();
        self.store
            .modify(ModifyOptions::default(), |s| s.add_model(name, content, tab_id))
    }

    /// Update a model. The name must be non-empty after trimming.
    pub fn update_model(&mut self, id: Uuid, name: &str, content: &str) -> Result<bool> {
        let name = non_empty(name, "model name")?;
        self.store
            .modify(ModifyOptions::default(), |s| {
                s.update_model(id, &name, content)
            })
    }

    /// Move a model to another tab (or unfile it).
    pub fn move_model(&mut self, id: Uuid, tab_id: Option<Uuid>) -> Result<bool> {
        self.store
            .modify(ModifyOptions::default(), |s| s.move_model(id, tab_id))
    }

    /// Delete a model along with its remembered placeholder values.
    pub fn delete_model(&mut self, id: Uuid) -> Result<bool> {
        self.store
            .modify(ModifyOptions::default(), |s| s.delete_model(id))
    }

    /// Placeholder names in a model's content, in first-appearance order.
    pub fn model_variables(&self, id: Uuid) -> Option<Vec<String>> {
        self.store
            .state()
            .model(id)
            .map(|m| template::extract_variables(&m.content))
    }

    /// Render a model's content for insertion, filling placeholders from
    /// `values` first and the model's remembered values second.
    pub fn render_model(&self, id: Uuid, values: &HashMap<String, String>) -> Option<String> {
        let state = self.store.state();
        let model = state.model(id)?;

        let mut merged = state.variable_memory.get(&id).cloned().unwrap_or_default();
        merged.extend(values.clone());
        Some(template::render(&model.content, &merged))
    }

    /// Remember filled-in placeholder values so the next insertion of the
    /// same model pre-fills them.
    pub fn remember_variables(
        &mut self,
        id: Uuid,
        values: HashMap<String, String>,
    ) -> Result<()> {
        self.store
            .modify(ModifyOptions::default(), |s| s.remember_variables(id, values))
    }

    // --- backups ---

    /// Fire the pending debounced backup if its quiet period has elapsed.
    /// The host loop calls this periodically.
    pub fn tick(&mut self) -> Result<bool> {
        self.store.poll_backup()
    }

    /// Time left until the armed backup fires; `None` when nothing is armed.
    pub fn backup_due_in(&self) -> Option<std::time::Duration> {
        self.store.backup_due_in()
    }

    /// The snapshot history, most recent first.
    pub fn history(&self) -> &[Snapshot] {
        self.store.history()
    }

    /// Swap a historical snapshot back in as the live state.
    ///
    /// The live backup history is kept as is; restoring is not itself a
    /// history event.
    pub fn restore_backup(&mut self, timestamp: &str) -> Result<()> {
        let restored = self.store.restore_from_history(timestamp)?;
        self.store.modify(ModifyOptions::quiet(), |s| {
            let history = std::mem::take(&mut s.backup_history);
            *s = restored;
            s.backup_history = history;
        })
    }

    /// Serialize the full state to a downloadable artifact.
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.store.export_snapshot()
    }

    /// Suggested file name for an export taken now.
    pub fn export_file_name(&self) -> String {
        archive::export_file_name(chrono::Utc::now())
    }

    /// Replace the live state with a validated imported artifact.
    ///
    /// The payload is fully validated before anything is touched; on any
    /// error the live state is unchanged.
    pub fn import_snapshot(&mut self, bytes: &[u8], file_name: &str) -> Result<()> {
        let imported = archive::parse_import(bytes, file_name)?;
        self.store
            .modify(ModifyOptions::quiet(), |s| *s = imported)
    }
}

/// Trim `value`, rejecting empties with a [`CoreError::Validation`] naming
/// `what`.
fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}
