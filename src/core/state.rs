//! Application state: tabs, models, replacement rules and backup snapshots

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{CoreError, Result};

/// Maximum number of snapshots kept in the backup history.
pub const MAX_HISTORY_ITEMS: usize = 5;

/// A find/replace rule driving auto-substitution.
///
/// `find` is matched case-sensitively against the text before the cursor.
/// Duplicate `find` values are allowed; the first rule in list order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Typed shortcut, e.g. `*id`
    pub find: String,
    /// Expansion text, e.g. `Identidade`
    pub replace: String,
}

impl Rule {
    /// Create a new rule
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// Whether this rule can ever fire. A rule edited down to an empty
    /// shortcut is kept in the list but never matches.
    pub fn is_active(&self) -> bool {
        !self.find.is_empty()
    }
}

/// A folder grouping text models in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: Uuid,
    pub name: String,
    /// Optional accent color (hex string picked by the UI)
    pub color: Option<String>,
}

/// A reusable text template, optionally containing `{{variable}}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    /// Tab this model lives under; `None` for unfiled models
    pub tab_id: Option<Uuid>,
}

/// A timestamped, structurally independent copy of the application state.
///
/// `data` is the serialized form of the state at capture time with its own
/// `backup_history` cleared, so snapshots never nest earlier snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// ISO-8601 capture instant
    pub timestamp: String,
    /// Serialized [`AppState`]
    pub data: serde_json::Value,
}

impl Snapshot {
    /// Capture the given state into a new snapshot.
    pub fn capture(state: &AppState, timestamp: String) -> Self {
        let mut copy = state.clone();
        copy.backup_history.clear();
        let data = serde_json::to_value(&copy)
            .expect("application state always serializes to JSON");
        Self { timestamp, data }
    }

    /// Materialize the snapshot back into application state.
    ///
    /// Fails with [`CoreError::CorruptData`] if the stored data no longer
    /// parses into a structurally valid state.
    pub fn restore(&self) -> Result<AppState> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| CoreError::corrupt(e.to_string()))
    }
}

/// The single root aggregate owned by the [`Store`](crate::store::Store).
///
/// All mutation goes through `Store::modify`; everything else holds this
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Folders, in presentation order
    pub tabs: Vec<Tab>,
    /// Text models, in presentation order
    pub models: Vec<Model>,
    /// Auto-replacement rules, in match-priority order
    pub replacements: Vec<Rule>,
    /// Remembered placeholder values per model
    #[serde(default)]
    pub variable_memory: HashMap<Uuid, HashMap<String, String>>,
    /// When the state was last captured into the backup history
    #[serde(default)]
    pub last_backup_timestamp: Option<String>,
    /// Historical snapshots, most recent first
    #[serde(default)]
    pub backup_history: Vec<Snapshot>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            models: Vec::new(),
            replacements: Vec::new(),
            variable_memory: HashMap::new(),
            last_backup_timestamp: None,
            backup_history: Vec::new(),
        }
    }
}

impl AppState {
    // --- replacement rules ---

    /// Insert an empty rule at the head of the list so the UI can edit it
    /// in place.
    pub fn add_rule(&mut self) {
        self.replacements.insert(0, Rule::default());
    }

    /// Overwrite the rule at `index` with trimmed values.
    ///
    /// A rule trimmed down to an empty `find` is retained but inert (it
    /// never matches). Returns `false` if the index is out of range.
    pub fn update_rule(&mut self, index: usize, find: &str, replace: &str) -> bool {
        match self.replacements.get_mut(index) {
            Some(rule) => {
                rule.find = find.trim().to_string();
                rule.replace = replace.trim().to_string();
                true
            }
            None => false,
        }
    }

    /// Remove the rule at `index`. Returns `false` if out of range.
    pub fn delete_rule(&mut self, index: usize) -> bool {
        if index < self.replacements.len() {
            self.replacements.remove(index);
            true
        } else {
            false
        }
    }

    // --- tabs ---

    /// Append a new tab and return its id.
    pub fn add_tab(&mut self, name: impl Into<String>) -> Uuid {
        let tab = Tab {
            id: Uuid::new_v4(),
            name: name.into(),
            color: None,
        };
        let id = tab.id;
        self.tabs.push(tab);
        id
    }

    /// Rename an existing tab. Returns `false` if the id is unknown.
    pub fn rename_tab(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        match self.tabs.iter_mut().find(|t| t.id == id) {
            Some(tab) => {
                tab.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Delete a tab, detaching its models instead of deleting them.
    pub fn delete_tab(&mut self, id: Uuid) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|t| t.id != id);
        if self.tabs.len() == before {
            return false;
        }
        for model in self.models.iter_mut().filter(|m| m.tab_id == Some(id)) {
            model.tab_id = None;
        }
        true
    }

    // --- models ---

    /// Append a new model and return its id.
    pub fn add_model(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
        tab_id: Option<Uuid>,
    ) -> Uuid {
        let model = Model {
            id: Uuid::new_v4(),
            name: name.into(),
            content: content.into(),
            tab_id,
        };
        let id = model.id;
        self.models.push(model);
        id
    }

    /// Update a model's name and content. Returns `false` if the id is unknown.
    pub fn update_model(&mut self, id: Uuid, name: &str, content: &str) -> bool {
        match self.models.iter_mut().find(|m| m.id == id) {
            Some(model) => {
                model.name = name.to_string();
                model.content = content.to_string();
                true
            }
            None => false,
        }
    }

    /// Move a model to another tab (or unfile it with `None`).
    pub fn move_model(&mut self, id: Uuid, tab_id: Option<Uuid>) -> bool {
        match self.models.iter_mut().find(|m| m.id == id) {
            Some(model) => {
                model.tab_id = tab_id;
                true
            }
            None => false,
        }
    }

    /// Delete a model along with its remembered placeholder values.
    pub fn delete_model(&mut self, id: Uuid) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m.id != id);
        self.variable_memory.remove(&id);
        self.models.len() != before
    }

    /// Merge filled-in placeholder values for a model so the next insertion
    /// pre-fills them.
    pub fn remember_variables(&mut self, model_id: Uuid, values: HashMap<String, String>) {
        self.variable_memory
            .entry(model_id)
            .or_default()
            .extend(values);
    }

    /// Look up a model by id.
    pub fn model(&self, id: Uuid) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up a tab by id.
    pub fn tab(&self, id: Uuid) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }
}
