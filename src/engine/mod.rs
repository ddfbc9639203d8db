//! Live auto-replacement engine
//!
//! Watches the typing stream for a completed "shortcut + delimiter" event,
//! substitutes the matching rule's expansion atomically, and keeps just
//! enough transient state to undo the single most recent substitution.

pub mod browser;
pub mod surface;

use std::time::{Duration, Instant};

use crate::core::state::Rule;
use surface::TextSurface;

/// Characters that complete a typed shortcut.
pub const DELIMITERS: [char; 2] = [' ', '.'];

/// Inserted after every expansion so the caret lands past the replacement.
pub const NBSP: char = '\u{a0}';

/// Payload for the transient undo toast shown after a substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub find: String,
    pub replace: String,
}

/// The single most recent substitution, kept until it is undone, expires,
/// or the next substitution overwrites it. Never persisted.
#[derive(Debug, Clone)]
pub struct PendingReplacement {
    pub find: String,
    pub replace: String,
    pub trigger: char,
    offset: usize,
    expires_at: Instant,
}

/// Keystroke-driven find/replace engine.
///
/// The engine holds no rules of its own; the caller passes the live rule
/// list (read from the store) on every event, so edits to the rules take
/// effect immediately.
pub struct RuleEngine {
    pending: Option<PendingReplacement>,
    undo_window: Duration,
}

impl RuleEngine {
    /// Engine whose undo toast stays actionable for `undo_window`.
    pub fn new(undo_window: Duration) -> Self {
        Self {
            pending: None,
            undo_window,
        }
    }

    /// Handle one text-insertion event.
    ///
    /// The host has already materialized `inserted` into the run right
    /// after `preceding` (the text before the insertion point). If the
    /// character is a delimiter and `preceding` ends with some rule's
    /// shortcut, the span covering `find + delimiter` is replaced with
    /// `replace` plus a non-breaking space. First match in list order wins.
    ///
    /// Returns the toast payload when a substitution happened.
    pub fn on_text_inserted(
        &mut self,
        rules: &[Rule],
        inserted: char,
        preceding: &str,
        surface: &mut dyn TextSurface,
    ) -> Option<Substitution> {
        if !DELIMITERS.contains(&inserted) {
            return None;
        }

        let rule = rules
            .iter()
            .filter(|r| r.is_active())
            .find(|r| preceding.ends_with(r.find.as_str()))?;

        let start = preceding.len() - rule.find.len();
        surface.delete_range(start, preceding.len() + inserted.len_utf8());
        let mut expansion = rule.replace.clone();
        expansion.push(NBSP);
        surface.insert_text(start, &expansion);

        tracing::debug!("Replaced `{}{inserted}` with `{}`", rule.find, rule.replace);

        // Overwriting the previous pending entry forfeits its undo.
        self.pending = Some(PendingReplacement {
            find: rule.find.clone(),
            replace: rule.replace.clone(),
            trigger: inserted,
            offset: start,
            expires_at: Instant::now() + self.undo_window,
        });

        Some(Substitution {
            find: rule.find.clone(),
            replace: rule.replace.clone(),
        })
    }

    /// The substitution whose undo toast is still alive, if any.
    pub fn pending(&self) -> Option<&PendingReplacement> {
        self.pending
            .as_ref()
            .filter(|p| Instant::now() < p.expires_at)
    }

    /// Undo the most recent substitution, restoring `find + delimiter`.
    ///
    /// Only the single most recent substitution can be undone, and only
    /// while its toast is alive. Returns `false` when there is nothing
    /// (or nothing still eligible) to undo.
    pub fn undo_last(&mut self, surface: &mut dyn TextSurface) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if Instant::now() >= pending.expires_at {
            return false;
        }

        let inserted_len = pending.replace.len() + NBSP.len_utf8();
        surface.delete_range(pending.offset, pending.offset + inserted_len);
        let mut original = pending.find.clone();
        original.push(pending.trigger);
        surface.insert_text(pending.offset, &original);

        tracing::debug!("Undid replacement of `{}`", pending.find);
        true
    }

    /// Drop the pending substitution without touching the document
    /// (toast dismissed).
    pub fn dismiss(&mut self) {
        self.pending = None;
    }
}
