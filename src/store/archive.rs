//! Import/export of backup artifacts
//!
//! Artifacts are the same JSON shape as the durable key. Imports are fully
//! validated before anything touches the live state; an artifact file name
//! may carry a `YYYYMMDD_HHMM` timestamp used to backfill the last-backup
//! indicator when the embedded state lacks one.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::core::error::{CoreError, Result};
use crate::core::state::AppState;

/// Fields an artifact must carry to be a valid state export.
const REQUIRED_FIELDS: [&str; 3] = ["tabs", "models", "replacements"];

/// Suggested file name for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("escriba_backup_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Parse and validate an imported artifact.
///
/// The returned state is for the caller to install via `modify`; the live
/// state is untouched on any error.
pub fn parse_import(bytes: &[u8], file_name: &str) -> Result<AppState> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::corrupt(format!("not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| CoreError::corrupt("payload is not a JSON object"))?;
    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(CoreError::corrupt(format!("missing field `{field}`")));
        }
    }

    let mut state: AppState = serde_json::from_value(value)
        .map_err(|e| CoreError::corrupt(e.to_string()))?;

    if state.last_backup_timestamp.is_none() {
        state.last_backup_timestamp = timestamp_from_file_name(file_name);
    }

    tracing::info!(
        "Imported backup artifact `{file_name}`: {} tabs, {} models, {} rules",
        state.tabs.len(),
        state.models.len(),
        state.replacements.len()
    );
    Ok(state)
}

/// Extract a `YYYYMMDD_HHMM` stamp embedded in an artifact file name.
fn timestamp_from_file_name(file_name: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r"(\d{8}_\d{4})").unwrap();
    let stamp = re.captures(file_name)?.get(1)?.as_str();
    let parsed = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M").ok()?;
    Some(
        parsed
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn export_file_name_embeds_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(export_file_name(now), "escriba_backup_20260314_150926.json");
    }

    #[test]
    fn import_round_trips_an_export() {
        let mut state = AppState::default();
        state.add_tab("Contratos");
        let bytes = serde_json::to_vec(&state).unwrap();

        let imported = parse_import(&bytes, "escriba_backup_20260314_150926.json").unwrap();
        assert_eq!(imported.tabs.len(), 1);
    }

    #[test]
    fn import_rejects_missing_tabs() {
        let payload = br#"{"models": [], "replacements": []}"#;
        let err = parse_import(payload, "backup.json").unwrap_err();
        assert!(matches!(err, CoreError::CorruptData { .. }));
    }

    #[test]
    fn import_rejects_malformed_json() {
        let err = parse_import(b"not json at all", "backup.json").unwrap_err();
        assert!(matches!(err, CoreError::CorruptData { .. }));
    }

    #[test]
    fn file_name_timestamp_backfills_indicator() {
        let state = AppState::default();
        let bytes = serde_json::to_vec(&state).unwrap();

        let imported = parse_import(&bytes, "escriba_backup_20251201_0830.json").unwrap();
        assert_eq!(
            imported.last_backup_timestamp.as_deref(),
            Some("2025-12-01T08:30:00Z")
        );

        let imported = parse_import(&bytes, "no-stamp.json").unwrap();
        assert_eq!(imported.last_backup_timestamp, None);
    }

    #[test]
    fn embedded_timestamp_wins_over_file_name() {
        let state = AppState {
            last_backup_timestamp: Some("2026-01-01T00:00:00Z".into()),
            ..AppState::default()
        };
        let bytes = serde_json::to_vec(&state).unwrap();

        let imported = parse_import(&bytes, "escriba_backup_20251201_0830.json").unwrap();
        assert_eq!(
            imported.last_backup_timestamp.as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
    }
}
