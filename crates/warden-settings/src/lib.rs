//! # warden-settings
//!
//! Configuration management with layered sources for the Warden admission
//! controller.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`WardenSettings::default()`]
//! 2. **User file** — `~/.warden/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `WARDEN_*` overrides (highest priority)
//!
//! The global singleton is reloadable: when new values are written to disk,
//! [`reload_settings_from_path`] swaps the cached value so all subsequent
//! [`get_settings`] calls return fresh data.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::path::Path;
use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// Uses `RwLock<Option<Arc<WardenSettings>>>` instead of `OnceLock` so the
/// cached value can be swapped after a reload. Reads are cheap (shared lock
/// + `Arc::clone`), writes only happen on reload which is rare.
static SETTINGS: RwLock<Option<Arc<WardenSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.warden/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
///
/// Returns an `Arc` so callers can hold a consistent snapshot even if
/// another thread reloads settings concurrently.
pub fn get_settings() -> Arc<WardenSettings> {
    // Fast path: read lock
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref s) = *guard {
            return Arc::clone(s);
        }
    }

    // Slow path: first access, take write lock
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Double-check after acquiring write lock (another thread may have initialized)
    if let Some(ref s) = *guard {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            WardenSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings. Useful for tests and startup
/// paths where the settings are already known.
pub fn init_settings(settings: WardenSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

/// Reload settings from a specific file path.
///
/// Reads the file, deep-merges over defaults, applies env overrides, and
/// atomically swaps the global cache. All subsequent [`get_settings`] calls
/// return the new values.
pub fn reload_settings_from_path(path: &Path) {
    let new = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to reload settings, falling back to defaults");
            WardenSettings::default()
        }
    });
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(new);
    tracing::info!(?path, "settings reloaded from disk");
}

/// Reset the global settings cache (test-only).
///
/// Clears the cached value so the next [`get_settings`] call re-loads from
/// disk. This is needed because tests share a process and the global is
/// `static`.
#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that mutate the global SETTINGS static must hold this lock
    /// to avoid racing with each other (Rust runs tests in parallel threads).
    static SETTINGS_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn re_exports_work() {
        let _settings = WardenSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }

    #[test]
    fn init_settings_sets_custom_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut custom = WardenSettings::default();
        custom.limits.max_active_requests = 77;
        init_settings(custom);
        let s = get_settings();
        assert_eq!(s.limits.max_active_requests, 77);
        reset_settings();
    }

    #[test]
    fn init_settings_replaces_previous() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut first = WardenSettings::default();
        first.limits.max_model_invocations = 1;
        init_settings(first);
        assert_eq!(get_settings().limits.max_model_invocations, 1);

        let mut second = WardenSettings::default();
        second.limits.max_model_invocations = 8;
        init_settings(second);
        assert_eq!(get_settings().limits.max_model_invocations, 8);
        reset_settings();
    }

    #[test]
    fn reload_settings_from_path_updates_cached_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();

        init_settings(WardenSettings::default());
        assert_eq!(get_settings().admission.default_max_wait_ms, 30_000);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"admission": {"defaultMaxWaitMs": 1000}}"#).unwrap();

        reload_settings_from_path(&path);

        let updated = get_settings();
        assert_eq!(updated.admission.default_max_wait_ms, 1000);
        // Other defaults should be preserved (deep merge)
        assert_eq!(updated.limits.max_active_requests, 10);

        reset_settings();
    }

    #[test]
    fn reload_from_nonexistent_path_falls_back_to_defaults() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();

        let mut custom = WardenSettings::default();
        custom.limits.max_active_requests = 3;
        init_settings(custom);
        assert_eq!(get_settings().limits.max_active_requests, 3);

        // Reload from a path that doesn't exist — should get defaults (not keep 3)
        reload_settings_from_path(Path::new("/nonexistent/settings.json"));

        let s = get_settings();
        assert_eq!(
            s.limits.max_active_requests, 10,
            "should fall back to defaults when file missing"
        );

        reset_settings();
    }

    #[test]
    fn get_settings_returns_arc_for_snapshot_isolation() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        init_settings(WardenSettings::default());

        let snapshot = get_settings();
        assert_eq!(snapshot.limits.max_active_requests, 10);

        let mut new = WardenSettings::default();
        new.limits.max_active_requests = 42;
        init_settings(new);

        // Snapshot should still see old value (Arc isolation)
        assert_eq!(snapshot.limits.max_active_requests, 10);
        // New get should see new value
        assert_eq!(get_settings().limits.max_active_requests, 42);

        reset_settings();
    }
}
