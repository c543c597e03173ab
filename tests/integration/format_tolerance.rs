//! Integration tests for wrapped, flat, and mixed document formats

use super::test_utils::{sample, AppSettings, Theme};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use vellum::codec::{Codec, JsonCodec};

fn merge_text(text: &str) -> AppSettings {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, text).unwrap();

    let mut merged = AppSettings::default();
    let outcome = JsonCodec::new().merge_into(&path, &mut merged);
    assert!(!outcome.parse_error);
    merged
}

/// Test that a flat legacy document merges exactly like the wrapped form
#[test]
fn test_flat_and_wrapped_documents_merge_identically() {
    let expected = sample();

    // The wrapped form, produced by the codec itself.
    let dir = TempDir::new().unwrap();
    let wrapped_path = dir.path().join("wrapped.json");
    JsonCodec::new().write(&wrapped_path, &expected).unwrap();
    let wrapped_text = fs::read_to_string(&wrapped_path).unwrap();

    // The same values written flat, the way a legacy file would look.
    let flat_text = json!({
        "theme": "Dark",
        "autosave_minutes": 12,
        "recent_files": ["a.txt", "b.md"],
        "keybinds": {"toggle": "alt+space", "quit": "alt+q"},
        "profiles": [
            {"name": "work", "priority": -1},
            {"name": "home", "priority": 3}
        ],
        "feature_gates": {"beta_search": true, "fast_render": false},
        "scale": 1.25
    })
    .to_string();

    assert_eq!(merge_text(&wrapped_text), expected);
    assert_eq!(merge_text(&flat_text), expected);
}

/// Test that one document can mix wrapped and flat entries freely
#[test]
fn test_mixed_wrapping_within_one_document() {
    let text = json!({
        "theme": {"value": "Light", "comment": "hand-edited"},
        "autosave_minutes": 30,
        "recent_files": {"value": ["x.txt"]},
        "keybinds": {
            "toggle": {"value": "f1"},
            "quit": "f2"
        },
        "profiles": [],
        "feature_gates": {},
        "scale": {"value": 2.0}
    })
    .to_string();

    let merged = merge_text(&text);

    assert_eq!(merged.theme, Theme::Light);
    assert_eq!(merged.autosave_minutes, Some(30));
    assert_eq!(merged.recent_files, vec!["x.txt".to_string()]);
    assert_eq!(merged.keybinds.toggle, "f1");
    assert_eq!(merged.keybinds.quit, "f2");
    assert_eq!(merged.scale, 2.0);
}

/// Test that wrappers are accepted at depths the writer never produces
#[test]
fn test_wrappers_accepted_at_any_depth() {
    // Array elements and map values wrapped by hand.
    let text = json!({
        "theme": "System",
        "autosave_minutes": null,
        "recent_files": [{"value": "deep.txt", "comment": "why not"}, "plain.txt"],
        "keybinds": {"toggle": "t", "quit": "q"},
        "profiles": [{"name": {"value": "only"}, "priority": {"value": 9}}],
        "feature_gates": {"beta_search": {"value": true}},
        "scale": 1.0
    })
    .to_string();

    let merged = merge_text(&text);

    assert_eq!(
        merged.recent_files,
        vec!["deep.txt".to_string(), "plain.txt".to_string()]
    );
    assert_eq!(merged.profiles[0].name, "only");
    assert_eq!(merged.profiles[0].priority, 9);
    assert_eq!(merged.feature_gates.get("beta_search"), Some(&true));
    assert_eq!(merged.autosave_minutes, None);
}

/// Test that user maps merely containing a "value" key are left alone
#[test]
fn test_value_key_in_user_data_is_not_a_wrapper() {
    let text = json!({
        "theme": "System",
        "autosave_minutes": 5,
        "recent_files": [],
        "keybinds": {"toggle": "t", "quit": "q"},
        "profiles": [],
        "feature_gates": {"value": true, "beta": false},
        "scale": 1.0
    })
    .to_string();

    let merged = merge_text(&text);

    // Two keys where the second is not "comment": user data, not a wrapper.
    assert_eq!(merged.feature_gates.get("value"), Some(&true));
    assert_eq!(merged.feature_gates.get("beta"), Some(&false));
}
