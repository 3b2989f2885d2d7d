use std::fs;

use super::*;
use crate::source::SourceId;

fn neko() -> Entry {
    Entry::new("猫", "ねこ")
}

fn inu() -> Entry {
    Entry::new("犬", "いぬ")
}

// --- RevisionList ---

#[test]
fn test_add_is_idempotent() {
    let mut list = RevisionList::new();
    assert!(list.add(neko()).unwrap());
    assert!(!list.add(neko()).unwrap());
    assert_eq!(list.len(), 1);
}

#[test]
fn test_add_rejects_invalid_entry() {
    let mut list = RevisionList::new();
    assert!(matches!(
        list.add(Entry::new("", "")),
        Err(crate::CoreError::InvalidEntry)
    ));
    assert!(list.is_empty());
}

#[test]
fn test_insertion_order_kept() {
    let mut list = RevisionList::new();
    list.add(inu()).unwrap();
    list.add(neko()).unwrap();
    list.add(inu()).unwrap();
    assert_eq!(list.all(), vec![inu(), neko()]);
}

#[test]
fn test_remove_by_value() {
    let mut list = RevisionList::from_entries(vec![neko(), inu()]);
    assert!(list.remove(&Entry::new("猫", "ねこ")));
    assert!(!list.contains(&neko()));
    assert!(!list.remove(&neko()));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_from_entries_dedups_and_filters() {
    let list = RevisionList::from_entries(vec![neko(), Entry::new("", ""), neko(), inu()]);
    assert_eq!(list.all(), vec![neko(), inu()]);
}

// --- decode / encode ---

#[test]
fn test_decode_legacy_array() {
    let state = decode(r#"[{"reading":"あ","word":""}]"#).unwrap();
    assert_eq!(state.revisions, vec![Entry::new("", "あ")]);
    assert_eq!(state.active_source, SourceId::Jmdict);
}

#[test]
fn test_decode_document() {
    let text = r#"{
        "revisions": [{"reading": "ねこ", "word": "猫"}],
        "current_source": "JLPT2"
    }"#;
    let state = decode(text).unwrap();
    assert_eq!(state.revisions, vec![neko()]);
    assert_eq!(state.active_source, SourceId::Jlpt(2));
}

#[test]
fn test_decode_document_missing_fields() {
    let state = decode("{}").unwrap();
    assert_eq!(state, PersistedState::default());

    let state = decode(r#"{"current_source":"JLPT5"}"#).unwrap();
    assert!(state.revisions.is_empty());
    assert_eq!(state.active_source, SourceId::Jlpt(5));
}

#[test]
fn test_decode_unknown_source_falls_back() {
    let state = decode(r#"{"revisions":[],"current_source":"Wiktionary"}"#).unwrap();
    assert_eq!(state.active_source, SourceId::Jmdict);
}

#[test]
fn test_decode_drops_invalid_entries() {
    let state = decode(r#"[{"reading":"","word":""},{"reading":"いぬ","word":"犬"}]"#).unwrap();
    assert_eq!(state.revisions, vec![inu()]);
}

#[test]
fn test_decode_rejects_other_shapes() {
    assert!(decode("not json").is_err());
    assert!(decode("42").is_err());
    assert!(decode(r#""JMdict""#).is_err());
    assert!(decode(r#"{"revisions": 3}"#).is_err());
}

#[test]
fn test_encode_field_names_and_kana() {
    let state = PersistedState {
        revisions: vec![neko()],
        active_source: SourceId::Jlpt(1),
    };
    let text = encode(&state).unwrap();
    assert!(text.contains("\"current_source\": \"JLPT1\""));
    assert!(text.contains("\"reading\": \"ねこ\""));
    assert!(text.contains("\"word\": \"猫\""));
}

// --- file load / save ---

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join(DEFAULT_FILE_NAME);
    let state = PersistedState {
        revisions: vec![neko(), inu(), Entry::new("", "あ")],
        active_source: SourceId::Jlpt(4),
    };
    save(&path, &state).unwrap();
    assert_eq!(load(&path), state);
    assert!(!tmp_path(&path).exists());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        load(&dir.path().join("absent.json")),
        PersistedState::default()
    );
}

#[test]
fn test_load_legacy_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    fs::write(&path, r#"[{"reading":"あ","word":""}]"#).unwrap();
    let state = load(&path);
    assert_eq!(state.revisions, vec![Entry::new("", "あ")]);
    assert_eq!(state.active_source, SourceId::Jmdict);
}

#[test]
fn test_load_corrupt_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    fs::write(&path, "{\"revisions\": [").unwrap();
    assert_eq!(load(&path), PersistedState::default());
}

#[test]
fn test_save_replaces_previous_copy() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join(DEFAULT_FILE_NAME));
    store
        .save(&PersistedState {
            revisions: vec![neko()],
            active_source: SourceId::Jmdict,
        })
        .unwrap();
    store
        .save(&PersistedState {
            revisions: vec![inu()],
            active_source: SourceId::Jlpt(3),
        })
        .unwrap();
    let state = store.load();
    assert_eq!(state.revisions, vec![inu()]);
    assert_eq!(state.active_source, SourceId::Jlpt(3));
}

#[test]
fn test_stale_tmp_file_does_not_affect_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    let state = PersistedState {
        revisions: vec![neko()],
        active_source: SourceId::Jlpt(2),
    };
    save(&path, &state).unwrap();
    // A crash between write and rename leaves a partial temp file behind.
    fs::write(tmp_path(&path), "{\"revis").unwrap();
    assert_eq!(load(&path), state);
}

#[test]
fn test_tmp_path_appends_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    assert_eq!(tmp_path(&path), dir.path().join("revisions.json.tmp"));

    // Documents sharing a stem must not share a temp file.
    let other = dir.path().join("revisions.toml");
    assert_ne!(tmp_path(&path), tmp_path(&other));
    fs::write(tmp_path(&other), "unrelated").unwrap();
    save(&path, &PersistedState::default()).unwrap();
    assert_eq!(fs::read_to_string(tmp_path(&other)).unwrap(), "unrelated");
    assert!(!tmp_path(&path).exists());
}

#[test]
fn test_load_existing_treats_corrupt_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    assert_eq!(load_existing(&path), None);

    fs::write(&path, "{\"revisions\": [").unwrap();
    assert_eq!(load_existing(&path), None);

    let state = PersistedState {
        revisions: vec![neko()],
        active_source: SourceId::Jlpt(1),
    };
    save(&path, &state).unwrap();
    assert_eq!(load_existing(&path), Some(state));
}

#[test]
fn test_memory_store_shares_state() {
    let store = MemoryStore::new();
    let handle = store.clone();
    store
        .save(&PersistedState {
            revisions: vec![neko()],
            active_source: SourceId::Jlpt(5),
        })
        .unwrap();
    assert_eq!(handle.save_count(), 1);
    assert_eq!(handle.state().revisions, vec![neko()]);
}
