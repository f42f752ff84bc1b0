use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wordbook::app::App;
use wordbook::error::WordbookError;
use wordbook::model::{Entry, FieldValue};
use wordbook::schema::{Schema, DEFINITION, SYNONYMS, TAGS};
use wordbook::store::fs::FsBackend;
use wordbook::store::{EntryStore, StorageBackend};

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("entries"));
    (dir, backend)
}

fn cat() -> Entry {
    Entry::new("cat")
        .with_field(DEFINITION, FieldValue::text("a small feline"))
        .with_field(TAGS, FieldValue::list(["animal", "pet"]))
        .with_field(SYNONYMS, FieldValue::list(["kitty"]))
}

#[test]
fn test_missing_directory_lists_nothing() {
    let (_dir, backend) = setup();
    assert!(backend.keys().unwrap().is_empty());
    assert!(backend.get_all().unwrap().records.is_empty());
}

#[test]
fn test_set_get_remove() {
    let (_dir, mut backend) = setup();

    backend.set("cat", &cat()).unwrap();
    assert!(backend.record_path("cat").exists());
    assert_eq!(backend.keys().unwrap(), vec!["cat"]);
    assert_eq!(backend.get("cat").unwrap(), cat());

    backend.remove("cat").unwrap();
    assert!(!backend.record_path("cat").exists());
    assert!(matches!(
        backend.get("cat"),
        Err(WordbookError::EntryNotFound(_))
    ));

    // Removing again is fine
    backend.remove("cat").unwrap();
}

#[test]
fn test_record_format_is_flat_json() {
    let (_dir, mut backend) = setup();
    backend.set("cat", &cat()).unwrap();

    let raw = fs::read_to_string(backend.record_path("cat")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        json!({
            "word": "cat",
            "definition": "a small feline",
            "tags": ["animal", "pet"],
            "synonyms": ["kitty"],
        })
    );
}

#[test]
fn test_words_with_special_characters() {
    let (_dir, mut backend) = setup();
    let words = ["ice cream", "a/b", "naïve", "100%"];
    for word in words {
        backend.set(word, &Entry::new(word)).unwrap();
    }

    let mut keys = backend.keys().unwrap();
    keys.sort();
    let mut expected: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    expected.sort();
    assert_eq!(keys, expected);

    assert!(backend
        .root()
        .join("ice%20cream.json")
        .exists());
    assert_eq!(backend.get("a/b").unwrap().word, "a/b");
}

#[test]
fn test_atomic_write_leaves_no_temp_files() {
    let (_dir, mut backend) = setup();
    backend.set("cat", &cat()).unwrap();
    backend.set("cat", &cat().with_field(DEFINITION, FieldValue::text("meow"))).unwrap();

    let names: Vec<String> = fs::read_dir(backend.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cat.json"]);
    assert_eq!(backend.get("cat").unwrap().text(DEFINITION), "meow");
}

#[test]
fn test_stray_files_are_ignored() {
    let (_dir, mut backend) = setup();
    backend.set("cat", &cat()).unwrap();
    fs::write(backend.root().join("notes.txt"), "hello").unwrap();
    fs::write(backend.root().join(".entry-1234.tmp"), "{").unwrap();
    fs::create_dir(backend.root().join("sub.json")).unwrap();

    assert_eq!(backend.keys().unwrap(), vec!["cat"]);
}

#[test]
fn test_hand_named_files_are_read_from_their_own_path() {
    let (_dir, backend) = setup();
    fs::create_dir_all(backend.root()).unwrap();
    fs::write(backend.root().join("ice cream.json"), r#"{"word": "ice cream"}"#).unwrap();
    fs::write(backend.root().join("a%2fb.json"), r#"{"word": "a/b"}"#).unwrap();
    fs::write(backend.root().join("100%.json"), r#"{"word": "100%"}"#).unwrap();

    let store = EntryStore::load(backend, &Schema::builtin());
    assert!(store.load_failures().is_empty());
    let words: Vec<&str> = store.entries().iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["100%", "a/b", "ice cream"]);
    assert!(store.modified_at("ice cream").is_some());
}

#[test]
fn test_rewriting_a_hand_named_file_leaves_one_record() {
    let (_dir, mut backend) = setup();
    fs::create_dir_all(backend.root()).unwrap();
    let literal = backend.root().join("ice cream.json");
    fs::write(&literal, r#"{"word": "ice cream"}"#).unwrap();

    backend
        .set("ice cream", &Entry::new("ice cream").with_field(DEFINITION, FieldValue::text("cold")))
        .unwrap();
    assert!(!literal.exists());
    assert!(backend.record_path("ice cream").exists());
    assert_eq!(backend.keys().unwrap(), vec!["ice cream"]);

    fs::write(&literal, r#"{"word": "ice cream"}"#).unwrap();
    backend.remove("ice cream").unwrap();
    assert!(!literal.exists());
    assert!(backend.keys().unwrap().is_empty());
}

#[test]
fn test_modified_at() {
    let (_dir, mut backend) = setup();
    assert_eq!(backend.modified_at("cat").unwrap(), None);
    backend.set("cat", &cat()).unwrap();
    assert!(backend.modified_at("cat").unwrap().is_some());
}

#[test]
fn test_store_skips_corrupt_records_and_backfills() {
    let (_dir, mut backend) = setup();
    backend.set("cat", &cat()).unwrap();
    fs::write(backend.record_path("broken"), "{ not json").unwrap();
    fs::write(backend.record_path("dog"), r#"{"word": "dog"}"#).unwrap();

    let store = EntryStore::load(backend, &Schema::builtin());
    let words: Vec<&str> = store.entries().iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["cat", "dog"]);

    let failures = store.load_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].key.as_deref(), Some("broken"));

    let dog = store.find_by_word("dog").unwrap();
    assert_eq!(dog.text(DEFINITION), "");
    assert!(dog.list(TAGS).is_empty());
    assert!(dog.has_field(SYNONYMS));
}

#[test]
fn test_record_without_word_takes_its_key() {
    let (_dir, backend) = setup();
    fs::create_dir_all(backend.root()).unwrap();
    fs::write(backend.record_path("owl"), r#"{"definition": "a bird"}"#).unwrap();

    let store = EntryStore::load(backend, &Schema::builtin());
    assert_eq!(store.find_by_word("owl").unwrap().text(DEFINITION), "a bird");
}

#[test]
fn test_rename_through_app_moves_the_file() {
    let (_dir, mut backend) = setup();
    backend.set("cat", &cat()).unwrap();
    let mut app = App::new(Schema::builtin(), backend);

    let mut yes = |_: &str, _: &[&str]| "yes".to_string();
    app.select_word("cat", &mut yes).unwrap();
    app.edit_entry().unwrap();
    app.working_mut().unwrap().word = "feline".to_string();
    app.save_entry().unwrap();

    let backend = app.store().backend();
    assert!(!backend.record_path("cat").exists());
    assert!(backend.record_path("feline").exists());
    assert_eq!(backend.get("feline").unwrap().text(DEFINITION), "a small feline");

    // A fresh load sees the same collection
    let reloaded = EntryStore::load(FsBackend::new(backend.root()), &Schema::builtin());
    assert_eq!(reloaded.entries(), app.entries());
}

#[test]
fn test_delete_and_rename_reach_misnamed_files() {
    let (_dir, mut backend) = setup();
    backend.set("owl", &Entry::new("owl")).unwrap();
    fs::write(backend.record_path("kitty"), r#"{"word": "cat"}"#).unwrap();
    fs::write(backend.record_path("pup"), r#"{"word": "dog"}"#).unwrap();
    let root = backend.root().to_path_buf();

    let mut store = EntryStore::load(backend, &Schema::builtin());
    let cat = store.find_by_word("cat").unwrap().clone();
    store.delete(&cat).unwrap();

    let dog = store.find_by_word("dog").unwrap().clone();
    let mut hound = dog.clone();
    hound.word = "hound".to_string();
    store.upsert(Some(&dog), hound).unwrap();

    assert!(!root.join("kitty.json").exists());
    assert!(!root.join("pup.json").exists());
    assert!(root.join("hound.json").exists());

    let reloaded = EntryStore::load(FsBackend::new(&root), &Schema::builtin());
    let words: Vec<&str> = reloaded.entries().iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["hound", "owl"]);
}
