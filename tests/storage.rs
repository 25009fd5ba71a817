use tempfile::TempDir;

use karasu::{
    catalog::GRADUATED_GENERATION,
    locale::{load_locale, resolve_locale, save_locale, set_locale_tag, Locale},
    persist::{clear_all_data, keys, memory::MemoryStore, sqlite::SqliteStore, KvStore},
    tables::{
        create_initial_state, load_or_initialize, load_tables, migrate_from_legacy_storage, save_tables,
    },
    types::CutType,
};

/// Routes crate logs to the test output; safe to call from every test.
fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("karasu=debug".parse().expect("valid directive")))
        .with_test_writer()
        .try_init();
}

#[test]
fn sqlite_round_trips_tables_across_reopen() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("karasu.db");

    let tables = create_initial_state("a")
        .add_table("b", &["hinatazaka"])
        .expect("add")
        .set_photo_count("hinatazaka", "金村 美玖", CutType::Yori, 4);
    {
        let mut store = SqliteStore::open(&db_path).expect("open");
        save_tables(&mut store, &tables).expect("save");
        store.flush().expect("flush");
        assert!(store.updated_ms(keys::TABLES).expect("meta").is_some());
    }

    let store = SqliteStore::open(&db_path).expect("reopen");
    let loaded = load_tables(&store).expect("loaded");
    assert_eq!(*loaded, *tables);
}

#[test]
fn sqlite_kv_semantics() {
    let mut store = SqliteStore::open_in_memory().expect("open");
    assert_eq!(store.get("k").expect("get"), None);

    store.set("k", "1").expect("set");
    store.set("k", "2").expect("overwrite");
    assert_eq!(store.get("k").expect("get").as_deref(), Some("2"));
    assert_eq!(store.keys().expect("keys"), vec!["k".to_string()]);

    store.remove("k").expect("remove");
    store.remove("k").expect("remove absent");
    assert!(store.keys().expect("keys").is_empty());
}

#[test]
fn corrupt_tables_record_loads_as_none() {
    init_test_logging();
    let mut store = MemoryStore::new();
    store.set(keys::TABLES, "{\"version\":").expect("set");
    assert!(load_tables(&store).is_none());
}

#[test]
fn clear_all_data_keeps_locale() {
    let mut store = MemoryStore::new();
    save_tables(&mut store, &create_initial_state("a")).expect("save");
    store.set(keys::LEGACY_PHOTOS, "{}").expect("set");
    save_locale(&mut store, Locale::ZhTw).expect("locale");

    store.set("some-other-app", "keep me").expect("set");

    let removed = clear_all_data(&mut store).expect("clear");
    assert_eq!(removed, 2);
    let mut left = store.keys().expect("keys");
    left.sort();
    assert_eq!(left, vec![keys::LOCALE.to_string(), "some-other-app".to_string()]);
    assert_eq!(load_locale(&store), Some(Locale::ZhTw));
    assert_eq!(store.get("some-other-app").expect("get").as_deref(), Some("keep me"));
}

/// Saves two tables and returns the stored JSON for hand editing.
fn two_saved_tables(store: &mut MemoryStore) -> serde_json::Value {
    let tables = create_initial_state("a")
        .set_photo_count("sakurazaka", "井上 梨名", CutType::Yori, 5)
        .set_photo_count("sakurazaka", "山下 瞳月", CutType::Hiki, 2)
        .add_table("b", &["hinatazaka"])
        .expect("add")
        .set_photo_count("hinatazaka", "金村 美玖", CutType::Chu, 3);
    save_tables(store, &tables).expect("save");
    serde_json::from_str(&store.get(keys::TABLES).expect("get").expect("stored")).expect("json")
}

#[test]
fn one_bad_count_vector_does_not_lose_the_collection() {
    init_test_logging();
    let mut store = MemoryStore::new();
    let mut doc = two_saved_tables(&mut store);
    doc["tables"][0]["photoData"]["sakurazaka"]["井上 梨名"] = serde_json::json!([5, 0, 0]);
    doc["tables"][1]["createdAt"] = serde_json::json!(-1.5);
    let edited = doc.to_string();
    store.set(keys::TABLES, &edited).expect("set");

    let tables = load_or_initialize(&mut store, "fresh").expect("load");
    let names: Vec<_> = tables.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);

    let first = &tables.tables[0].photo_data["sakurazaka"];
    assert!(!first.contains_key("井上 梨名"));
    assert_eq!(first["山下 瞳月"], [0, 0, 2, 0]);
    assert_eq!(tables.tables[1].photo_data["hinatazaka"]["金村 美玖"], [0, 3, 0, 0]);
    assert_eq!(tables.active_table_id, tables.tables[1].id);

    // Recovered data is returned without rewriting the stored record.
    assert_eq!(store.get(keys::TABLES).expect("get").as_deref(), Some(edited.as_str()));
}

#[test]
fn unrecoverable_record_is_backed_up_before_reinitializing() {
    init_test_logging();
    let mut store = MemoryStore::new();
    store.set(keys::TABLES, "{\"tables\": 12").expect("set");

    let tables = load_or_initialize(&mut store, "fresh").expect("init");
    assert_eq!(tables.tables[0].name, "fresh");
    assert_eq!(store.get(keys::TABLES_BACKUP).expect("get").as_deref(), Some("{\"tables\": 12"));
    assert!(load_tables(&store).is_some());
}

#[test]
fn stored_tables_past_the_limit_are_dropped() {
    init_test_logging();
    let mut store = MemoryStore::new();
    let mut doc = two_saved_tables(&mut store);
    let template = doc["tables"][0].clone();
    let tables = doc["tables"].as_array_mut().expect("array");
    for i in 0..12 {
        let mut extra = template.clone();
        extra["id"] = serde_json::json!(uuid::Uuid::new_v4());
        extra["name"] = serde_json::json!(format!("extra {i}"));
        tables.push(extra);
    }
    store.set(keys::TABLES, &doc.to_string()).expect("set");

    let loaded = load_tables(&store).expect("loaded");
    assert_eq!(loaded.tables.len(), 10);
    assert_eq!(loaded.tables[1].name, "b");
    assert!(!loaded.can_create_new_table());
}

#[test]
fn legacy_photos_and_settings_become_one_table() {
    let mut store = MemoryStore::new();
    store
        .set(keys::LEGACY_PHOTOS, r#"{"井上 梨名":[1,2,3,0],"hinata:金村 美玖":[0,0,0,1]}"#)
        .expect("set");
    store
        .set(
            keys::LEGACY_GROUP_STATE,
            r#"{"hinatazaka":{"enabled":false,"generations":{"二期生":false,"三期生":false,"四期生":false,"五期生":false,"卒業生":false}}}"#,
        )
        .expect("set");

    let tables = migrate_from_legacy_storage(&store, "既存データ");
    assert_eq!(tables.tables.len(), 1);
    let table = tables.active_table().expect("active");
    assert_eq!(table.name, "既存データ");
    assert_eq!(table.photo_data["sakurazaka"]["井上 梨名"], [1, 2, 3, 0]);
    assert_eq!(table.photo_data["hinatazaka"]["金村 美玖"], [0, 0, 0, 1]);

    let state = table.group_state();
    assert!(!state.group("hinatazaka").expect("group").enabled);
    // Groups missing from the legacy record keep catalog defaults.
    let sakura = state.group("sakurazaka").expect("group");
    assert!(sakura.enabled);
    assert!(!sakura.generation(GRADUATED_GENERATION).expect("gen").enabled);
}

#[test]
fn corrupt_legacy_settings_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(keys::LEGACY_PHOTOS, r#"{"sakurazaka":{"山下 瞳月":[0,1,0,0]}}"#).expect("set");
    store.set(keys::LEGACY_GROUP_STATE, "nope").expect("set");

    let tables = migrate_from_legacy_storage(&store, "x");
    let table = tables.active_table().expect("active");
    assert_eq!(table.group_state().count_enabled_members(), 33 + 28);
    assert_eq!(table.photo_data["sakurazaka"]["山下 瞳月"], [0, 1, 0, 0]);
}

#[test]
fn no_legacy_data_means_initial_state() {
    let store = MemoryStore::new();
    let tables = migrate_from_legacy_storage(&store, "デフォルト");
    let fresh = create_initial_state("デフォルト");
    assert_eq!(tables.tables.len(), 1);
    assert_eq!(tables.tables[0].group_settings, fresh.tables[0].group_settings);
    assert!(tables.tables[0].photo_data.is_empty());
}

#[test]
fn load_or_initialize_persists_and_then_reuses() {
    let mut store = MemoryStore::new();
    let first = load_or_initialize(&mut store, "a").expect("init");
    assert!(store.get(keys::TABLES).expect("get").is_some());

    let second = load_or_initialize(&mut store, "b").expect("load");
    assert_eq!(second.active_table_id, first.active_table_id);
    assert_eq!(second.tables[0].name, "a");
}

#[test]
fn locale_preference() {
    let mut store = MemoryStore::new();
    assert_eq!(resolve_locale(&store, "zh-HK"), Locale::ZhTw);
    assert_eq!(resolve_locale(&store, "fr"), Locale::JaJp);

    assert_eq!(set_locale_tag(&mut store, "en-US").expect("set"), None);
    assert_eq!(load_locale(&store), None);

    assert_eq!(set_locale_tag(&mut store, "zh-TW").expect("set"), Some(Locale::ZhTw));
    assert_eq!(resolve_locale(&store, "ja"), Locale::ZhTw);

    store.set(keys::LOCALE, "xx").expect("set");
    assert_eq!(resolve_locale(&store, "ja"), Locale::JaJp);
}
