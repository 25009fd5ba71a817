use std::sync::Arc;

use karasu::{
    catalog::GRADUATED_GENERATION,
    error::TableError,
    tables::{
        create_initial_state, create_new_table, DuplicateOptions, DuplicatePlacement, TablesCollection,
        MAX_TABLES,
    },
    types::CutType,
};

fn full_collection() -> Arc<TablesCollection> {
    let mut tables = create_initial_state("base");
    for i in 1..MAX_TABLES {
        tables = tables.add_table(&format!("t{i}"), &["sakurazaka"]).expect("add");
    }
    tables
}

#[test]
fn initial_state_has_one_active_table_with_defaults() {
    let tables = create_initial_state("デフォルト");
    assert_eq!(tables.tables.len(), 1);
    assert_eq!(tables.max_tables, MAX_TABLES);

    let active = tables.active_table().expect("active");
    assert_eq!(active.name, "デフォルト");
    assert!(active.photo_data.is_empty());

    let state = active.group_state();
    assert_eq!(state.count_enabled_members(), 33 + 28);
    assert!(!state
        .group("sakurazaka")
        .and_then(|g| g.generation(GRADUATED_GENERATION))
        .expect("graduated")
        .enabled);
}

#[test]
fn new_table_enables_only_requested_groups() {
    let table = create_new_table("日向のみ", &["hinatazaka"]).expect("create");
    assert!(table.photo_data.is_empty());
    assert!(table.group_settings.contains_key("hinatazaka"));
    assert!(!table.group_settings.contains_key("sakurazaka"));

    let state = table.group_state();
    assert!(!state.group("sakurazaka").expect("group").enabled);
    assert_eq!(state.count_enabled_members(), 28);
}

#[test]
fn name_length_is_counted_in_characters() {
    let thirty = "あ".repeat(30);
    assert!(create_new_table(&thirty, &["sakurazaka"]).is_ok());

    let err = create_new_table(&"あ".repeat(31), &["sakurazaka"]).unwrap_err();
    assert_eq!(err, TableError::NameTooLong { len: 31 });
    assert_eq!(err.to_string(), "Table name must not exceed 30 characters");
}

#[test]
fn limit_is_enforced_for_create_and_duplicate() {
    let tables = full_collection();
    assert_eq!(tables.tables.len(), MAX_TABLES);
    assert!(!tables.can_create_new_table());

    let err = tables.add_table("one more", &["sakurazaka"]).unwrap_err();
    assert_eq!(err.to_string(), "Maximum table limit reached");

    let first = tables.tables[0].id;
    let err = tables.duplicate_table(&first, DuplicateOptions::default()).unwrap_err();
    assert_eq!(err, TableError::LimitReached);
}

#[test]
fn add_table_appends_and_activates() {
    let tables = create_initial_state("a");
    let next = tables.add_table("b", &["sakurazaka"]).expect("add");
    assert_eq!(next.tables.len(), 2);
    assert_eq!(next.active_table_id, next.tables[1].id);
    assert_eq!(tables.tables.len(), 1);
    assert!(Arc::ptr_eq(&tables.tables[0], &next.tables[0]));
}

#[test]
fn set_active_table_unknown_id_is_identity() {
    let tables = create_initial_state("a");
    let same = tables.set_active_table(&uuid::Uuid::new_v4());
    assert!(Arc::ptr_eq(&tables, &same));

    let two = tables.add_table("b", &["sakurazaka"]).expect("add");
    let back = two.set_active_table(&two.tables[0].id);
    assert_eq!(back.active_table_id, two.tables[0].id);
}

#[test]
fn rename_rules() {
    let tables = create_initial_state("a").add_table("b", &["sakurazaka"]).expect("add");
    let id = tables.tables[0].id;

    let renamed = tables.rename_table(&id, "b").expect("duplicate names allowed");
    assert_eq!(renamed.tables[0].name, "b");
    assert!(renamed.tables[0].last_modified >= tables.tables[0].last_modified);

    assert!(tables.rename_table(&id, &"x".repeat(31)).is_err());

    let same = tables.rename_table(&uuid::Uuid::new_v4(), "c").expect("rename");
    assert!(Arc::ptr_eq(&tables, &same));
}

#[test]
fn delete_rules() {
    let single = create_initial_state("a");
    let only = single.tables[0].id;
    let err = single.delete_table(&only).unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete the last table");

    let same = single.delete_table(&uuid::Uuid::new_v4()).expect("no-op");
    assert!(Arc::ptr_eq(&single, &same));

    let three = single
        .add_table("b", &["sakurazaka"])
        .and_then(|t| t.add_table("c", &["sakurazaka"]))
        .expect("add");
    let active = three.active_table_id;
    let removed = three.delete_table(&three.tables[1].id).expect("delete");
    assert_eq!(removed.tables.len(), 2);
    assert_eq!(removed.active_table_id, active);

    let removed = three.delete_table(&active).expect("delete");
    assert_eq!(removed.active_table_id, three.tables[0].id);
}

#[test]
fn duplicate_deep_copies_and_activates() {
    let tables = create_initial_state("a").set_photo_count("sakurazaka", "井上 梨名", CutType::Hiki, 3);
    let source = tables.tables[0].id;

    let dup = tables.duplicate_table(&source, DuplicateOptions::default()).expect("dup");
    assert_eq!(dup.tables.len(), 2);
    let copy = &dup.tables[1];
    assert_ne!(copy.id, source);
    assert_eq!(dup.active_table_id, copy.id);
    assert_eq!(copy.photo_data, dup.tables[0].photo_data);
    assert_eq!(copy.group_settings, dup.tables[0].group_settings);

    let edited = dup.set_photo_count("sakurazaka", "井上 梨名", CutType::Hiki, 9);
    assert_eq!(edited.tables[1].photo_data["sakurazaka"]["井上 梨名"], [0, 0, 9, 0]);
    assert_eq!(edited.tables[0].photo_data["sakurazaka"]["井上 梨名"], [0, 0, 3, 0]);
}

#[test]
fn duplicate_placement_and_activation_are_configurable() {
    let tables = create_initial_state("a")
        .add_table("b", &["sakurazaka"])
        .expect("add");
    let first = tables.tables[0].id;
    let options = DuplicateOptions {
        placement: DuplicatePlacement::AfterSource,
        activate: false,
    };

    let dup = tables.duplicate_table(&first, options).expect("dup");
    assert_eq!(dup.tables.len(), 3);
    assert_eq!(dup.tables[1].name, "a");
    assert_ne!(dup.tables[1].id, first);
    assert_eq!(dup.active_table_id, tables.active_table_id);

    let same = tables
        .duplicate_table(&uuid::Uuid::new_v4(), options)
        .expect("no-op");
    assert!(Arc::ptr_eq(&tables, &same));
}

#[test]
fn photo_count_updates_touch_only_the_active_table() {
    let tables = create_initial_state("a").add_table("b", &["hinatazaka"]).expect("add");
    let updated = tables.set_photo_count("hinatazaka", "金村 美玖", CutType::Suwari, 2);

    assert!(Arc::ptr_eq(&tables.tables[0], &updated.tables[0]));
    assert_eq!(updated.tables[1].photo_data["hinatazaka"]["金村 美玖"], [0, 0, 0, 2]);

    let cleared = updated.set_photo_count("hinatazaka", "金村 美玖", CutType::Suwari, 0);
    assert!(cleared.tables[1].photo_data.is_empty());

    let unknown = tables.set_photo_count("hinatazaka", "nobody", CutType::Yori, 1);
    assert!(Arc::ptr_eq(&tables, &unknown));
}

#[test]
fn active_settings_replacement() {
    let tables = create_initial_state("a");
    let before = tables.tables[0].last_modified;
    let settings = karasu::state::settings::settings_for_groups(&["hinatazaka"]);

    let next = tables.update_active_group_settings(settings.clone());
    assert_eq!(next.tables[0].group_settings, settings);
    assert!(next.tables[0].last_modified >= before);
    assert_eq!(tables.tables[0].group_settings.len(), 2);
}
