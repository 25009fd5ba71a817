use karasu::{
    catalog,
    csv::{table_to_csv, to_csv},
    photos,
    state::GroupState,
    tables::{create_initial_state, create_new_table},
    types::{cut_labels, CutType},
};

const HEADER: &str = "メンバー";

fn catalog_state() -> GroupState {
    GroupState::from_catalog(catalog::groups())
}

#[test]
fn header_lists_member_column_and_cuts() {
    let out = to_csv(&photos::build_empty(catalog::groups()), &catalog_state().groups, &cut_labels(), HEADER);
    assert_eq!(out.lines().next(), Some("メンバー,ヨリ,チュウ,ヒキ,座り"));
}

#[test]
fn empty_photos_with_every_generation_enabled() {
    let state = catalog_state()
        .set_group_enabled("sakurazaka", true)
        .set_group_enabled("hinatazaka", true);
    let out = to_csv(&photos::PhotoMap::new(), &state.groups, &cut_labels(), HEADER);

    assert!(out.ends_with('\n'));
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 1 + catalog::all_members().len());
    assert!(lines[1..].iter().all(|l| l.ends_with(",0,0,0,0")));
}

#[test]
fn counts_are_written_in_cut_order() {
    let groups = catalog::groups();
    let mut map = photos::build_empty(groups);
    map.insert("sakurazaka:井上 梨名".to_string(), [1, 2, 3, 4]);

    let out = to_csv(&map, &catalog_state().groups, &cut_labels(), HEADER);
    let row = out.lines().find(|l| l.contains("井上 梨名")).expect("row");
    assert_eq!(row, "井上 梨名,1,2,3,4");
}

#[test]
fn disabled_groups_and_generations_are_skipped() {
    let state = catalog_state()
        .set_group_enabled("hinatazaka", false)
        .set_generation_enabled("sakurazaka", "四期生", false);
    let out = to_csv(&photos::PhotoMap::new(), &state.groups, &cut_labels(), HEADER);

    assert!(!out.contains("金村 美玖"));
    assert!(!out.contains("勝又 春"));
    assert!(!out.contains("小林 由依"));
    assert!(out.contains("井上 梨名"));
}

#[test]
fn opted_out_members_are_still_listed() {
    let state = catalog_state().set_member_enabled("sakurazaka", "井上 梨名", false);
    let out = to_csv(&photos::PhotoMap::new(), &state.groups, &cut_labels(), HEADER);
    assert!(out.contains("井上 梨名,0,0,0,0\n"));
}

#[test]
fn header_fields_are_escaped() {
    let out = to_csv(
        &photos::PhotoMap::new(),
        &[],
        &["=a", "b,c", "d\"e", "f"],
        "@member",
    );
    assert_eq!(out, "\"\t@member\",\"\t=a\",\"b,c\",\"d\"\"e\",f\n");
}

#[test]
fn table_export_uses_the_table_settings() {
    let table = create_new_table("日向", &["hinatazaka"]).expect("create");
    let out = table_to_csv(&table, &cut_labels(), HEADER);
    assert!(!out.contains("井上 梨名"));
    assert!(out.contains("金村 美玖,0,0,0,0"));

    let tables = create_initial_state("a").set_photo_count("hinatazaka", "小坂 菜緒", CutType::Chu, 7);
    let out = table_to_csv(tables.active_table().expect("active"), &cut_labels(), HEADER);
    assert!(out.contains("小坂 菜緒,0,7,0,0\n"));
}
