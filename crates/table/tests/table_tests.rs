//! Structural tests for the flattened node table.

use rodzo_table::{unescape, NodeKind, NodeTable, TableEntry, TableError, UnitRef};

fn entry(id: usize, parent: Option<usize>, kind: NodeKind, text: Option<&str>) -> TableEntry {
    TableEntry {
        id,
        parent,
        depth: 0,
        children: Vec::new(),
        kind,
        file: "spec/a_spec.c".to_string(),
        local_line: id as u32,
        global_line: id as u32,
        span: 0,
        text: text.map(str::to_string),
        unit: None,
    }
}

/// root > file > describe "stack" > { context "when empty" > it "pops nothing" > pending, before all }
fn sample() -> Vec<TableEntry> {
    let mut nodes = vec![
        entry(0, None, NodeKind::Root, None),
        entry(1, Some(0), NodeKind::FileGroup, None),
        entry(2, Some(1), NodeKind::Describe, Some("stack")),
        entry(3, Some(2), NodeKind::Context, Some("when empty")),
        entry(4, Some(3), NodeKind::Example, Some("pops nothing")),
        entry(5, Some(4), NodeKind::Pending, Some("not yet implemented")),
        entry(6, Some(2), NodeKind::BeforeAll, None),
    ];
    nodes[0].children = vec![1];
    nodes[1].children = vec![2];
    nodes[2].children = vec![3, 6];
    nodes[3].children = vec![4];
    nodes[4].children = vec![5];
    nodes[4].unit = Some(UnitRef::Example("rdz_example_4".to_string()));
    nodes[6].unit = Some(UnitRef::Hook("rdz_hook_6".to_string()));
    nodes
}

#[test]
fn valid_table_is_accepted() {
    let table = NodeTable::new(sample()).expect("valid table");
    assert_eq!(table.len(), 7);
    assert_eq!(table.root().kind, NodeKind::Root);
}

#[test]
fn descendants_are_in_declaration_order() {
    let table = NodeTable::new(sample()).unwrap();
    assert_eq!(table.descendants(2), vec![3, 4, 5, 6]);
    assert_eq!(table.ancestors(5), vec![4, 3, 2, 1, 0]);
}

#[test]
fn title_of_pending_marker_is_its_example_title() {
    let table = NodeTable::new(sample()).unwrap();
    assert_eq!(table.title(4), "stack when empty pops nothing");
    assert_eq!(table.title(5), "stack when empty pops nothing");
}

#[test]
fn hooks_filters_children_by_kind() {
    let table = NodeTable::new(sample()).unwrap();
    let names: Vec<_> = table
        .hooks(2, NodeKind::BeforeAll)
        .filter_map(|e| e.unit.as_ref().map(|u| u.name().to_string()))
        .collect();
    assert_eq!(names, vec!["rdz_hook_6"]);
    assert_eq!(table.hooks(2, NodeKind::AfterAll).count(), 0);
}

#[test]
fn json_round_trip_preserves_table() {
    let table = NodeTable::new(sample()).unwrap();
    let json = table.to_json().unwrap();
    assert!(json.contains("\"before_all\""));
    assert!(json.contains("\"rdz_hook_6\""));
    let back = NodeTable::from_json(&json).unwrap();
    assert_eq!(back, table);
}

#[test]
fn parent_after_child_is_rejected() {
    let mut nodes = sample();
    nodes[3].parent = Some(4);
    nodes[4].children.push(3);
    nodes[2].children.retain(|&c| c != 3);
    let err = NodeTable::new(nodes).unwrap_err();
    assert!(matches!(err, TableError::Invalid { id: 3, .. }), "{}", err);
}

#[test]
fn pending_with_children_is_rejected() {
    let mut nodes = sample();
    nodes[6].parent = Some(5);
    nodes[5].children.push(6);
    nodes[2].children.retain(|&c| c != 6);
    let err = NodeTable::new(nodes).unwrap_err();
    assert!(err.to_string().contains("pending"), "{}", err);
}

#[test]
fn unknown_format_is_rejected() {
    let json = r#"{"format":"99","nodes":[]}"#;
    assert!(matches!(
        NodeTable::from_json(json),
        Err(TableError::Format(f)) if f == "99"
    ));
}

#[test]
fn covers_line_includes_both_ends() {
    let mut e = entry(3, Some(2), NodeKind::Context, Some("c"));
    e.global_line = 5;
    e.span = 30;
    assert!(e.covers_line(5));
    assert!(e.covers_line(35));
    assert!(!e.covers_line(36));
    assert!(!e.covers_line(4));
}

#[test]
fn unescape_resolves_c_escapes() {
    assert_eq!(unescape(r#"says \"hi\""#), r#"says "hi""#);
    assert_eq!(unescape(r"a\tb\\c\101\x42"), "a\tb\\cAB");
    assert_eq!(unescape(r"trailing\"), r"trailing\");
    assert!(matches!(unescape("plain"), std::borrow::Cow::Borrowed("plain")));
}
