use super::*;

fn node(id: &str, parent: &str, name: &str, sort_order: Option<i64>) -> CategoryNode {
    CategoryNode {
        category_id: id.to_string(),
        parent_ref: parent.to_string(),
        name: name.to_string(),
        sort_order,
    }
}

fn build(nodes: Vec<CategoryNode>) -> Result<(CategoryTree, Vec<ReferenceWarning>), ConvertError> {
    CategoryTree::build(nodes, &ExportProfile::default())
}

fn sample_nodes() -> Vec<CategoryNode> {
    vec![
        node("5", "1", "Serums", Some(2)),
        node("1", "root", "Skincare", Some(1)),
        node("6", "1", "Toners", Some(1)),
        node("9", "5", "Vitamin C", None),
        node("2", "", "Gifts", Some(0)),
    ]
}

#[test]
fn resolves_two_level_path() {
    let (tree, warnings) = build(vec![
        node("1", "root", "Skincare", None),
        node("5", "1", "Serums", None),
    ])
    .unwrap();
    assert!(warnings.is_empty());
    assert_eq!(tree.path("5").unwrap(), ["Skincare", "Serums"]);
}

#[test]
fn path_ends_with_own_name_and_matches_depth() {
    let (tree, _) = build(sample_nodes()).unwrap();
    for id in ["1", "2", "5", "6", "9"] {
        let path = tree.path(id).unwrap();
        assert_eq!(path.last().map(String::as_str), tree.name(id));

        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = tree.parent(current) {
            depth += 1;
            current = parent;
        }
        assert_eq!(path.len(), depth + 1, "path length for {id}");
        assert_eq!(tree.depth(id), Some(depth));
    }
    assert_eq!(tree.path("9").unwrap(), ["Skincare", "Serums", "Vitamin C"]);
}

#[test]
fn root_sentinel_is_case_insensitive_and_empty_is_root() {
    let (tree, _) = build(vec![
        node("1", "ROOT", "Skincare", None),
        node("2", "", "Gifts", None),
    ])
    .unwrap();
    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.depth("1"), Some(0));
}

#[test]
fn children_and_roots_follow_sort_order() {
    let (tree, _) = build(sample_nodes()).unwrap();
    assert_eq!(tree.roots(), ["2", "1"]);
    assert_eq!(tree.children("1"), ["6", "5"]);
    assert!(tree.children("9").is_empty());
    assert!(tree.children("missing").is_empty());
}

#[test]
fn dangling_parent_is_fatal() {
    let err = build(vec![
        node("1", "root", "Skincare", None),
        node("5", "42", "Serums", None),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::DanglingReference { ref category_id, ref parent_id }
            if category_id == "5" && parent_id == "42"
    ));
}

#[test]
fn two_node_cycle_is_fatal() {
    let err = build(vec![
        node("1", "root", "Skincare", None),
        node("3", "4", "A", None),
        node("4", "3", "B", None),
    ])
    .unwrap_err();
    match err {
        ConvertError::Cycle { category_id, chain } => {
            assert_eq!(category_id, "3");
            assert_eq!(chain, vec!["3", "4", "3"]);
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
}

#[test]
fn self_parent_is_a_cycle() {
    let err = build(vec![node("7", "7", "Loop", None)]).unwrap_err();
    assert!(matches!(err, ConvertError::Cycle { ref chain, .. } if chain == &["7", "7"]));
}

#[test]
fn cycle_below_valid_root_still_fails_whole_build() {
    let result = build(vec![
        node("1", "root", "Skincare", None),
        node("5", "1", "Serums", None),
        node("8", "9", "X", None),
        node("9", "8", "Y", None),
    ]);
    assert!(matches!(result, Err(ConvertError::Cycle { .. })));
}

#[test]
fn duplicate_category_keeps_last_row_and_warns() {
    let (tree, warnings) = build(vec![
        node("1", "root", "Skin", None),
        node("1", "root", "Skincare", None),
    ])
    .unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.name("1"), Some("Skincare"));
    assert_eq!(
        warnings,
        vec![ReferenceWarning::DuplicateCategory {
            category_id: "1".to_string()
        }]
    );
}

#[test]
fn empty_table_builds_empty_tree() {
    let (tree, warnings) = build(vec![]).unwrap();
    assert!(tree.is_empty());
    assert!(warnings.is_empty());
    assert_eq!(tree.render_outline(), "");
}

#[test]
fn render_outline_indents_children() {
    let (tree, _) = build(sample_nodes()).unwrap();
    assert_eq!(
        tree.render_outline(),
        "Gifts [2]\nSkincare [1]\n  Toners [6]\n  Serums [5]\n    Vitamin C [9]\n"
    );
}
