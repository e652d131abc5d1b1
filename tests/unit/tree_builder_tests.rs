use pdftree::{
    structure::tree_builder::SPLICE_DEPTH, ExplorerTree, Handle, StructuralValue, TreeBuilder,
};
use pretty_assertions::assert_eq;

use crate::fixtures::all_labels;

fn parse(text: &str) -> StructuralValue {
    StructuralValue::from_slice(text.as_bytes()).unwrap()
}

#[test]
fn test_three_element_root_flags_middle_subtree() {
    let value = parse(r#"[{"A":1},{"B":[{"x":true},2]},{"C":null}]"#);
    let tree = TreeBuilder::new().build_document(Handle::new(1), &value);
    let roots = tree.roots().to_vec();
    assert_eq!(roots.len(), 3);

    let flagged: Vec<String> = tree
        .walk()
        .filter(|(id, _)| tree.node(*id).unwrap().candidate)
        .map(|(id, _)| tree.node(id).unwrap().label.clone())
        .collect();
    assert_eq!(flagged, vec!["[1]", "B", "[0]", "x : true", "[1] : 2"]);

    // `[1]` is an object here, so no node is an object slot.
    let b = tree.find_by_label("B").unwrap();
    let inner = tree.children(b).to_vec();
    assert_eq!(tree.node(inner[0]).unwrap().candidate_index, None);
    assert_eq!(tree.node(inner[1]).unwrap().stream_target(), None);
}

#[test]
fn test_only_object_table_entries_get_stream_targets() {
    let value = parse(
        r#"[{"Version":"1.5"},[null,{"Type":"/Page","MediaBox":[0,0,612,792]}],{"Objects":1}]"#,
    );
    let tree = TreeBuilder::new().build_document(Handle::new(1), &value);
    let table = tree.children(tree.roots()[1]).to_vec();
    assert_eq!(tree.node(table[1]).unwrap().stream_target(), Some(1));

    let media_box = tree.find_by_label("MediaBox").unwrap();
    for id in tree.children(media_box) {
        let node = tree.node(*id).unwrap();
        assert!(node.candidate);
        assert_eq!(node.stream_target(), None, "{}", node.label);
    }
}

#[test]
fn test_nested_arrays_below_root_are_not_candidates() {
    let value = parse(r#"{"Kids":[[1,2],[3]]}"#);
    let tree = TreeBuilder::new().build_document(Handle::new(1), &value);
    assert!(tree.walk().all(|(id, _)| !tree.node(id).unwrap().candidate));
}

#[test]
fn test_pages_description_shape() {
    let value = parse(
        r#"{"Page 1":{"Type":"/Page","Contents":{"$Type":"Ref","num":4,"gen":0},"$ContentsNo":4,"$ResourcesNo":3}}"#,
    );
    let tree = TreeBuilder::new().build_document(Handle::new(1), &value);

    assert_eq!(
        all_labels(&tree),
        vec![
            "Page 1",
            "Type : /Page",
            "Contents",
            "$Type : Ref",
            "num : 4",
            "gen : 0",
            "$ContentsNo : 4",
            "$ResourcesNo : 3",
        ]
    );
    let page = tree.roots()[0];
    assert_eq!(tree.node(page).unwrap().stream_target(), Some(4));
    let contents = tree.find_by_label("Contents").unwrap();
    assert!(tree.node(contents).unwrap().needs_resolution());
}

#[test]
fn test_keyed_scalar_at_splice_depth() {
    let mut tree = ExplorerTree::new(Handle::new(1));
    TreeBuilder::new().build(&mut tree, None, &parse(r#""text""#), "Title", false, SPLICE_DEPTH);
    assert_eq!(all_labels(&tree), vec!["Title : text"]);
}

#[test]
fn test_deeply_nested_input_terminates() {
    let depth = 2000;
    let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    // serde_json refuses nesting past 128, so build the value by hand.
    let mut value = StructuralValue::Array(Vec::new());
    for _ in 0..depth {
        value = StructuralValue::Array(vec![value]);
    }
    assert!(StructuralValue::from_slice(text.as_bytes()).is_err());

    let tree = TreeBuilder::new()
        .with_max_depth(64)
        .build_document(Handle::new(1), &value);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(tree.walk().map(|(_, d)| d).max(), Some(64));
}

#[test]
fn test_scalars_render_canonically() {
    let value = parse(r#"{"a":1.5,"b":-3,"c":false,"d":"x y","e":null}"#);
    let tree = TreeBuilder::new().build_document(Handle::new(1), &value);
    assert_eq!(
        all_labels(&tree),
        vec!["a : 1.5", "b : -3", "c : false", "d : x y", "e : null"]
    );
}
