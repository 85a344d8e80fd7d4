use thoughtmap::expand::{expansion_prompt, is_initial_expansion, parse_ideas};
use thoughtmap::{Error, LayoutOptions, ThoughtTree, layouted_elements};

fn sample_tree() -> ThoughtTree {
    let mut tree = ThoughtTree::new("How do I ship faster?");
    tree.expand(ThoughtTree::ROOT_ID, ["Cut scope", "Automate releases"])
        .unwrap();
    tree.expand("2", ["Nightly builds", "  ", "Release train"])
        .unwrap();
    tree
}

#[test]
fn expand_assigns_sequential_ids() {
    let mut tree = ThoughtTree::new("root");
    assert_eq!(tree.root().id, "0");
    assert_eq!(tree.expand("0", ["a", "b"]).unwrap(), vec!["1", "2"]);
    assert_eq!(tree.expand("1", vec!["c".to_string()]).unwrap(), vec!["3"]);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.get("3").unwrap().parent.as_deref(), Some("1"));
}

#[test]
fn expand_skips_blank_ideas() {
    let tree = sample_tree();
    assert_eq!(tree.len(), 5);
    let children: Vec<&str> = tree
        .children("2")
        .iter()
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(children, vec!["Nightly builds", "Release train"]);
}

#[test]
fn expand_rejects_unknown_parent() {
    let mut tree = ThoughtTree::new("root");
    let err = tree.expand("7", ["idea"]).unwrap_err();
    assert!(matches!(err, Error::UnknownNode { ref id } if id == "7"));
    assert_eq!(tree.len(), 1);
}

#[test]
fn context_path_joins_labels_from_the_root() {
    let tree = sample_tree();
    assert_eq!(tree.context_path("0").unwrap(), "How do I ship faster?");
    assert_eq!(
        tree.context_path("4").unwrap(),
        "How do I ship faster? -> Automate releases -> Release train"
    );
    assert!(matches!(
        tree.context_path("99"),
        Err(Error::UnknownNode { .. })
    ));
}

#[test]
fn expand_request_marks_the_root_as_initial() {
    let tree = sample_tree();

    let root = tree.expand_request("0").unwrap();
    assert!(is_initial_expansion(&root.context, &root.question));
    assert!(expansion_prompt(&root).contains("overall plans or strategies"));

    let step = tree.expand_request("2").unwrap();
    assert_eq!(step.question, "Automate releases");
    assert!(!is_initial_expansion(&step.context, &step.question));
    assert!(expansion_prompt(&step).contains("How do I ship faster? -> Automate releases"));
}

#[test]
fn elements_link_parents_to_children() {
    let tree = sample_tree();
    let (nodes, edges) = tree.elements();
    assert_eq!(nodes.len(), 5);
    let ids: Vec<(&str, &str, Option<&str>)> = edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.id()))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("0", "1", Some("e0-1")),
            ("0", "2", Some("e0-2")),
            ("2", "3", Some("e2-3")),
            ("2", "4", Some("e2-4")),
        ]
    );
}

#[test]
fn grown_tree_lays_out_by_depth() {
    let mut tree = ThoughtTree::new("Root");
    let ideas = parse_ideas("1. Alpha\n2. Beta\n3. Gamma\n4. Delta");
    let added = tree.expand("0", ideas).unwrap();
    assert_eq!(added.len(), 3);
    tree.expand("1", ["Alpha one"]).unwrap();

    let (nodes, edges) = tree.elements();
    let out = layouted_elements(nodes, edges, &LayoutOptions::default()).unwrap();

    // Every label fits on one line: cards are 64 tall and ranks 100 apart.
    let y = |id: &str| out.position_of(id).unwrap().y;
    assert_eq!(y("0"), 0.0);
    assert_eq!(y("1"), 164.0);
    assert_eq!(y("3"), 164.0);
    assert_eq!(y("4"), 328.0);
}
