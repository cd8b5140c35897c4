//! Tests for verbose and terse tree serialization.

use super::*;
use crate::model::SyntaxNode;
use crate::test_harness::{
    assignment_tree, deep_chain, error_tree, leaf_with_text, repeated_field_tree,
};

fn verbose(tree: &SyntaxNode) -> VerboseNode {
    serialize_verbose(&tree)
}

fn terse(tree: &SyntaxNode) -> TerseNode {
    serialize_terse(&tree)
}

// ===== Verbose =====

#[test]
fn verbose_keys_children_by_field_name_or_index() {
    let doc = verbose(&assignment_tree());
    let statement = doc.children.as_ref().unwrap().get("child_0").unwrap();
    let assignment = statement.children.as_ref().unwrap().get("child_0").unwrap();
    let keys: Vec<_> = assignment.children.as_ref().unwrap().keys().collect();
    assert_eq!(keys, vec!["left", "child_1", "right"]);
}

#[test]
fn verbose_omits_children_on_leaves() {
    let doc = verbose(&leaf_with_text("identifier", 3));
    assert!(doc.children.is_none());
    let json = serde_json::to_value(&doc).unwrap();
    assert!(json.get("children").is_none());
}

#[test]
fn verbose_includes_short_text_on_every_node() {
    let doc = verbose(&assignment_tree());
    assert_eq!(doc.text.as_deref(), Some("x=1"));
    let statement = doc.children.as_ref().unwrap().get("child_0").unwrap();
    assert_eq!(statement.text.as_deref(), Some("x=1"));
}

#[test]
fn verbose_text_limit_is_exclusive_at_60() {
    assert!(verbose(&leaf_with_text("string", 59)).text.is_some());
    assert!(verbose(&leaf_with_text("string", 60)).text.is_none());
}

#[test]
fn verbose_comment_text_limit_is_exclusive_at_80() {
    assert!(verbose(&leaf_with_text("comment", 79)).text.is_some());
    assert!(verbose(&leaf_with_text("comment", 80)).text.is_none());
    assert!(verbose(&leaf_with_text("line_comment", 70)).text.is_none());
}

#[test]
fn verbose_text_length_is_measured_in_utf16_units() {
    // 30 emoji = 60 UTF-16 code units, over the limit despite 30 chars
    let text = "\u{1F600}".repeat(30);
    let node = SyntaxNode::new("string", 0, text.len(), text);
    assert!(verbose(&node).text.is_none());
}

#[test]
fn verbose_marks_only_error_nodes() {
    let doc = verbose(&error_tree());
    assert!(!doc.error);
    let error = doc.children.as_ref().unwrap().get("child_0").unwrap();
    assert!(error.error);

    let json = serde_json::to_value(&doc).unwrap();
    assert!(json.get("error").is_none());
    assert_eq!(json["children"]["child_0"]["error"], serde_json::json!(true));
}

#[test]
fn verbose_repeated_field_keeps_first_position_and_last_value() {
    let doc = verbose(&repeated_field_tree());
    let arguments = doc.children.as_ref().unwrap().get("arguments").unwrap();
    let children = arguments.children.as_ref().unwrap();
    let keys: Vec<_> = children.keys().collect();
    assert_eq!(keys, vec!["child_0", "argument", "child_2", "child_4"]);
    assert_eq!(children.get("argument").unwrap().text.as_deref(), Some("b"));
}

#[test]
fn verbose_pretty_json_snapshot() {
    let doc = serialize(&&assignment_tree(), SerializeMode::Verbose);
    let json = to_pretty_json(&doc).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "type": "program",
      "children": {
        "child_0": {
          "type": "expression_statement",
          "children": {
            "child_0": {
              "type": "assignment",
              "children": {
                "left": {
                  "type": "identifier",
                  "text": "x"
                },
                "child_1": {
                  "type": "=",
                  "text": "="
                },
                "right": {
                  "type": "integer",
                  "text": "1"
                }
              },
              "text": "x=1"
            }
          },
          "text": "x=1"
        }
      },
      "text": "x=1"
    }
    "#);
}

// ===== Terse =====

#[test]
fn terse_prefixes_field_names_with_index() {
    let doc = terse(&repeated_field_tree());
    let arguments = doc.children.get("child_1_arguments").unwrap();
    let keys: Vec<_> = arguments.children.keys().collect();
    assert_eq!(
        keys,
        vec![
            "child_0",
            "child_1_argument",
            "child_2",
            "child_3_argument",
            "child_4"
        ]
    );
}

#[test]
fn terse_always_keeps_text_and_positions() {
    let doc = terse(&leaf_with_text("string", 500));
    assert_eq!(doc.text.len(), 500);

    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["isError"], serde_json::json!(false));
    assert_eq!(json["startPosition"], serde_json::json!({"row": 0, "column": 0}));
    assert!(json.get("endPosition").is_some());
    assert_eq!(json["children"], serde_json::json!({}));
}

#[test]
fn terse_records_error_flag_and_span() {
    let doc = terse(&error_tree());
    let error = doc.children.get("child_0").unwrap();
    assert!(error.is_error);
    assert_eq!(error.start_position, Point::new(0, 0));
    assert_eq!(error.end_position, Point::new(0, 5));
    assert_eq!(doc.end_position, Point::new(1, 0));
}

#[test]
fn serialize_dispatches_on_mode() {
    let tree = assignment_tree();
    assert!(matches!(
        serialize(&&tree, SerializeMode::from_terse(true)),
        SerializedNode::Terse(_)
    ));
    assert!(matches!(
        serialize(&&tree, SerializeMode::from_terse(false)),
        SerializedNode::Verbose(_)
    ));
}

#[test]
fn serialization_is_deterministic() {
    let tree = repeated_field_tree();
    for mode in [SerializeMode::Verbose, SerializeMode::Terse] {
        let first = to_pretty_json(&serialize(&&tree, mode)).unwrap();
        let second = to_pretty_json(&serialize(&&tree, mode)).unwrap();
        assert_eq!(first, second);
    }
}

// ===== Deep trees =====

#[test]
fn deep_chain_serializes_in_both_modes() {
    let chain = deep_chain(100_000);

    let doc = verbose(&chain);
    assert_eq!(doc.node_type, "level_99999");
    let compact = serde_json::to_string(&doc).unwrap();
    assert_eq!(compact.matches("\"child_0\"").count(), 99_999);

    let doc = terse(&chain);
    let compact = serde_json::to_string(&doc).unwrap();
    assert_eq!(compact.matches("\"isError\"").count(), 100_000);
}

#[test]
fn pretty_json_of_deep_tree_fits_a_small_thread_stack() {
    // Pretty output is quadratic in depth; a small stack stands in for a deeper tree
    let worker = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let chain = deep_chain(1_000);
            let text = to_pretty_json(&serialize(&&chain, SerializeMode::Verbose)).unwrap();
            text.matches("\"type\"").count()
        })
        .unwrap();
    assert_eq!(worker.join().unwrap(), 1_000);
}
