//! BDD harness (cucumber-rs).
//!
//! Builders for `orderfix.snapshot.v1` documents used by the scenario steps. Every member gets a
//! doc comment naming its own signature, so a step can check that docs travelled with their
//! declarations.

use serde_json::{Value, json};

/// Public method with the given parameter types.
pub fn method(name: &str, params: &[&str]) -> Value {
    let wire: Vec<Value> = params.iter().map(|t| json!({ "type_name": t })).collect();
    json!({
        "name": name,
        "kind": "method",
        "params": wire,
        "accessibility": "public",
        "decor": {
            "doc_comment": format!("/// {}({})", name, params.join(", ")),
            "leading_blank_lines": 1
        }
    })
}

/// Public parameterless constructor.
pub fn ctor(name: &str) -> Value {
    json!({
        "name": name,
        "kind": "constructor",
        "accessibility": "public",
        "decor": { "doc_comment": format!("/// {}()", name), "leading_blank_lines": 1 }
    })
}

/// Public `int` field.
pub fn field(name: &str, is_const: bool) -> Value {
    json!({
        "name": name,
        "kind": "field",
        "type_name": "int",
        "is_const": is_const,
        "accessibility": "public",
        "decor": { "doc_comment": format!("/// {}", name) }
    })
}

pub fn with_attribute(mut member: Value, attribute: &str) -> Value {
    member["attributes"] = json!([attribute]);
    member
}

/// Open a `#region` in front of `member`.
pub fn open_region(mut member: Value, label: &str) -> Value {
    member["decor"]["region_opens"] = json!([{ "label": label }]);
    member
}

/// Close a `#region` after `member`.
pub fn close_region(mut member: Value, label: &str) -> Value {
    member["decor"]["region_closes"] = json!([{ "label": label }]);
    member
}

pub fn container(name: &str, members: Vec<Value>) -> Value {
    json!({ "name": name, "line": 1, "members": members })
}

pub fn snapshot_document(path: &str, container: Value) -> Value {
    json!({
        "schema": "orderfix.snapshot.v1",
        "path": path,
        "containers": [container],
    })
}
