//! # Shape Library
//!
//! The shared JSON Schema documents (Draft 2020-12) that operators compile
//! into [`CompiledShape`](crate::CompiledShape)s at construction time.
//! Each function returns a fresh schema document; callers compile once and
//! keep the compiled form.
//!
//! Conventions:
//!
//! - "primitive" means string, number, or boolean — the only scalar types
//!   rule conditions compare.
//! - Object shapes close over their declared properties
//!   (`additionalProperties: false`) wherever the source of the value is
//!   the rule store; case-data shapes stay open because vendor payloads
//!   carry fields the engine does not model.

use serde_json::{json, Value};

/// A single primitive: string, number, or boolean.
pub fn primitive() -> Value {
    json!({ "type": ["string", "number", "boolean"] })
}

/// An array of primitives.
pub fn primitive_array() -> Value {
    json!({
        "type": "array",
        "items": { "type": ["string", "number", "boolean"] }
    })
}

/// A primitive or an array of primitives (case-insensitive membership
/// accepts either on the data side).
pub fn primitive_or_array() -> Value {
    json!({
        "anyOf": [primitive(), primitive_array()]
    })
}

/// A number.
pub fn number() -> Value {
    json!({ "type": "number" })
}

/// A non-empty string.
pub fn non_empty_string() -> Value {
    json!({ "type": "string", "minLength": 1 })
}

/// An array of strings.
pub fn string_array() -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" }
    })
}

/// Inclusive range condition: `{min, max}`.
pub fn range() -> Value {
    json!({
        "type": "object",
        "properties": {
            "min": { "type": "number" },
            "max": { "type": "number" }
        },
        "required": ["min", "max"],
        "additionalProperties": false
    })
}

/// Recency window condition: `{years}`.
pub fn year_window() -> Value {
    json!({
        "type": "object",
        "properties": {
            "years": { "type": "integer", "minimum": 1, "maximum": 200 }
        },
        "required": ["years"],
        "additionalProperties": false
    })
}

/// Sanctions category condition: `{category, threshold?}`.
pub fn category_threshold() -> Value {
    json!({
        "type": "object",
        "properties": {
            "category": { "type": "string", "minLength": 1 },
            "threshold": { "type": "integer", "minimum": 1 }
        },
        "required": ["category"],
        "additionalProperties": false
    })
}

/// Nested sub-condition envelope for AML checks: `{operator, value}` with
/// an optional (or, for v1, required) child workflow reference.
pub fn nested_condition(require_child_workflow: bool) -> Value {
    let mut required = vec!["operator", "value"];
    if require_child_workflow {
        required.push("childWorkflowName");
    }
    json!({
        "type": "object",
        "properties": {
            "operator": { "type": "string", "minLength": 1 },
            "value": true,
            "childWorkflowName": { "type": "string", "minLength": 1 }
        },
        "required": required,
        "additionalProperties": false
    })
}

/// Child workflow reference condition: `{childWorkflowName}`.
pub fn child_workflow_reference() -> Value {
    json!({
        "type": "object",
        "properties": {
            "childWorkflowName": { "type": "string", "minLength": 1 }
        },
        "required": ["childWorkflowName"],
        "additionalProperties": false
    })
}

/// The sub-run map under `childWorkflows.<name>`: an object with at least
/// one run. The `minProperties` refinement is what distinguishes "present
/// but empty" from "missing key" in diagnostics.
pub fn child_workflow_runs() -> Value {
    json!({
        "type": "object",
        "minProperties": 1
    })
}

/// Company sanctions plugin output: an array of entries, each carrying an
/// entity with sourced category lists. Open to extra vendor fields.
pub fn sanctions_data() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "entity": {
                    "type": "object",
                    "properties": {
                        "sources": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "categories": {
                                        "type": "array",
                                        "items": { "type": "string" }
                                    }
                                }
                            }
                        }
                    },
                    "required": ["sources"]
                }
            },
            "required": ["entity"]
        }
    })
}

/// Collected UBO declarations from the case's additional info.
pub fn collected_ubos() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "firstName": { "type": "string" },
                "lastName": { "type": "string" }
            },
            "required": ["firstName", "lastName"]
        }
    })
}

/// Registry-sourced ownership graph nodes. Only the discriminating `type`
/// is required here; person nodes are further checked with
/// [`person_node`] after filtering.
pub fn registry_ubo_nodes() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "type": { "type": "string" }
            },
            "required": ["type"]
        }
    })
}

/// A registry node of type PERSON, which must carry a person name.
pub fn person_node() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": { "const": "PERSON" },
            "firstName": { "type": "string" },
            "lastName": { "type": "string" }
        },
        "required": ["type", "firstName", "lastName"]
    })
}

/// The normalized UBO roster pair produced by extraction: both sides
/// sorted, one normalized full name per entry.
pub fn name_roster_report() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collected": string_array(),
            "registry": string_array()
        },
        "required": ["collected", "registry"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompiledShape;

    fn compiled(name: &str, schema: &Value) -> CompiledShape {
        CompiledShape::compile(name, schema).expect("shape compiles")
    }

    #[test]
    fn every_shape_compiles() {
        for (name, schema) in [
            ("primitive", primitive()),
            ("primitive_array", primitive_array()),
            ("primitive_or_array", primitive_or_array()),
            ("number", number()),
            ("non_empty_string", non_empty_string()),
            ("string_array", string_array()),
            ("range", range()),
            ("year_window", year_window()),
            ("category_threshold", category_threshold()),
            ("nested_condition", nested_condition(false)),
            ("nested_condition_v1", nested_condition(true)),
            ("child_workflow_reference", child_workflow_reference()),
            ("child_workflow_runs", child_workflow_runs()),
            ("sanctions_data", sanctions_data()),
            ("collected_ubos", collected_ubos()),
            ("registry_ubo_nodes", registry_ubo_nodes()),
            ("person_node", person_node()),
            ("name_roster_report", name_roster_report()),
        ] {
            CompiledShape::compile(name, &schema)
                .unwrap_or_else(|e| panic!("shape '{name}' failed to compile: {e}"));
        }
    }

    #[test]
    fn primitive_accepts_scalars_rejects_containers() {
        let shape = compiled("primitive", &primitive());
        assert!(shape.is_valid(&json!("x")));
        assert!(shape.is_valid(&json!(4.2)));
        assert!(shape.is_valid(&json!(true)));
        assert!(!shape.is_valid(&json!(["x"])));
        assert!(!shape.is_valid(&json!({"a": 1})));
        assert!(!shape.is_valid(&json!(null)));
    }

    #[test]
    fn range_requires_both_bounds() {
        let shape = compiled("range", &range());
        assert!(shape.is_valid(&json!({"min": 1, "max": 10})));
        assert!(!shape.is_valid(&json!({"min": 1})));
        assert!(!shape.is_valid(&json!({"min": 1, "max": 10, "step": 2})));
    }

    #[test]
    fn year_window_rejects_zero_years() {
        let shape = compiled("year_window", &year_window());
        assert!(shape.is_valid(&json!({"years": 1})));
        assert!(!shape.is_valid(&json!({"years": 0})));
        assert!(!shape.is_valid(&json!({"years": 1.5})));
    }

    #[test]
    fn category_threshold_defaults_threshold() {
        let shape = compiled("category_threshold", &category_threshold());
        assert!(shape.is_valid(&json!({"category": "Adverse Media"})));
        assert!(shape.is_valid(&json!({"category": "Sanctions", "threshold": 2})));
        assert!(!shape.is_valid(&json!({"threshold": 2})));
        assert!(!shape.is_valid(&json!({"category": ""})));
    }

    #[test]
    fn nested_condition_child_workflow_requirement() {
        let v1 = compiled("nested_condition_v1", &nested_condition(true));
        let v2 = compiled("nested_condition", &nested_condition(false));
        let without_name = json!({"operator": "IN", "value": ["IR"]});
        let with_name = json!({
            "operator": "IN",
            "value": ["IR"],
            "childWorkflowName": "aml_screen"
        });
        assert!(!v1.is_valid(&without_name));
        assert!(v1.is_valid(&with_name));
        assert!(v2.is_valid(&without_name));
        assert!(v2.is_valid(&with_name));
    }

    #[test]
    fn nested_condition_value_may_be_any_json() {
        let shape = compiled("nested_condition", &nested_condition(false));
        assert!(shape.is_valid(&json!({"operator": "EQUALS", "value": {"min": 1, "max": 2}})));
        assert!(shape.is_valid(&json!({"operator": "EQUALS", "value": null})));
    }

    #[test]
    fn child_workflow_runs_distinguishes_empty() {
        let shape = compiled("child_workflow_runs", &child_workflow_runs());
        assert!(shape.is_valid(&json!({"run_1": {}})));
        assert!(!shape.is_valid(&json!({})));
        assert!(!shape.is_valid(&json!([])));
    }

    #[test]
    fn sanctions_data_requires_sourced_entities() {
        let shape = compiled("sanctions_data", &sanctions_data());
        assert!(shape.is_valid(&json!([
            {"entity": {"sources": [{"categories": ["Sanctions"]}]}}
        ])));
        assert!(!shape.is_valid(&json!([{"entity": {}}])));
        assert!(!shape.is_valid(&json!([{"vendorRef": "x"}])));
    }

    #[test]
    fn person_node_requires_names() {
        let shape = compiled("person_node", &person_node());
        assert!(shape.is_valid(&json!({
            "type": "PERSON",
            "firstName": "John",
            "lastName": "Doe"
        })));
        assert!(!shape.is_valid(&json!({"type": "PERSON", "firstName": "John"})));
        assert!(!shape.is_valid(&json!({
            "type": "COMPANY",
            "firstName": "Acme",
            "lastName": "Ltd"
        })));
    }

    #[test]
    fn name_roster_report_shape() {
        let shape = compiled("name_roster_report", &name_roster_report());
        assert!(shape.is_valid(&json!({
            "collected": ["JANE SMITH", "JOHN DOE"],
            "registry": ["JANE SMITH", "JOHN DOE"]
        })));
        assert!(!shape.is_valid(&json!({"collected": ["JOHN DOE"]})));
    }
}
