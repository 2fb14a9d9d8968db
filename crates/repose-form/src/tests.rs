#[cfg(test)]
mod tests {
    use crate::path::{self, Segment, is_falsy};
    use crate::schema::*;
    use crate::store::*;
    use crate::validation::*;
    use repose_core::create_effect;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::rc::Rc;

    fn empty() -> Value {
        json!({})
    }

    #[test]
    fn test_segment_kinds() {
        assert_eq!(Segment::parse("name"), Segment::Key("name"));
        assert_eq!(Segment::parse("0"), Segment::Index(0));
        assert_eq!(Segment::parse("00"), Segment::Index(0));
        assert_eq!(Segment::parse("007"), Segment::Index(7));
        assert_eq!(Segment::parse(""), Segment::Key(""));
        assert_eq!(Segment::parse("-1"), Segment::Key("-1"));
        assert_eq!(Segment::parse("1e2"), Segment::Key("1e2"));
        assert_eq!(
            Segment::parse("99999999999999999999999999"),
            Segment::Key("99999999999999999999999999")
        );
    }

    #[test]
    fn test_set_creates_mappings_for_keys() {
        let mut root = empty();
        path::set(&mut root, "a.b.c", json!("v"));
        assert_eq!(path::get(&root, "a.b.c"), Some(&json!("v")));
        assert!(root["a"].is_object());
        assert!(root["a"]["b"].is_object());
    }

    #[test]
    fn test_set_creates_sequence_before_index() {
        let mut root = empty();
        path::set(&mut root, "a.0.c", json!("v"));
        insta::assert_snapshot!(root.to_string(), @r#"{"a":[{"c":"v"}]}"#);
    }

    #[test]
    fn test_leading_index_segment() {
        let mut root = empty();
        path::set(&mut root, "0.name", json!("x"));
        // The root itself is a mapping, so the index is stored as a key.
        assert_eq!(root, json!({ "0": { "name": "x" } }));
        assert_eq!(path::get(&root, "0.name"), Some(&json!("x")));
    }

    #[test]
    fn test_leading_zeros_address_the_same_slot() {
        let mut root = empty();
        path::set(&mut root, "a.00.b", json!(1));
        assert_eq!(root, json!({ "a": [{ "b": 1 }] }));
        assert_eq!(path::get(&root, "a.0.b"), Some(&json!(1)));
    }

    #[test]
    fn test_sparse_index_pads_with_null() {
        let mut root = empty();
        path::set(&mut root, "random.2", json!("why??"));
        assert_eq!(root, json!({ "random": [null, null, "why??"] }));
        assert_eq!(path::get(&root, "random.0"), None);
        assert_eq!(path::get(&root, "random.2"), Some(&json!("why??")));
    }

    #[test]
    fn test_get_missing_is_none() {
        let root = json!({ "a": { "b": null } });
        assert_eq!(path::get(&root, "x"), None);
        assert_eq!(path::get(&root, "x.y.z"), None);
        assert_eq!(path::get(&root, "a.b"), None);
        assert_eq!(path::get(&root, "a.b.c"), None);
    }

    #[test]
    fn test_falsy_intermediate_is_replaced() {
        let mut root = json!({ "a": "" });
        path::set(&mut root, "a.b", json!("v"));
        assert_eq!(root, json!({ "a": { "b": "v" } }));
    }

    #[test]
    fn test_write_through_scalar_is_dropped() {
        let mut root = json!({ "a": "text" });
        path::set(&mut root, "a.b", json!("v"));
        assert_eq!(root, json!({ "a": "text" }));

        let mut root = json!({ "list": ["x"] });
        path::set(&mut root, "list.name", json!("v"));
        assert_eq!(root, json!({ "list": ["x"] }));
    }

    #[test]
    fn test_disjoint_names_do_not_interfere() {
        let mut root = empty();
        path::set(&mut root, "cousine.0.name", json!("one"));
        path::set(&mut root, "cousine.1.name", json!("two"));
        path::set(&mut root, "fname", json!("John"));
        assert_eq!(path::get(&root, "cousine.0.name"), Some(&json!("one")));
        assert_eq!(path::get(&root, "cousine.1.name"), Some(&json!("two")));
        assert_eq!(path::get(&root, "fname"), Some(&json!("John")));
    }

    #[test]
    fn test_falsiness() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&json!("")));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!(false)));
        assert!(!is_falsy(&json!("0")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
    }

    #[test]
    fn test_error_map_absent_and_none_are_valid() {
        let mut errors = ErrorMap::new();
        assert!(errors.is_valid("fname"));
        errors.set("fname", None);
        assert!(errors.is_valid("fname"));
        assert!(!errors.has_errors());
        errors.set("fname", Some("too short".into()));
        assert_eq!(errors.message("fname"), Some("too short"));
        assert_eq!(errors.invalid_fields().collect::<Vec<_>>(), vec!["fname"]);
    }

    #[test]
    fn test_error_store_notifies_only_on_change() {
        let store = ErrorStore::new();
        let runs = Rc::new(Cell::new(0));
        let _d = create_effect({
            let store = store.clone();
            let runs = runs.clone();
            move || {
                let _ = store.get();
                runs.set(runs.get() + 1);
            }
        });

        assert!(store.merge("fname", Some("bad".into())));
        assert!(!store.merge("fname", Some("bad".into())));
        assert_eq!(runs.get(), 2);
        assert!(store.merge("fname", None));
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_form_store_always_notifies() {
        let store = FormStore::new();
        let runs = Rc::new(Cell::new(0));
        let _d = create_effect({
            let store = store.clone();
            let runs = runs.clone();
            move || {
                let _ = store.get("fname");
                runs.set(runs.get() + 1);
            }
        });

        store.set("fname", json!("same"));
        store.set("fname", json!("same"));
        assert_eq!(runs.get(), 3);
        assert_eq!(store.snapshot(), json!({ "fname": "same" }));
    }

    fn signup_schema() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "minLength": 1, "maxLength": 50 },
                "fname": { "type": "string", "minLength": 4, "maxLength": 20 },
                "note": { "type": "string", "minLength": 1 }
            },
            "required": ["address", "fname", "note"]
        }))
        .unwrap()
    }

    fn cousine_schema() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "cousine": {
                    "type": "array",
                    "items": { "$ref": "#/$defs/cousine" }
                },
                "fname": { "type": "string", "minLength": 4 }
            },
            "$defs": {
                "cousine": {
                    "type": "object",
                    "properties": { "name": { "type": "string", "minLength": 1 } }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_length_rules_report_readable_messages() {
        let schema = signup_schema();
        let issues = schema
            .validate(&json!({ "fname": "Jo", "address": "x", "note": "n" }))
            .unwrap_err();
        assert_eq!(
            issues,
            vec![Issue {
                path: vec![PathItem::Key("fname".into())],
                message: "String must contain at least 4 character(s)".into(),
            }]
        );

        let long = "x".repeat(21);
        let issues = schema
            .validate(&json!({ "fname": long, "address": "x", "note": "n" }))
            .unwrap_err();
        assert_eq!(issues[0].message, "String must contain at most 20 character(s)");
    }

    #[test]
    fn test_missing_field_is_reported_under_its_own_name() {
        let issues = signup_schema()
            .validate(&json!({ "fname": "John", "note": "n" }))
            .unwrap_err();
        assert_eq!(
            issues,
            vec![Issue {
                path: vec![PathItem::Key("address".into())],
                message: "Required".into(),
            }]
        );
    }

    #[test]
    fn test_type_mismatch_keeps_the_validator_message() {
        let issues = signup_schema()
            .validate(&json!({ "fname": 12, "address": "x", "note": "n" }))
            .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec![PathItem::Key("fname".into())]);
        assert!(issues[0].message.contains("string"));
    }

    #[test]
    fn test_nested_paths_in_issues() {
        let issues = cousine_schema()
            .validate(&json!({ "fname": "John", "cousine": [{ "name": "a" }, { "name": "" }] }))
            .unwrap_err();
        assert_eq!(
            issues[0].path,
            vec![
                PathItem::Key("cousine".into()),
                PathItem::Index(1),
                PathItem::Key("name".into())
            ]
        );
    }

    #[test]
    fn test_schema_construction_errors() {
        assert_eq!(
            JsonSchema::new(json!({ "type": "string" })).unwrap_err(),
            SchemaError::NotAnObject
        );
        assert!(matches!(
            JsonSchema::new(json!({ "type": "object", "properties": {}, "minLength": "four" })),
            Err(SchemaError::Invalid(_))
        ));
    }

    #[test]
    fn test_pick_keeps_only_the_named_property() {
        let schema = signup_schema();
        let picked = schema.pick("fname");
        // Siblings are neither required nor checked.
        assert!(picked.validate(&json!({ "fname": "John" })).is_ok());
        assert_eq!(
            picked.validate(&json!({})).unwrap_err()[0].message,
            "Required"
        );

        let unknown = schema.pick("lname");
        assert!(unknown.validate(&json!({ "lname": "" })).is_ok());
        assert_eq!(
            schema.source()["properties"]["fname"]["minLength"],
            json!(4)
        );
    }

    #[test]
    fn test_pick_resolves_shared_definitions() {
        let picked = cousine_schema().pick("cousine");
        assert!(
            picked
                .validate(&json!({ "cousine": [{ "name": "" }] }))
                .is_err()
        );
    }

    #[test]
    fn test_validate_field_sees_only_its_own_rule() {
        let validator = Validator::new(signup_schema());
        assert_eq!(
            validator.validate_field("fname", "Jo").as_deref(),
            Some("String must contain at least 4 character(s)")
        );
        assert_eq!(validator.validate_field("fname", "John"), None);
        // Not in the schema: nothing to check.
        assert_eq!(validator.validate_field("lname", ""), None);
        assert_eq!(validator.validate_field("cousine.0.name", ""), None);
    }

    #[test]
    fn test_validate_form_reports_every_issue_by_top_level_field() {
        let validator = Validator::new(cousine_schema());

        let issues = validator
            .validate_form(&json!({ "fname": "", "cousine": [{ "name": "" }] }))
            .unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(issues.contains(&FieldIssue {
            field: "fname".into(),
            message: "String must contain at least 4 character(s)".into()
        }));
        assert!(issues.contains(&FieldIssue {
            field: "cousine".into(),
            message: "String must contain at least 1 character(s)".into()
        }));
        assert!(
            validator
                .validate_form(&json!({ "fname": "John", "cousine": [] }))
                .is_ok()
        );
    }
}
