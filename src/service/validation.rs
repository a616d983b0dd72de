//! Payload validation: turns a decoded request body into typed input or per-field errors.

use crate::error::{FieldErrors, NON_FIELD_ERRORS};
use crate::model::StudentInput;
use serde_json::{Map, Value};

/// Rules for one text field.
#[derive(Clone, Copy, Debug)]
pub struct TextRule {
    pub name: &'static str,
    pub max_length: Option<usize>,
    /// Strip surrounding whitespace before the blank and length checks.
    pub trim: bool,
}

/// Column widths of the `students` table.
pub const STUDENT_FIELDS: [TextRule; 3] = [
    TextRule { name: "student_id", max_length: Some(20), trim: true },
    TextRule { name: "name", max_length: Some(50), trim: true },
    TextRule { name: "age", max_length: Some(10), trim: true },
];

pub const CREDENTIAL_FIELDS: [TextRule; 2] = [
    TextRule { name: "username", max_length: None, trim: true },
    TextRule { name: "password", max_length: None, trim: false },
];

/// Validate one text field. Numbers are accepted and rendered as text.
pub fn text_field(body: &Map<String, Value>, rule: &TextRule) -> Result<String, String> {
    let raw = match body.get(rule.name) {
        None => return Err("This field is required.".into()),
        Some(Value::Null) => return Err("This field may not be null.".into()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err("Not a valid string.".into()),
    };
    let value = if rule.trim { raw.trim().to_string() } else { raw };
    if value.is_empty() {
        return Err("This field may not be blank.".into());
    }
    if let Some(max) = rule.max_length {
        if value.chars().count() > max {
            return Err(format!("Ensure this field has no more than {} characters.", max));
        }
    }
    Ok(value)
}

/// Require `body` to be an object; otherwise report it under `non_field_errors`.
pub fn expect_object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_kind(other)
            ),
        )),
    }
}

/// Validate every rule, collecting all failures before returning.
pub fn validate_fields<const N: usize>(
    body: &Value,
    rules: &[TextRule; N],
) -> Result<[String; N], FieldErrors> {
    let map = expect_object(body)?;
    let mut errors = FieldErrors::new();
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, rule) in values.iter_mut().zip(rules.iter()) {
        match text_field(map, rule) {
            Ok(v) => *slot = v,
            Err(message) => errors.add(rule.name, message),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Validates student payloads. Outgoing records serialize straight from [`crate::model::Student`].
pub struct StudentSerializer;

impl StudentSerializer {
    /// Full validation: every writable field must be present. `id` and unknown keys are ignored.
    pub fn validate(body: &Value) -> Result<StudentInput, FieldErrors> {
        let [student_id, name, age] = validate_fields(body, &STUDENT_FIELDS)?;
        Ok(StudentInput { student_id, name, age })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_payload() {
        let input = StudentSerializer::validate(&json!({
            "student_id": "1", "name": "홍길동", "age": "33"
        }))
        .unwrap();
        assert_eq!(input.name, "홍길동");
        assert_eq!(input.age, "33");
    }

    #[test]
    fn ignores_id_and_unknown_keys() {
        let input = StudentSerializer::validate(&json!({
            "id": 99, "student_id": "7", "name": "a", "age": "1", "extra": true
        }))
        .unwrap();
        assert_eq!(input.into_student(3).id, 3);
    }

    #[test]
    fn reports_every_missing_field_in_order() {
        let errors = StudentSerializer::validate(&json!({})).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["student_id", "name", "age"]);
        assert_eq!(errors.get("name").unwrap(), ["This field is required."]);
    }

    #[test]
    fn missing_name_only() {
        let errors = StudentSerializer::validate(&json!({"student_id": "1", "age": "33"})).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn null_blank_and_wrong_type() {
        let errors = StudentSerializer::validate(&json!({
            "student_id": null, "name": "   ", "age": [1]
        }))
        .unwrap_err();
        assert_eq!(errors.get("student_id").unwrap(), ["This field may not be null."]);
        assert_eq!(errors.get("name").unwrap(), ["This field may not be blank."]);
        assert_eq!(errors.get("age").unwrap(), ["Not a valid string."]);
    }

    #[test]
    fn numbers_become_text_and_strings_are_trimmed() {
        let input = StudentSerializer::validate(&json!({
            "student_id": 12, "name": "  Dokdo ", "age": 28
        }))
        .unwrap();
        assert_eq!(input.student_id, "12");
        assert_eq!(input.name, "Dokdo");
        assert_eq!(input.age, "28");
    }

    #[test]
    fn enforces_max_length_in_characters() {
        let ok = "가".repeat(50);
        assert!(StudentSerializer::validate(&json!({"student_id": "1", "name": ok, "age": "1"})).is_ok());
        let errors = StudentSerializer::validate(&json!({
            "student_id": "1", "name": "x".repeat(51), "age": "1"
        }))
        .unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            ["Ensure this field has no more than 50 characters."]
        );
    }

    #[test]
    fn non_object_payload() {
        let errors = StudentSerializer::validate(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.get(NON_FIELD_ERRORS).unwrap(),
            ["Invalid data. Expected a dictionary, but got list."]
        );
    }

    #[test]
    fn password_is_not_trimmed() {
        let [username, password] =
            validate_fields(&json!({"username": " admin ", "password": " pw "}), &CREDENTIAL_FIELDS).unwrap();
        assert_eq!(username, "admin");
        assert_eq!(password, " pw ");
    }
}
