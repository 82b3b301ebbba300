//! Generic object ⇄ key/value-row codec for category-prefixed settings.
//!
//! # Design
//!
//! - One schema (`SettingsGroup`) per category names the fields, their types,
//!   and their defaults; every settings page goes through the same two
//!   functions.
//! - `encode` is strict: unknown fields and mistyped values fail before any
//!   row is produced, so nothing is written.
//! - `decode` is lenient: foreign rows are skipped, missing fields take their
//!   defaults, and mistyped stored values fall back to the default and are
//!   reported back to the caller.

use serde_json::{Map, Number, Value};

use super::{SettingCategory, SettingType, SettingValue, SettingsError};
use crate::store::Row;

/// Compile-time default for a settings field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// String default.
    Text(&'static str),
    /// Integer default.
    Integer(i64),
    /// Boolean default.
    Flag(bool),
    /// Empty array.
    EmptyArray,
    /// Empty object.
    EmptyObject,
}

impl FieldDefault {
    /// Materialise the default as JSON.
    #[must_use]
    pub fn to_json(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.to_string()),
            Self::Integer(number) => Value::Number(Number::from(number)),
            Self::Flag(flag) => Value::Bool(flag),
            Self::EmptyArray => Value::Array(Vec::new()),
            Self::EmptyObject => Value::Object(Map::new()),
        }
    }
}

/// One declared field of a settings group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Field name without prefix.
    pub name: &'static str,
    /// Declared type.
    pub kind: SettingType,
    /// Value used when the row is missing or mistyped.
    pub default: FieldDefault,
}

impl FieldSpec {
    /// Declare a field.
    #[must_use]
    pub const fn new(name: &'static str, kind: SettingType, default: FieldDefault) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }
}

/// Schema for one settings category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsGroup {
    /// Category stored on every row.
    pub category: SettingCategory,
    /// Key prefix prepended to each field name (may be empty).
    pub prefix: &'static str,
    /// Declared fields, in display order.
    pub fields: &'static [FieldSpec],
}

impl SettingsGroup {
    /// Stored key for `field`.
    #[must_use]
    pub fn key(&self, field: &str) -> String {
        format!("{}{field}", self.prefix)
    }

    /// Look up a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Object holding every field at its default.
    #[must_use]
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.to_string(), field.default.to_json()))
            .collect()
    }
}

/// Decoded settings object plus the fields whose stored value was unusable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    /// Every declared field, stored or defaulted.
    pub object: Map<String, Value>,
    /// Fields whose stored value did not match the schema.
    pub mismatched: Vec<String>,
}

/// Turn a settings object into one row per field.
///
/// Rows follow schema order so writes are deterministic.
///
/// # Errors
///
/// Returns [`SettingsError::UnknownField`] or [`SettingsError::TypeMismatch`]
/// without producing any row.
pub fn encode(group: &SettingsGroup, object: &Map<String, Value>) -> Result<Vec<Row>, SettingsError> {
    if let Some(unknown) = object.keys().find(|name| group.field(name).is_none()) {
        return Err(SettingsError::UnknownField {
            category: group.category,
            field: unknown.clone(),
        });
    }

    let mut rows = Vec::with_capacity(object.len());
    for field in group.fields {
        let Some(raw) = object.get(field.name) else {
            continue;
        };
        let value = SettingValue::from_json(raw.clone())
            .filter(|value| field.kind.accepts(value))
            .ok_or_else(|| SettingsError::TypeMismatch {
                category: group.category,
                field: field.name.to_string(),
                expected: field.kind,
            })?;

        let mut row = Row::new();
        row.insert("key".into(), Value::String(group.key(field.name)));
        row.insert("value".into(), value.into_json());
        row.insert(
            "category".into(),
            Value::String(group.category.as_str().to_string()),
        );
        row.insert("type".into(), Value::String(field.kind.as_str().to_string()));
        row.insert(
            "description".into(),
            Value::String(format!("{} {}", group.category.label(), field.name)),
        );
        rows.push(row);
    }
    Ok(rows)
}

/// Fold settings rows back into an object keyed by field name.
#[must_use]
pub fn decode(group: &SettingsGroup, rows: &[Row]) -> Decoded {
    let mut decoded = Decoded {
        object: group.defaults(),
        mismatched: Vec::new(),
    };

    for row in rows {
        let category = row.get("category").and_then(Value::as_str);
        if category.is_some_and(|category| category != group.category.as_str()) {
            continue;
        }
        let Some(name) = row
            .get("key")
            .and_then(Value::as_str)
            .and_then(|key| key.strip_prefix(group.prefix))
        else {
            continue;
        };
        let Some(field) = group.field(name) else {
            continue;
        };

        let value = row
            .get("value")
            .cloned()
            .and_then(SettingValue::from_json)
            .filter(|value| field.kind.accepts(value));
        match value {
            Some(value) => {
                decoded.object.insert(field.name.to_string(), value.into_json());
            }
            None => decoded.mismatched.push(field.name.to_string()),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_FIELDS: &[FieldSpec] = &[
        FieldSpec::new("a", SettingType::Text, FieldDefault::Text("")),
        FieldSpec::new("b", SettingType::Number, FieldDefault::Integer(0)),
    ];

    const SAMPLE: SettingsGroup = SettingsGroup {
        category: SettingCategory::Hero,
        prefix: "hero_",
        fields: SAMPLE_FIELDS,
    };

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let original = object(json!({"a": "x", "b": 5}));
        let rows = encode(&SAMPLE, &original).expect("encode");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["key"], "hero_a");
        assert_eq!(rows[1]["key"], "hero_b");
        assert_eq!(rows[0]["description"], "Hero a");
        assert_eq!(rows[1]["type"], "number");

        let decoded = decode(&SAMPLE, &rows);
        assert_eq!(decoded.object, original);
        assert!(decoded.mismatched.is_empty());
    }

    #[test]
    fn encode_rejects_unknown_fields_and_mismatches() {
        let unknown = encode(&SAMPLE, &object(json!({"a": "x", "c": 1})));
        assert!(matches!(
            unknown,
            Err(SettingsError::UnknownField { ref field, .. }) if field == "c"
        ));

        let mistyped = encode(&SAMPLE, &object(json!({"b": "five"})));
        assert!(matches!(
            mistyped,
            Err(SettingsError::TypeMismatch {
                expected: SettingType::Number,
                ..
            })
        ));
    }

    #[test]
    fn decode_skips_foreign_rows_and_defaults_missing_fields() {
        let rows = vec![
            object(json!({"key": "hero_a", "value": "kept", "category": "hero"})),
            object(json!({"key": "navbar_a", "value": "other prefix", "category": "hero"})),
            object(json!({"key": "hero_b", "value": 9, "category": "navbar"})),
            object(json!({"key": "hero_z", "value": 1, "category": "hero"})),
        ];
        let decoded = decode(&SAMPLE, &rows);
        assert_eq!(decoded.object, object(json!({"a": "kept", "b": 0})));
    }

    #[test]
    fn decode_reports_mistyped_values() {
        let rows = vec![object(
            json!({"key": "hero_b", "value": "NaN", "category": "hero"}),
        )];
        let decoded = decode(&SAMPLE, &rows);
        assert_eq!(decoded.object["b"], json!(0));
        assert_eq!(decoded.mismatched, vec!["b".to_string()]);
    }

    #[test]
    fn empty_prefix_uses_bare_field_names() {
        const BARE: SettingsGroup = SettingsGroup {
            category: SettingCategory::Theme,
            prefix: "",
            fields: SAMPLE_FIELDS,
        };
        assert_eq!(BARE.key("a"), "a");
        let rows = encode(&BARE, &object(json!({"a": "y"}))).expect("encode");
        assert_eq!(rows[0]["key"], "a");
        assert_eq!(rows[0]["category"], "theme");
    }
}
