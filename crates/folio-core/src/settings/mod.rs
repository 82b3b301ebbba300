//! Site settings: the key/value codec, the typed settings documents, and the
//! service that loads and saves them through a content store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::store::StoreError;

pub mod codec;
pub mod documents;
mod service;

pub use codec::{Decoded, FieldDefault, FieldSpec, SettingsGroup, decode, encode};
pub use documents::{
    AvailabilityColor, HeroSettings, HeroStats, HeroStatsLabels, NavbarSettings,
    ProfileSettings, SettingsDocument, SiteMetadata, ThemeSettings,
};
pub use service::{SaveReport, SectionUpdate, SettingsService};

/// Errors raised while encoding, decoding, or persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The object names a field the group schema does not declare.
    #[error("unknown settings field")]
    UnknownField {
        /// Settings category.
        category: SettingCategory,
        /// Offending field.
        field: String,
    },
    /// A value does not match the declared field type.
    #[error("settings value has the wrong type")]
    TypeMismatch {
        /// Settings category.
        category: SettingCategory,
        /// Offending field.
        field: String,
        /// Declared type.
        expected: SettingType,
    },
    /// A typed document could not be converted to or from its object form.
    #[error("settings document could not be converted")]
    Document {
        /// Settings category.
        category: SettingCategory,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// The content store failed.
    #[error("settings store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
}

/// Category tag grouping settings rows for batch reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SettingCategory {
    /// Hero banner copy and stats.
    Hero,
    /// Owner profile.
    Profile,
    /// Navbar branding.
    Navbar,
    /// Page metadata.
    Metadata,
    /// Colors and dark mode.
    Theme,
}

impl SettingCategory {
    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Profile => "profile",
            Self::Navbar => "navbar",
            Self::Metadata => "metadata",
            Self::Theme => "theme",
        }
    }

    /// Capitalised label used in generated descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Profile => "Profile",
            Self::Navbar => "Navbar",
            Self::Metadata => "Metadata",
            Self::Theme => "Theme",
        }
    }
}

impl fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a settings row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    /// Free text.
    Text,
    /// URL stored as text.
    Url,
    /// Image URL stored as text.
    Image,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl SettingType {
    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Image => "image",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` is the variant this type stores.
    #[must_use]
    pub const fn accepts(self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (Self::Text | Self::Url | Self::Image, SettingValue::String(_))
                | (Self::Number, SettingValue::Number(_))
                | (Self::Boolean, SettingValue::Boolean(_))
                | (Self::Array, SettingValue::Array(_))
                | (Self::Object, SettingValue::Object(_))
        )
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored settings value. Serialized untagged so the stored JSON is the
/// plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean.
    Boolean(bool),
    /// Number, kept exact.
    Number(Number),
    /// String.
    String(String),
    /// Array of arbitrary JSON.
    Array(Vec<Value>),
    /// Object of arbitrary JSON.
    Object(Map<String, Value>),
}

impl SettingValue {
    /// Classify a raw JSON value; `null` has no variant.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(Self::Boolean(flag)),
            Value::Number(number) => Some(Self::Number(number)),
            Value::String(text) => Some(Self::String(text)),
            Value::Array(items) => Some(Self::Array(items)),
            Value::Object(map) => Some(Self::Object(map)),
        }
    }

    /// Raw JSON form.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Boolean(flag) => Value::Bool(flag),
            Self::Number(number) => Value::Number(number),
            Self::String(text) => Value::String(text),
            Self::Array(items) => Value::Array(items),
            Self::Object(map) => Value::Object(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_classify_by_json_shape() {
        assert_eq!(
            SettingValue::from_json(json!("x")),
            Some(SettingValue::String("x".into()))
        );
        assert!(matches!(
            SettingValue::from_json(json!(5)),
            Some(SettingValue::Number(_))
        ));
        assert_eq!(SettingValue::from_json(Value::Null), None);
    }

    #[test]
    fn url_and_image_types_store_strings() {
        let text = SettingValue::String("https://example.com".into());
        assert!(SettingType::Url.accepts(&text));
        assert!(SettingType::Image.accepts(&text));
        assert!(!SettingType::Number.accepts(&text));
        assert!(SettingType::Boolean.accepts(&SettingValue::Boolean(false)));
    }

    #[test]
    fn untagged_serialization_is_the_plain_value() {
        let value: SettingValue = serde_json::from_value(json!({"years": 3})).expect("parse");
        assert!(matches!(value, SettingValue::Object(_)));
        assert_eq!(
            serde_json::to_value(&value).expect("serialize"),
            json!({"years": 3})
        );
    }
}
