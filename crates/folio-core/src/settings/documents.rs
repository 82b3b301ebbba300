//! Typed settings documents and their group schemas.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::codec::{FieldDefault, FieldSpec, SettingsGroup};
use super::{SettingCategory, SettingType, SettingsError};

/// A typed view over one settings group.
pub trait SettingsDocument: Serialize + DeserializeOwned + Default + Send + Sync {
    /// Schema the document is encoded with.
    const GROUP: SettingsGroup;

    /// Convert to the codec's object form.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Document`] if the document does not serialize
    /// to an object.
    fn to_object(&self) -> Result<Map<String, Value>, SettingsError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(SettingsError::Document {
                category: Self::GROUP.category,
                source: <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected object, found {other}"
                )),
            }),
            Err(source) => Err(SettingsError::Document {
                category: Self::GROUP.category,
                source,
            }),
        }
    }

    /// Build from the codec's object form.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Document`] when a field does not fit the
    /// typed document (for example an unknown availability color).
    fn from_object(object: Map<String, Value>) -> Result<Self, SettingsError> {
        serde_json::from_value(Value::Object(object)).map_err(|source| SettingsError::Document {
            category: Self::GROUP.category,
            source,
        })
    }
}

/// Availability pill color in the hero banner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityColor {
    /// Available.
    #[default]
    Green,
    /// Partly available.
    Orange,
    /// Unavailable.
    Red,
}

/// Counters shown in the hero banner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeroStats {
    /// Project count.
    pub projects: i64,
    /// Skill count.
    pub skills: i64,
    /// Years of experience.
    pub years: i64,
}

/// Labels under the hero counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeroStatsLabels {
    /// Label for years.
    pub years: String,
    /// Label for projects.
    pub projects: String,
    /// Label for skills.
    pub skills: String,
}

/// Hero banner copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeroSettings {
    /// Greeting line.
    pub greeting: String,
    /// Main title.
    pub title: String,
    /// Tagline under the title.
    pub tagline: String,
    /// Availability text.
    pub availability: String,
    /// Availability pill color.
    pub availability_color: AvailabilityColor,
    /// Counters.
    pub stats: HeroStats,
    /// Counter labels.
    pub stats_labels: HeroStatsLabels,
    /// Call-to-action text.
    pub cta_text: String,
    /// Call-to-action target.
    pub cta_href: String,
}

const HERO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("greeting", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("title", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("tagline", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("availability", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new(
        "availability_color",
        SettingType::Text,
        FieldDefault::Text("green"),
    ),
    FieldSpec::new("stats", SettingType::Object, FieldDefault::EmptyObject),
    FieldSpec::new("stats_labels", SettingType::Object, FieldDefault::EmptyObject),
    FieldSpec::new("cta_text", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("cta_href", SettingType::Url, FieldDefault::Text("")),
];

impl SettingsDocument for HeroSettings {
    const GROUP: SettingsGroup = SettingsGroup {
        category: SettingCategory::Hero,
        prefix: "hero_",
        fields: HERO_FIELDS,
    };
}

/// Owner profile shown in the hero and used for contact links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileSettings {
    /// Full name.
    pub name: String,
    /// Job title.
    pub title: String,
    /// Short biography.
    pub bio: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// City or region.
    pub location: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Résumé URL.
    pub resume_url: String,
    /// Initials shown when no avatar is set.
    pub initials: String,
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("title", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("bio", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("email", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("phone", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("location", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("avatar_url", SettingType::Image, FieldDefault::Text("")),
    FieldSpec::new("resume_url", SettingType::Url, FieldDefault::Text("")),
    FieldSpec::new("initials", SettingType::Text, FieldDefault::Text("")),
];

impl SettingsDocument for ProfileSettings {
    const GROUP: SettingsGroup = SettingsGroup {
        category: SettingCategory::Profile,
        prefix: "",
        fields: PROFILE_FIELDS,
    };
}

/// Navbar branding and call to action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavbarSettings {
    /// Short logo text.
    pub logo_text: String,
    /// Site name next to the logo.
    pub site_name: String,
    /// Call-to-action text.
    pub cta_text: String,
    /// Call-to-action target.
    pub cta_href: String,
}

const NAVBAR_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("logo_text", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("site_name", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("cta_text", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("cta_href", SettingType::Url, FieldDefault::Text("")),
];

impl SettingsDocument for NavbarSettings {
    const GROUP: SettingsGroup = SettingsGroup {
        category: SettingCategory::Navbar,
        prefix: "navbar_",
        fields: NAVBAR_FIELDS,
    };
}

/// Document metadata (title, description, language).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteMetadata {
    /// Document title.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Document language.
    pub language: String,
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            language: "fr".to_string(),
        }
    }
}

const METADATA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("description", SettingType::Text, FieldDefault::Text("")),
    FieldSpec::new("language", SettingType::Text, FieldDefault::Text("fr")),
];

impl SettingsDocument for SiteMetadata {
    const GROUP: SettingsGroup = SettingsGroup {
        category: SettingCategory::Metadata,
        prefix: "site_",
        fields: METADATA_FIELDS,
    };
}

/// Palette and dark-mode switch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeSettings {
    /// Primary color.
    pub primary_color: String,
    /// Secondary color.
    pub secondary_color: String,
    /// Accent color.
    pub accent_color: String,
    /// Background color.
    pub background_color: String,
    /// Text color.
    pub text_color: String,
    /// Whether visitors may switch to dark mode.
    pub dark_mode_enabled: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#007AFF".to_string(),
            secondary_color: "#5E5CE6".to_string(),
            accent_color: "#FF9500".to_string(),
            background_color: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            dark_mode_enabled: false,
        }
    }
}

const THEME_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("primary_color", SettingType::Text, FieldDefault::Text("#007AFF")),
    FieldSpec::new(
        "secondary_color",
        SettingType::Text,
        FieldDefault::Text("#5E5CE6"),
    ),
    FieldSpec::new("accent_color", SettingType::Text, FieldDefault::Text("#FF9500")),
    FieldSpec::new(
        "background_color",
        SettingType::Text,
        FieldDefault::Text("#FFFFFF"),
    ),
    FieldSpec::new("text_color", SettingType::Text, FieldDefault::Text("#000000")),
    FieldSpec::new(
        "dark_mode_enabled",
        SettingType::Boolean,
        FieldDefault::Flag(false),
    ),
];

impl SettingsDocument for ThemeSettings {
    const GROUP: SettingsGroup = SettingsGroup {
        category: SettingCategory::Theme,
        prefix: "",
        fields: THEME_FIELDS,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::codec::{decode, encode};

    fn roundtrip<D: SettingsDocument + PartialEq + std::fmt::Debug>(document: &D) {
        let object = document.to_object().expect("object");
        let rows = encode(&D::GROUP, &object).expect("encode");
        assert_eq!(rows.len(), D::GROUP.fields.len());
        let decoded = decode(&D::GROUP, &rows);
        assert!(decoded.mismatched.is_empty());
        let back = D::from_object(decoded.object).expect("typed");
        assert_eq!(&back, document);
    }

    #[test]
    fn every_document_covers_its_schema() {
        roundtrip(&HeroSettings {
            greeting: "Salut".into(),
            title: "Builder".into(),
            stats: HeroStats {
                projects: 12,
                skills: 30,
                years: 5,
            },
            availability_color: AvailabilityColor::Orange,
            ..HeroSettings::default()
        });
        roundtrip(&ProfileSettings {
            name: "Nouk Prince".into(),
            initials: "NP".into(),
            ..ProfileSettings::default()
        });
        roundtrip(&NavbarSettings::default());
        roundtrip(&SiteMetadata::default());
        roundtrip(&ThemeSettings {
            dark_mode_enabled: true,
            ..ThemeSettings::default()
        });
    }

    #[test]
    fn defaults_agree_with_schema_defaults() {
        let theme = ThemeSettings::from_object(ThemeSettings::GROUP.defaults()).expect("theme");
        assert_eq!(theme, ThemeSettings::default());
        let hero = HeroSettings::from_object(HeroSettings::GROUP.defaults()).expect("hero");
        assert_eq!(hero, HeroSettings::default());
        let metadata = SiteMetadata::from_object(SiteMetadata::GROUP.defaults()).expect("meta");
        assert_eq!(metadata.language, "fr");
    }

    #[test]
    fn keys_carry_category_prefixes() {
        assert_eq!(HeroSettings::GROUP.key("title"), "hero_title");
        assert_eq!(SiteMetadata::GROUP.key("title"), "site_title");
        assert_eq!(NavbarSettings::GROUP.key("logo_text"), "navbar_logo_text");
        assert_eq!(ProfileSettings::GROUP.key("avatar_url"), "avatar_url");
        assert_eq!(ThemeSettings::GROUP.key("primary_color"), "primary_color");
    }

    #[test]
    fn unknown_availability_color_is_a_document_error() {
        let mut object = HeroSettings::GROUP.defaults();
        object.insert("availability_color".into(), Value::String("purple".into()));
        assert!(matches!(
            HeroSettings::from_object(object),
            Err(SettingsError::Document {
                category: SettingCategory::Hero,
                ..
            })
        ));
    }
}
