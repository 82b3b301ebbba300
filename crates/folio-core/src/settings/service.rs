//! Loading and saving settings documents and section configuration.

use folio_events::{ContentAction, Event, EventBus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::codec::{Decoded, SettingsGroup, decode, encode};
use super::documents::SettingsDocument;
use super::{SettingCategory, SettingsError};
use crate::model::{SectionConfig, SectionName};
use crate::store::{BatchOutcome, Direction, Query, Row, SharedContentStore, Table, from_row};

/// Outcome of saving one settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Category written.
    pub category: SettingCategory,
    /// Per-key result of the batch write.
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl SaveReport {
    /// True when every field was persisted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outcome.is_complete()
    }
}

/// Visibility and title edit for one public section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionUpdate {
    /// Section addressed.
    pub section_name: SectionName,
    /// New visibility.
    pub is_visible: bool,
    /// New heading.
    pub display_title: String,
    /// New subtitle, left unchanged when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement section settings, left unchanged when absent.
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
}

/// Reads and writes category-prefixed settings through the content store.
#[derive(Clone)]
pub struct SettingsService {
    store: SharedContentStore,
    events: EventBus,
}

fn store_error(operation: &'static str) -> impl FnOnce(crate::store::StoreError) -> SettingsError {
    move |source| SettingsError::Store { operation, source }
}

impl SettingsService {
    /// Build a service over `store`, publishing saves on `events`.
    #[must_use]
    pub const fn new(store: SharedContentStore, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Fetch and decode the rows of one group.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Store`] when the rows cannot be fetched.
    pub async fn load_group(&self, group: &SettingsGroup) -> Result<Decoded, SettingsError> {
        let query = Query::from(Table::SiteSettings)
            .eq("category", group.category.as_str())
            .order("key", Direction::Asc);
        let rows = self
            .store
            .select(&query)
            .await
            .map_err(store_error("settings.load"))?;
        let decoded = decode(group, &rows);
        if !decoded.mismatched.is_empty() {
            warn!(
                category = %group.category,
                fields = ?decoded.mismatched,
                "stored settings had unexpected types; defaults used"
            );
        }
        Ok(decoded)
    }

    /// Load a typed settings document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Store`] when the rows cannot be fetched and
    /// [`SettingsError::Document`] when the decoded object does not fit `D`.
    pub async fn load<D: SettingsDocument>(&self) -> Result<D, SettingsError> {
        let decoded = self.load_group(&D::GROUP).await?;
        D::from_object(decoded.object)
    }

    /// Encode `document` and upsert one row per field, keyed on `key`.
    ///
    /// Encoding failures abort before any write. Store failures are reported
    /// per key in the returned [`SaveReport`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownField`], [`SettingsError::TypeMismatch`]
    /// or [`SettingsError::Document`] when the document cannot be encoded.
    pub async fn save<D: SettingsDocument>(&self, document: &D) -> Result<SaveReport, SettingsError> {
        let object = document.to_object()?;
        self.save_object(&D::GROUP, &object).await
    }

    /// Encode and persist a raw settings object for `group`.
    ///
    /// # Errors
    ///
    /// Same as [`SettingsService::save`].
    pub async fn save_object(
        &self,
        group: &SettingsGroup,
        object: &Map<String, Value>,
    ) -> Result<SaveReport, SettingsError> {
        let rows = encode(group, object)?;
        let outcome = self.store.upsert_batch(Table::SiteSettings, rows, "key").await;

        if outcome.applied.is_empty() {
            warn!(category = %group.category, "settings save wrote nothing");
        } else {
            self.events.publish(Event::SettingsSaved {
                category: group.category.as_str().to_string(),
                keys: outcome.applied.clone(),
            });
        }
        if let Some(failure) = &outcome.failed {
            warn!(
                category = %group.category,
                key = %failure.key,
                error = %failure.message,
                "settings save stopped at failing key"
            );
        } else {
            info!(category = %group.category, keys = outcome.applied.len(), "settings saved");
        }

        Ok(SaveReport {
            category: group.category,
            outcome,
        })
    }

    /// Upsert a single field of `group`.
    ///
    /// # Errors
    ///
    /// Returns encoding errors for unknown or mistyped fields and
    /// [`SettingsError::Store`] when the write fails.
    pub async fn save_field(
        &self,
        group: &SettingsGroup,
        field: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        let mut object = Map::new();
        object.insert(field.to_string(), value);
        let rows = encode(group, &object)?;
        for row in rows {
            let key = crate::store::conflict_key(&row, "key");
            self.store
                .upsert(Table::SiteSettings, row, "key")
                .await
                .map_err(store_error("settings.save_field"))?;
            self.events.publish(Event::SettingsSaved {
                category: group.category.as_str().to_string(),
                keys: vec![key],
            });
        }
        Ok(())
    }

    /// Every section row, in render order.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Store`] when rows cannot be fetched or decoded.
    pub async fn sections(&self) -> Result<Vec<SectionConfig>, SettingsError> {
        let rows = self
            .store
            .select(&Query::from(Table::SectionConfig).order("order_index", Direction::Asc))
            .await
            .map_err(store_error("sections.list"))?;
        rows.into_iter()
            .map(|row| from_row(Table::SectionConfig, row))
            .collect::<Result<_, _>>()
            .map_err(store_error("sections.decode"))
    }

    /// Apply visibility/title edits, one section at a time.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Store`] on the first failing write; earlier
    /// sections stay saved.
    pub async fn save_sections(
        &self,
        updates: Vec<SectionUpdate>,
    ) -> Result<Vec<SectionConfig>, SettingsError> {
        for update in updates {
            let mut row = Row::new();
            row.insert(
                "section_name".into(),
                Value::String(update.section_name.as_str().to_string()),
            );
            row.insert("is_visible".into(), Value::Bool(update.is_visible));
            row.insert("display_title".into(), Value::String(update.display_title));
            if let Some(description) = update.description {
                row.insert("description".into(), Value::String(description));
            }
            if let Some(settings) = update.settings {
                row.insert("settings".into(), Value::Object(settings));
            }
            self.store
                .upsert(Table::SectionConfig, row, "section_name")
                .await
                .map_err(store_error("sections.save"))?;
        }
        self.events.publish(Event::ContentChanged {
            table: Table::SectionConfig.as_str().to_string(),
            id: None,
            action: ContentAction::Updated,
        });
        self.sections().await
    }

    /// Rewrite `order_index` so sections render in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Store`] on the first failing write.
    pub async fn reorder_sections(
        &self,
        order: &[SectionName],
    ) -> Result<Vec<SectionConfig>, SettingsError> {
        for (index, section) in order.iter().enumerate() {
            let mut patch = Row::new();
            patch.insert("order_index".into(), Value::from(index));
            self.store
                .update(
                    &Query::from(Table::SectionConfig).eq("section_name", section.as_str()),
                    patch,
                )
                .await
                .map_err(store_error("sections.reorder"))?;
        }
        self.events.publish(Event::ContentChanged {
            table: Table::SectionConfig.as_str().to_string(),
            id: None,
            action: ContentAction::Reordered,
        });
        self.sections().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::settings::documents::{HeroSettings, ProfileSettings, ThemeSettings};
    use crate::store::{ContentStore, MemoryStore, StoreError, StoreResult};

    fn service(store: Arc<dyn ContentStore>) -> SettingsService {
        SettingsService::new(store, EventBus::new())
    }

    #[tokio::test]
    async fn saved_documents_load_back_identically() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let settings = service(store.clone());
        let theme = ThemeSettings {
            primary_color: "#111111".into(),
            dark_mode_enabled: true,
            ..ThemeSettings::default()
        };
        let report = settings.save(&theme).await.expect("save");
        assert!(report.is_complete());
        assert_eq!(report.outcome.applied.len(), 6);

        let loaded: ThemeSettings = settings.load().await.expect("load");
        assert_eq!(loaded, theme);

        let stored = store
            .select_one(&Query::from(Table::SiteSettings).eq("key", "dark_mode_enabled"))
            .await
            .expect("select")
            .expect("row exists");
        assert_eq!(stored["category"], "theme");
        assert_eq!(stored["type"], "boolean");
        assert_eq!(stored["value"], json!(true));
    }

    #[tokio::test]
    async fn second_save_updates_rows_in_place() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let settings = service(store.clone());
        let mut hero = HeroSettings {
            title: "First".into(),
            ..HeroSettings::default()
        };
        settings.save(&hero).await.expect("first save");
        hero.title = "Second".into();
        settings.save(&hero).await.expect("second save");

        let count = store
            .count(&Query::from(Table::SiteSettings).eq("category", "hero"))
            .await
            .expect("count");
        assert_eq!(count, 9);
        let loaded: HeroSettings = settings.load().await.expect("load");
        assert_eq!(loaded.title, "Second");
    }

    #[tokio::test]
    async fn profile_and_theme_share_empty_prefix_without_collisions() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let settings = service(store);
        settings
            .save(&ProfileSettings {
                name: "Nouk".into(),
                ..ProfileSettings::default()
            })
            .await
            .expect("profile");
        settings.save(&ThemeSettings::default()).await.expect("theme");

        let profile: ProfileSettings = settings.load().await.expect("profile load");
        let theme: ThemeSettings = settings.load().await.expect("theme load");
        assert_eq!(profile.name, "Nouk");
        assert_eq!(theme, ThemeSettings::default());
    }

    /// Store that refuses writes for one settings key.
    struct RejectingStore {
        inner: MemoryStore,
        reject_key: &'static str,
    }

    #[async_trait]
    impl ContentStore for RejectingStore {
        async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
            self.inner.select(query).await
        }
        async fn count(&self, query: &Query) -> StoreResult<u64> {
            self.inner.count(query).await
        }
        async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
            self.inner.insert(table, row).await
        }
        async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
            self.inner.update(query, patch).await
        }
        async fn delete(&self, query: &Query) -> StoreResult<u64> {
            self.inner.delete(query).await
        }
        async fn upsert(&self, table: Table, row: Row, conflict: &'static str) -> StoreResult<Row> {
            if row.get("key").and_then(Value::as_str) == Some(self.reject_key) {
                return Err(StoreError::InvalidRow {
                    table,
                    reason: "rejected",
                });
            }
            self.inner.upsert(table, row, conflict).await
        }
    }

    #[tokio::test]
    async fn partial_failure_reports_saved_and_unsaved_keys() {
        let store: Arc<dyn ContentStore> = Arc::new(RejectingStore {
            inner: MemoryStore::new(),
            reject_key: "navbar_site_name",
        });
        let settings = service(store);
        let report = settings
            .save(&crate::settings::NavbarSettings {
                logo_text: "NP".into(),
                site_name: "HQ".into(),
                ..Default::default()
            })
            .await
            .expect("encode succeeds");

        assert!(!report.is_complete());
        assert_eq!(report.outcome.applied, vec!["navbar_logo_text".to_string()]);
        assert_eq!(
            report.outcome.failed.as_ref().map(|failure| failure.key.as_str()),
            Some("navbar_site_name")
        );
        assert_eq!(
            report.outcome.not_applied,
            vec!["navbar_cta_text".to_string(), "navbar_cta_href".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_fields_abort_before_any_write() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let settings = service(store.clone());
        let object = match json!({"title": "x", "favicon": "y"}) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let err = settings
            .save_object(&crate::settings::SiteMetadata::GROUP, &object)
            .await
            .expect_err("unknown field");
        assert!(matches!(err, SettingsError::UnknownField { .. }));
        assert_eq!(
            store
                .count(&Query::from(Table::SiteSettings))
                .await
                .expect("count"),
            0
        );
    }

    #[tokio::test]
    async fn sections_save_and_reorder() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let settings = service(store);
        settings
            .save_sections(
                SectionName::ALL
                    .iter()
                    .map(|name| SectionUpdate {
                        section_name: *name,
                        is_visible: *name != SectionName::Tools,
                        display_title: name.as_str().to_uppercase(),
                        description: None,
                        settings: None,
                    })
                    .collect(),
            )
            .await
            .expect("save");

        let reordered = settings
            .reorder_sections(&[
                SectionName::Projects,
                SectionName::Hero,
                SectionName::Goals,
                SectionName::Skills,
                SectionName::Tools,
            ])
            .await
            .expect("reorder");
        assert_eq!(reordered[0].section_name, SectionName::Projects);
        assert_eq!(reordered[0].order_index, 0);
        assert!(!reordered[4].is_visible);
        assert_eq!(reordered[4].display_title, "TOOLS");
    }
}
