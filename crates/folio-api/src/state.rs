//! Shared state handed to every handler.

use std::sync::Arc;

use folio_core::admin::CollectionAdmin;
use folio_core::model::{Goal, HeroBadge, NavigationLink, Project, Skill, SocialLink, Tool};
use folio_core::{
    PublicSite, Record, SessionScope, SettingsService, SharedBlobStore, SharedContentStore,
};
use folio_events::EventBus;
use folio_telemetry::Metrics;

/// Where content is served from, reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// The in-memory demo dataset.
    Demo,
    /// The PostgreSQL content store.
    Database,
}

impl ContentSource {
    /// Label recorded on the application span.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Database => "database",
        }
    }
}

/// Collaborators and services shared by all routes.
pub struct ApiState {
    pub(crate) source: ContentSource,
    pub(crate) store: SharedContentStore,
    pub(crate) settings: SettingsService,
    pub(crate) site: PublicSite,
    pub(crate) blobs: SharedBlobStore,
    pub(crate) sessions: Arc<SessionScope>,
    pub(crate) events: EventBus,
    pub(crate) telemetry: Metrics,
    goals: CollectionAdmin<Goal>,
    skills: CollectionAdmin<Skill>,
    tools: CollectionAdmin<Tool>,
    projects: CollectionAdmin<Project>,
    navigation: CollectionAdmin<NavigationLink>,
    badges: CollectionAdmin<HeroBadge>,
    social_links: CollectionAdmin<SocialLink>,
}

impl ApiState {
    /// Wire services over `store`. Writes are announced on the session
    /// scope's event bus.
    #[must_use]
    pub fn new(
        source: ContentSource,
        store: SharedContentStore,
        blobs: SharedBlobStore,
        sessions: Arc<SessionScope>,
        telemetry: Metrics,
    ) -> Self {
        let events = sessions.events().clone();
        Self {
            source,
            settings: SettingsService::new(store.clone(), events.clone()),
            site: PublicSite::new(store.clone()),
            goals: CollectionAdmin::new(store.clone(), events.clone()),
            skills: CollectionAdmin::new(store.clone(), events.clone()),
            tools: CollectionAdmin::new(store.clone(), events.clone()),
            projects: CollectionAdmin::new(store.clone(), events.clone()),
            navigation: CollectionAdmin::new(store.clone(), events.clone()),
            badges: CollectionAdmin::new(store.clone(), events.clone()),
            social_links: CollectionAdmin::new(store.clone(), events.clone()),
            store,
            blobs,
            sessions,
            events,
            telemetry,
        }
    }

    /// Session scope owned by this state.
    #[must_use]
    pub const fn sessions(&self) -> &Arc<SessionScope> {
        &self.sessions
    }

    /// Public renderer over the content store.
    #[must_use]
    pub const fn site(&self) -> &PublicSite {
        &self.site
    }
}

/// A collection editable through the generic admin routes.
pub(crate) trait AdminCollection: Record {
    fn admin(state: &ApiState) -> &CollectionAdmin<Self>;
}

macro_rules! admin_collection {
    ($record:ty, $field:ident) => {
        impl AdminCollection for $record {
            fn admin(state: &ApiState) -> &CollectionAdmin<Self> {
                &state.$field
            }
        }
    };
}

admin_collection!(Goal, goals);
admin_collection!(Skill, skills);
admin_collection!(Tool, tools);
admin_collection!(Project, projects);
admin_collection!(NavigationLink, navigation);
admin_collection!(HeroBadge, badges);
admin_collection!(SocialLink, social_links);
