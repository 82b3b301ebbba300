//! Read-only view models for the public site.
//!
//! # Design
//!
//! - Every part of a page comes from its own query. A failing query is logged
//!   and that part renders its empty/default value; the page itself never
//!   fails.
//! - Hidden sections are omitted from [`HomePage`] entirely. A section with no
//!   configuration row is treated as visible with its default heading.
//! - The demo dataset and a live store render through the same code.

use std::fmt::Display;

use folio_events::EventBus;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::model::{
    Goal, GoalScope, HeroBadge, NavigationLink, Project, ProjectStatus, ProjectType,
    SectionConfig, SectionName, Skill, SkillLevel, SocialLink, Tool,
};
use crate::settings::{
    HeroSettings, NavbarSettings, ProfileSettings, SettingsDocument, SettingsService,
    SiteMetadata, ThemeSettings,
};
use crate::store::{Direction, Query, SharedContentStore, StoreError, Table, from_row};

/// Projects shown on the home page when the section sets no limit.
pub const DEFAULT_PROJECT_LIMIT: usize = 6;

const fn default_title(name: SectionName) -> &'static str {
    match name {
        SectionName::Hero => "Accueil",
        SectionName::Goals => "Mes Objectifs",
        SectionName::Skills => "Mes Compétences",
        SectionName::Tools => "Mes Outils",
        SectionName::Projects => "Mes Projets",
    }
}

/// Heading and settings of a visible section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    /// Section identity.
    pub name: SectionName,
    /// Heading.
    pub title: String,
    /// Subtitle.
    pub description: Option<String>,
    /// Render position.
    pub order_index: i32,
    /// Section-specific settings.
    pub settings: Map<String, Value>,
}

impl SectionView {
    fn from_config(config: &SectionConfig) -> Self {
        Self {
            name: config.section_name,
            title: config.display_title.clone(),
            description: config.description.clone(),
            order_index: config.order_index,
            settings: config.settings.clone(),
        }
    }

    fn fallback(name: SectionName, position: usize) -> Self {
        Self {
            name,
            title: default_title(name).to_string(),
            description: None,
            order_index: i32::try_from(position).unwrap_or(i32::MAX),
            settings: Map::new(),
        }
    }

    fn flag(&self, name: &str) -> bool {
        self.settings
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    fn limit(&self, name: &str, default: usize) -> usize {
        self.settings
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(default)
    }
}

/// Navbar content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavbarView {
    /// Branding and call to action.
    pub settings: NavbarSettings,
    /// Visible links in order.
    pub links: Vec<NavigationLink>,
}

/// Hero banner content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroView {
    /// Section heading.
    pub section: SectionView,
    /// Banner copy.
    pub settings: HeroSettings,
    /// Owner profile.
    pub profile: ProfileSettings,
    /// Visible badges in order.
    pub badges: Vec<HeroBadge>,
    /// Visible social links in order.
    pub social_links: Vec<SocialLink>,
}

/// Goals split by horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsView {
    /// Section heading.
    pub section: SectionView,
    /// Yearly goals, empty when the section hides them.
    pub yearly: Vec<Goal>,
    /// Monthly goals, empty when the section hides them.
    pub monthly: Vec<Goal>,
}

/// Skills grouped by level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillsView {
    /// Section heading.
    pub section: SectionView,
    /// Mastered skills.
    pub acquired: Vec<Skill>,
    /// Skills being learned.
    pub learning: Vec<Skill>,
    /// Planned skills.
    pub target: Vec<Skill>,
    /// Skills rated by proficiency only.
    pub unleveled: Vec<Skill>,
}

/// Tools cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolsView {
    /// Section heading.
    pub section: SectionView,
    /// Visible tools in order.
    pub items: Vec<Tool>,
}

/// Project teaser list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsView {
    /// Section heading.
    pub section: SectionView,
    /// Newest projects, up to the section limit.
    pub items: Vec<Project>,
    /// Live projects in total.
    pub total: usize,
    /// Whether the catalog holds more than `items`.
    pub has_more: bool,
}

/// Everything the home page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomePage {
    /// Document metadata.
    pub metadata: SiteMetadata,
    /// Colors.
    pub theme: ThemeSettings,
    /// Navbar.
    pub navbar: NavbarView,
    /// Visible sections in render order.
    pub sections: Vec<SectionView>,
    /// Hero banner, when visible.
    pub hero: Option<HeroView>,
    /// Goals, when visible.
    pub goals: Option<GoalsView>,
    /// Skills, when visible.
    pub skills: Option<SkillsView>,
    /// Tools, when visible.
    pub tools: Option<ToolsView>,
    /// Projects, when visible.
    pub projects: Option<ProjectsView>,
}

/// Optional catalog filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectFilter {
    /// Only projects of this kind.
    #[serde(rename = "type", default)]
    pub kind: Option<ProjectType>,
    /// Only projects in this status.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

/// The public catalog page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCatalog {
    /// Filters applied.
    #[serde(rename = "type")]
    pub kind: Option<ProjectType>,
    /// Status filter applied.
    pub status: Option<ProjectStatus>,
    /// Matching projects, newest first.
    pub items: Vec<Project>,
}

fn degrade<T: Default, E: Display>(part: &'static str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| {
        warn!(part, error = %err, "public query failed; rendering default");
        T::default()
    })
}

/// Read-only renderer over a content store.
#[derive(Clone)]
pub struct PublicSite {
    store: SharedContentStore,
    settings: SettingsService,
}

impl PublicSite {
    /// Renderer over `store`.
    #[must_use]
    pub fn new(store: SharedContentStore) -> Self {
        let settings = SettingsService::new(store.clone(), EventBus::with_capacity(1));
        Self { store, settings }
    }

    async fn fetch<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>, StoreError> {
        let table = query.table();
        self.store
            .select(&query)
            .await?
            .into_iter()
            .map(|row| from_row(table, row))
            .collect()
    }

    async fn document<D: SettingsDocument>(&self, part: &'static str) -> D {
        degrade(part, self.settings.load::<D>().await)
    }

    async fn visible<T: DeserializeOwned>(&self, part: &'static str, query: Query) -> Vec<T> {
        degrade(part, self.fetch(query).await)
    }

    async fn live_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let mut query = Query::from(Table::Projects).is_null("deleted_at");
        if let Some(kind) = filter.kind {
            query = query.eq("type", kind.as_str());
        }
        if let Some(status) = filter.status {
            query = query.eq("status", status.as_str());
        }
        self.fetch(query.order("created_at", Direction::Desc)).await
    }

    /// Visible sections in render order, with fallbacks for missing rows.
    async fn section_views(&self) -> Vec<SectionView> {
        let configs = degrade("sections", self.settings.sections().await);
        let mut views: Vec<SectionView> = Vec::with_capacity(SectionName::ALL.len());
        for (position, name) in SectionName::ALL.into_iter().enumerate() {
            match configs.iter().find(|config| config.section_name == name) {
                Some(config) if config.is_visible => views.push(SectionView::from_config(config)),
                Some(_) => {}
                None => views.push(SectionView::fallback(name, position)),
            }
        }
        views.sort_by_key(|view| view.order_index);
        views
    }

    /// Assemble the home page.
    pub async fn home(&self) -> HomePage {
        let (sections, metadata, theme, navbar, hero, profile) = tokio::join!(
            self.section_views(),
            self.document::<SiteMetadata>("metadata"),
            self.document::<ThemeSettings>("theme"),
            self.document::<NavbarSettings>("navbar"),
            self.document::<HeroSettings>("hero"),
            self.document::<ProfileSettings>("profile"),
        );
        let (links, badges, social_links, goals, skills, tools, projects) = tokio::join!(
            self.visible::<NavigationLink>(
                "navigation_links",
                Query::from(Table::NavigationLinks)
                    .eq("is_visible", true)
                    .order("order_index", Direction::Asc),
            ),
            self.visible::<HeroBadge>(
                "hero_badges",
                Query::from(Table::HeroBadges)
                    .eq("is_visible", true)
                    .order("order_index", Direction::Asc),
            ),
            self.visible::<SocialLink>(
                "social_links",
                Query::from(Table::SocialLinks)
                    .eq("is_visible", true)
                    .order("order_index", Direction::Asc),
            ),
            self.visible::<Goal>(
                "goals",
                Query::from(Table::Goals)
                    .eq("is_visible", true)
                    .order("year", Direction::Desc)
                    .order("order_index", Direction::Asc),
            ),
            self.visible::<Skill>(
                "skills",
                Query::from(Table::Skills).order("created_at", Direction::Asc),
            ),
            self.visible::<Tool>(
                "tools",
                Query::from(Table::Tools)
                    .eq("is_visible", true)
                    .order("order_index", Direction::Asc),
            ),
            async { degrade("projects", self.live_projects(ProjectFilter::default()).await) },
        );

        let section = |name: SectionName| sections.iter().find(|view| view.name == name).cloned();

        HomePage {
            metadata,
            theme,
            navbar: NavbarView {
                settings: navbar,
                links,
            },
            hero: section(SectionName::Hero).map(|section| HeroView {
                section,
                settings: hero,
                profile,
                badges,
                social_links,
            }),
            goals: section(SectionName::Goals).map(|section| goals_view(section, goals)),
            skills: section(SectionName::Skills).map(|section| skills_view(section, skills)),
            tools: section(SectionName::Tools).map(|section| ToolsView {
                section,
                items: tools,
            }),
            projects: section(SectionName::Projects)
                .map(|section| projects_view(section, projects)),
            sections,
        }
    }

    /// The catalog page, optionally filtered.
    pub async fn projects(&self, filter: ProjectFilter) -> ProjectCatalog {
        ProjectCatalog {
            kind: filter.kind,
            status: filter.status,
            items: degrade("projects", self.live_projects(filter).await),
        }
    }

    /// One live project; `None` for unknown or deleted ids.
    pub async fn project(&self, id: Uuid) -> Option<Project> {
        let query = Query::from(Table::Projects)
            .id(id)
            .is_null("deleted_at")
            .limit(1);
        degrade("project", self.fetch::<Project>(query).await)
            .into_iter()
            .next()
    }

    /// Ids of every live project, for static export.
    pub async fn project_ids(&self) -> Vec<Uuid> {
        degrade("projects", self.live_projects(ProjectFilter::default()).await)
            .into_iter()
            .map(|project| project.id)
            .collect()
    }
}

fn goals_view(section: SectionView, goals: Vec<Goal>) -> GoalsView {
    let (show_yearly, show_monthly) = (section.flag("show_yearly"), section.flag("show_monthly"));
    let (monthly, yearly): (Vec<Goal>, Vec<Goal>) =
        goals.into_iter().partition(|goal| match goal.scope {
            Some(GoalScope::Month) => true,
            Some(GoalScope::Year) => false,
            None => goal.month.is_some(),
        });
    GoalsView {
        yearly: if show_yearly { yearly } else { Vec::new() },
        monthly: if show_monthly { monthly } else { Vec::new() },
        section,
    }
}

fn skills_view(section: SectionView, skills: Vec<Skill>) -> SkillsView {
    let mut view = SkillsView {
        acquired: Vec::new(),
        learning: Vec::new(),
        target: Vec::new(),
        unleveled: Vec::new(),
        section,
    };
    let show = [
        view.section.flag("show_acquired"),
        view.section.flag("show_learning"),
        view.section.flag("show_target"),
    ];
    for skill in skills {
        match skill.level {
            Some(SkillLevel::Acquired) if show[0] => view.acquired.push(skill),
            Some(SkillLevel::Learning) if show[1] => view.learning.push(skill),
            Some(SkillLevel::Target) if show[2] => view.target.push(skill),
            Some(_) => {}
            None => view.unleveled.push(skill),
        }
    }
    view
}

fn projects_view(section: SectionView, mut projects: Vec<Project>) -> ProjectsView {
    let limit = section.limit("display_limit", DEFAULT_PROJECT_LIMIT);
    let total = projects.len();
    projects.truncate(limit);
    ProjectsView {
        section,
        items: projects,
        total,
        has_more: total > limit,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::admin::CollectionAdmin;
    use crate::demo::demo_store;
    use crate::settings::SectionUpdate;
    use crate::store::{ContentStore, Row, StoreResult};

    struct BrokenStore;

    fn broken(operation: &'static str, table: Table) -> StoreError {
        StoreError::Backend {
            operation,
            table,
            source: "connection refused".into(),
        }
    }

    #[async_trait]
    impl ContentStore for BrokenStore {
        async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
            Err(broken("select", query.table()))
        }
        async fn count(&self, query: &Query) -> StoreResult<u64> {
            Err(broken("count", query.table()))
        }
        async fn insert(&self, table: Table, _: Row) -> StoreResult<Row> {
            Err(broken("insert", table))
        }
        async fn update(&self, query: &Query, _: Row) -> StoreResult<Vec<Row>> {
            Err(broken("update", query.table()))
        }
        async fn delete(&self, query: &Query) -> StoreResult<u64> {
            Err(broken("delete", query.table()))
        }
        async fn upsert(&self, table: Table, _: Row, _: &'static str) -> StoreResult<Row> {
            Err(broken("upsert", table))
        }
    }

    fn demo() -> SharedContentStore {
        Arc::new(demo_store().expect("demo store"))
    }

    #[tokio::test]
    async fn demo_home_page_renders_every_section() {
        let page = PublicSite::new(demo()).home().await;
        assert_eq!(page.sections.len(), 5);
        assert_eq!(page.metadata.language, "fr");
        assert_eq!(page.navbar.links.len(), 4);

        let hero = page.hero.expect("hero visible");
        assert_eq!(hero.profile.initials, "NP");
        assert_eq!(hero.social_links.len(), 2);

        let goals = page.goals.expect("goals visible");
        assert_eq!(goals.yearly.len(), 3);
        assert_eq!(goals.monthly.len(), 2);

        let skills = page.skills.expect("skills visible");
        assert_eq!(
            (skills.acquired.len(), skills.learning.len(), skills.target.len()),
            (5, 3, 3)
        );
        assert_eq!(skills.acquired[0].name, "Next.js");

        let projects = page.projects.expect("projects visible");
        assert_eq!(projects.total, 3);
        assert!(!projects.has_more);
        assert_eq!(projects.items[0].name, "Mobile App E-commerce");
        assert_eq!(page.tools.expect("tools visible").items.len(), 15);
    }

    #[tokio::test]
    async fn hidden_section_is_omitted() {
        let store = demo();
        let settings = SettingsService::new(store.clone(), EventBus::new());
        settings
            .save_sections(vec![SectionUpdate {
                section_name: SectionName::Tools,
                is_visible: false,
                display_title: "Mes Outils".into(),
                description: None,
                settings: None,
            }])
            .await
            .expect("hide tools");

        let page = PublicSite::new(store).home().await;
        assert!(page.tools.is_none());
        assert!(page.sections.iter().all(|view| view.name != SectionName::Tools));
        assert!(page.projects.is_some());
    }

    #[tokio::test]
    async fn project_limit_sets_has_more() {
        let store = demo();
        let settings = SettingsService::new(store.clone(), EventBus::new());
        let mut limit = Map::new();
        limit.insert("display_limit".into(), Value::from(2));
        settings
            .save_sections(vec![SectionUpdate {
                section_name: SectionName::Projects,
                is_visible: true,
                display_title: "Mes Projets".into(),
                description: None,
                settings: Some(limit),
            }])
            .await
            .expect("limit projects");

        let projects = PublicSite::new(store)
            .home()
            .await
            .projects
            .expect("projects visible");
        assert_eq!(projects.items.len(), 2);
        assert_eq!(projects.total, 3);
        assert!(projects.has_more);
    }

    #[tokio::test]
    async fn failing_store_degrades_to_defaults() {
        let page = PublicSite::new(Arc::new(BrokenStore)).home().await;
        assert_eq!(page.theme, ThemeSettings::default());
        assert!(page.navbar.links.is_empty());
        let projects = page.projects.expect("fallback section visible");
        assert!(projects.items.is_empty());
        assert!(!projects.has_more);
        assert_eq!(projects.section.title, "Mes Projets");
    }

    #[tokio::test]
    async fn catalog_filters_and_hides_deleted_projects() {
        let store = demo();
        let site = PublicSite::new(store.clone());

        let mobile = site
            .projects(ProjectFilter {
                kind: Some(ProjectType::Mobile),
                status: None,
            })
            .await;
        assert_eq!(mobile.items.len(), 1);
        let doomed = mobile.items[0].id;

        let admin = CollectionAdmin::<Project>::new(store, EventBus::new());
        admin.delete(doomed, true).await.expect("delete");

        assert!(site.project(doomed).await.is_none());
        assert!(
            site.projects(ProjectFilter::default())
                .await
                .items
                .iter()
                .all(|project| project.id != doomed)
        );
        assert!(site.project(Uuid::new_v4()).await.is_none());
    }
}
