//! Typed content records and the form drafts that create or edit them.
//!
//! # Design
//!
//! - Records mirror the stored rows field-for-field so they serialize straight
//!   into [`crate::store::Row`] objects.
//! - Drafts carry only editable fields (no id, timestamps, or order index) and
//!   validate required fields before anything reaches a store.
//! - Closed enumerations are serde `snake_case` strings matching the stored
//!   text values.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::settings::{SettingCategory, SettingType, SettingValue};

/// A single failed field check on a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Field name as submitted.
    pub field: &'static str,
    /// Machine-readable reason.
    pub reason: &'static str,
}

/// Draft validation failed; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("draft failed validation")]
pub struct ValidationErrors {
    /// Individual field failures, in field order.
    pub issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    fn check(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }
}

fn require(issues: &mut Vec<FieldIssue>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        issues.push(FieldIssue {
            field,
            reason: "required",
        });
    }
}

/// Editable form buffer for a record.
pub trait Draft: Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static {
    /// Check required fields and bounds.
    ///
    /// # Errors
    ///
    /// Returns every failing field when the draft must not be written.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Goal status. Admin and public pages historically used different
/// vocabularies; both are accepted and stored exactly as written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Admin vocabulary: not yet started.
    NotStarted,
    /// Shared by both vocabularies.
    InProgress,
    /// Admin vocabulary: finished.
    Completed,
    /// Public vocabulary: not yet started.
    Todo,
    /// Public vocabulary: finished.
    Done,
}

/// Vocabulary-neutral progress bucket for a goal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalProgress {
    /// Not started.
    Pending,
    /// Underway.
    Active,
    /// Finished.
    Finished,
}

/// Which status vocabulary a value belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StatusVocabulary {
    /// `not_started` / `completed`.
    Admin,
    /// `todo` / `done`.
    Public,
    /// `in_progress`, valid in both.
    Shared,
}

impl GoalStatus {
    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Todo => "todo",
            Self::Done => "done",
        }
    }

    /// Map onto the vocabulary-neutral progress bucket.
    #[must_use]
    pub const fn progress(self) -> GoalProgress {
        match self {
            Self::NotStarted | Self::Todo => GoalProgress::Pending,
            Self::InProgress => GoalProgress::Active,
            Self::Completed | Self::Done => GoalProgress::Finished,
        }
    }

    /// Vocabulary this value was written in.
    #[must_use]
    pub const fn vocabulary(self) -> StatusVocabulary {
        match self {
            Self::NotStarted | Self::Completed => StatusVocabulary::Admin,
            Self::Todo | Self::Done => StatusVocabulary::Public,
            Self::InProgress => StatusVocabulary::Shared,
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goal priority.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    /// Low priority.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

/// Horizon of a goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalScope {
    /// Yearly goal.
    Year,
    /// Monthly goal.
    Month,
}

/// Self-assessed skill level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    /// Already mastered.
    Acquired,
    /// Currently learning.
    Learning,
    /// Planned.
    Target,
}

/// Project kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Web application.
    Web,
    /// Mobile application.
    Mobile,
    /// Desktop or backend software.
    Software,
    /// Automation or scripting.
    Automation,
}

impl ProjectType {
    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Software => "software",
            Self::Automation => "automation",
        }
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Just an idea.
    Idea,
    /// Under construction.
    Building,
    /// Minimum viable product shipped.
    Mvp,
    /// Live.
    Production,
    /// On hold.
    Paused,
}

impl ProjectStatus {
    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Building => "building",
            Self::Mvp => "mvp",
            Self::Production => "production",
            Self::Paused => "paused",
        }
    }
}

/// Public page sections whose visibility is configurable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    /// Hero banner.
    Hero,
    /// Goals list.
    Goals,
    /// Skills grid.
    Skills,
    /// Tools cloud.
    Tools,
    /// Project catalog.
    Projects,
}

impl SectionName {
    /// All sections in default render order.
    pub const ALL: [Self; 5] = [
        Self::Hero,
        Self::Goals,
        Self::Skills,
        Self::Tools,
        Self::Projects,
    ];

    /// Stored text value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Goals => "goals",
            Self::Skills => "skills",
            Self::Tools => "tools",
            Self::Projects => "projects",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One key/value configuration row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSetting {
    /// Row id.
    pub id: Uuid,
    /// Unique key (category prefix + field name).
    pub key: String,
    /// Stored value.
    pub value: SettingValue,
    /// Category used for batch reads.
    pub category: SettingCategory,
    /// Declared value type.
    #[serde(rename = "type")]
    pub kind: SettingType,
    /// Human description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

/// Visibility and presentation of one public section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionConfig {
    /// Row id.
    pub id: Uuid,
    /// Section this row configures (unique).
    pub section_name: SectionName,
    /// Whether the public renderer emits the section.
    pub is_visible: bool,
    /// Heading shown above the section.
    pub display_title: String,
    /// Optional subtitle.
    #[serde(default)]
    pub description: Option<String>,
    /// Render order.
    #[serde(default)]
    pub order_index: i32,
    /// Section-specific settings (`display_limit`, `show_yearly`, ...).
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl SectionConfig {
    /// Boolean section setting, `default` when absent or mistyped.
    #[must_use]
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.settings
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Integer section setting, `default` when absent, mistyped or negative.
    #[must_use]
    pub fn limit(&self, name: &str, default: usize) -> usize {
        self.settings
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(default)
    }
}

/// Goal shown on the public page and managed in HQ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Row id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Free-form category.
    #[serde(default)]
    pub category: String,
    /// Status in whichever vocabulary it was written.
    pub status: GoalStatus,
    /// Priority.
    #[serde(default)]
    pub priority: GoalPriority,
    /// Optional due date.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Yearly or monthly horizon.
    #[serde(default)]
    pub scope: Option<GoalScope>,
    /// Year the goal belongs to.
    #[serde(default)]
    pub year: Option<i32>,
    /// Month (1-12) for monthly goals.
    #[serde(default)]
    pub month: Option<i32>,
    /// Published flag.
    pub is_visible: bool,
    /// Position in the admin list.
    pub order_index: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Skill entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    /// Row id.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Free-form category.
    #[serde(default)]
    pub category: String,
    /// Proficiency percentage.
    #[serde(default)]
    pub proficiency: Option<i32>,
    /// Level bucket.
    #[serde(default)]
    pub level: Option<SkillLevel>,
    /// Icon name or emoji.
    #[serde(default)]
    pub icon: Option<String>,
    /// Position in the admin list.
    pub order_index: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Tool entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Row id.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Category (`frontend`, `backend`, `iot`, `design`, `other`, ...).
    #[serde(default)]
    pub category: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Icon name or emoji.
    #[serde(default)]
    pub icon: Option<String>,
    /// Vendor website.
    #[serde(default)]
    pub website_url: Option<String>,
    /// Published flag.
    pub is_visible: bool,
    /// Position in the list.
    pub order_index: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Badge shown under the hero title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroBadge {
    /// Row id.
    pub id: Uuid,
    /// Badge text.
    pub text: String,
    /// Icon name or emoji.
    #[serde(default)]
    pub icon: String,
    /// Optional link target.
    #[serde(default)]
    pub link: Option<String>,
    /// Published flag.
    pub is_visible: bool,
    /// Position.
    pub order_index: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Social profile link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    /// Row id.
    pub id: Uuid,
    /// Platform (`github`, `linkedin`, `twitter`, `email`, `other`).
    pub platform: String,
    /// Target URL.
    pub url: String,
    /// Icon name.
    #[serde(default)]
    pub icon: String,
    /// Optional accessible label.
    #[serde(default)]
    pub label: Option<String>,
    /// Published flag.
    pub is_visible: bool,
    /// Position.
    pub order_index: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Navbar link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationLink {
    /// Row id.
    pub id: Uuid,
    /// Link label.
    pub label: String,
    /// Target (anchor, path or absolute URL).
    pub href: String,
    /// Position.
    pub order_index: i32,
    /// Published flag.
    pub is_visible: bool,
    /// Open in a new tab.
    pub is_external: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Catalog project. Removed projects keep their row with `deleted_at` set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Row id.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Project kind.
    #[serde(rename = "type")]
    pub kind: ProjectType,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Technologies, in display order.
    #[serde(default)]
    pub stack: Vec<String>,
    /// Repository URL.
    #[serde(default)]
    pub github_url: Option<String>,
    /// Live application URL.
    #[serde(default)]
    pub app_url: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Tombstone.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

/// Form buffer for [`Goal`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDraft {
    /// Title (required).
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Category.
    #[serde(default = "GoalDraft::default_category")]
    pub category: String,
    /// Status.
    #[serde(default = "GoalDraft::default_status")]
    pub status: GoalStatus,
    /// Priority.
    #[serde(default)]
    pub priority: GoalPriority,
    /// Due date.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Horizon.
    #[serde(default)]
    pub scope: Option<GoalScope>,
    /// Year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Month.
    #[serde(default)]
    pub month: Option<i32>,
    /// Published flag.
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl GoalDraft {
    fn default_category() -> String {
        "Professional".to_string()
    }

    const fn default_status() -> GoalStatus {
        GoalStatus::NotStarted
    }
}

impl Draft for GoalDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "title", &self.title);
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            issues.push(FieldIssue {
                field: "month",
                reason: "out_of_range",
            });
        }
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`Skill`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillDraft {
    /// Name (required).
    pub name: String,
    /// Category.
    #[serde(default)]
    pub category: String,
    /// Proficiency percentage, 0 to 100.
    #[serde(default)]
    pub proficiency: Option<i32>,
    /// Level bucket.
    #[serde(default)]
    pub level: Option<SkillLevel>,
    /// Icon.
    #[serde(default)]
    pub icon: Option<String>,
}

impl Draft for SkillDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "name", &self.name);
        if let Some(proficiency) = self.proficiency
            && !(0..=100).contains(&proficiency)
        {
            issues.push(FieldIssue {
                field: "proficiency",
                reason: "out_of_range",
            });
        }
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`Tool`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDraft {
    /// Name (required).
    pub name: String,
    /// Category.
    #[serde(default = "ToolDraft::default_category")]
    pub category: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Website.
    #[serde(default)]
    pub website_url: Option<String>,
    /// Published flag.
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl ToolDraft {
    fn default_category() -> String {
        "other".to_string()
    }
}

impl Draft for ToolDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "name", &self.name);
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`HeroBadge`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroBadgeDraft {
    /// Text (required).
    pub text: String,
    /// Icon.
    #[serde(default)]
    pub icon: String,
    /// Link target.
    #[serde(default)]
    pub link: Option<String>,
    /// Published flag.
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl Draft for HeroBadgeDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "text", &self.text);
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`SocialLink`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLinkDraft {
    /// Platform (required).
    pub platform: String,
    /// URL (required).
    pub url: String,
    /// Icon.
    #[serde(default)]
    pub icon: String,
    /// Label.
    #[serde(default)]
    pub label: Option<String>,
    /// Published flag.
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl Draft for SocialLinkDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "platform", &self.platform);
        require(&mut issues, "url", &self.url);
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`NavigationLink`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationLinkDraft {
    /// Label (required).
    pub label: String,
    /// Target (required).
    pub href: String,
    /// Published flag.
    #[serde(default = "default_true")]
    pub is_visible: bool,
    /// Open in a new tab.
    #[serde(default)]
    pub is_external: bool,
}

impl Draft for NavigationLinkDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "label", &self.label);
        require(&mut issues, "href", &self.href);
        ValidationErrors::check(issues)
    }
}

/// Form buffer for [`Project`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDraft {
    /// Name (required).
    pub name: String,
    /// Kind.
    #[serde(rename = "type", default = "ProjectDraft::default_kind")]
    pub kind: ProjectType,
    /// Status.
    #[serde(default = "ProjectDraft::default_status")]
    pub status: ProjectStatus,
    /// Technologies.
    #[serde(default)]
    pub stack: Vec<String>,
    /// Repository URL.
    #[serde(default)]
    pub github_url: Option<String>,
    /// Live URL.
    #[serde(default)]
    pub app_url: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl ProjectDraft {
    const fn default_kind() -> ProjectType {
        ProjectType::Web
    }

    const fn default_status() -> ProjectStatus {
        ProjectStatus::Idea
    }

    /// Split a comma-separated stack field the way the project form submits
    /// it: trimmed, blanks dropped, order kept.
    #[must_use]
    pub fn parse_stack(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl Draft for ProjectDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();
        require(&mut issues, "name", &self.name);
        if self.stack.iter().any(|item| item.trim().is_empty()) {
            issues.push(FieldIssue {
                field: "stack",
                reason: "blank_entry",
            });
        }
        ValidationErrors::check(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_status_keeps_both_vocabularies() {
        let parsed: Vec<GoalStatus> =
            serde_json::from_str(r#"["not_started","todo","in_progress","completed","done"]"#)
                .expect("statuses parse");
        assert_eq!(parsed[0].progress(), GoalProgress::Pending);
        assert_eq!(parsed[1].progress(), GoalProgress::Pending);
        assert_eq!(parsed[2].vocabulary(), StatusVocabulary::Shared);
        assert_eq!(parsed[3].vocabulary(), StatusVocabulary::Admin);
        assert_eq!(parsed[4].vocabulary(), StatusVocabulary::Public);
        assert_eq!(
            serde_json::to_value(parsed[1]).expect("serialize"),
            Value::String("todo".into())
        );
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        let draft = SkillDraft {
            name: "   ".into(),
            category: "Backend".into(),
            proficiency: Some(101),
            level: None,
            icon: None,
        };
        let err = draft.validate().expect_err("blank name rejected");
        assert_eq!(
            err.issues,
            vec![
                FieldIssue {
                    field: "name",
                    reason: "required"
                },
                FieldIssue {
                    field: "proficiency",
                    reason: "out_of_range"
                },
            ]
        );
    }

    #[test]
    fn social_link_requires_platform_and_url() {
        let draft = SocialLinkDraft {
            platform: "github".into(),
            url: String::new(),
            icon: "github".into(),
            label: None,
            is_visible: true,
        };
        let err = draft.validate().expect_err("url required");
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].field, "url");
    }

    #[test]
    fn goal_draft_defaults_match_admin_form() {
        let draft: GoalDraft = serde_json::from_str(r#"{"title":"Ship"}"#).expect("parse");
        assert_eq!(draft.category, "Professional");
        assert_eq!(draft.status, GoalStatus::NotStarted);
        assert_eq!(draft.priority, GoalPriority::Medium);
        assert!(draft.is_visible);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn month_must_be_a_calendar_month() {
        let mut draft: GoalDraft = serde_json::from_str(r#"{"title":"Ship"}"#).expect("parse");
        draft.month = Some(13);
        assert!(draft.validate().is_err());
        draft.month = Some(12);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn project_stack_splits_on_commas() {
        assert_eq!(
            ProjectDraft::parse_stack("Rust, axum ,, sqlx "),
            vec!["Rust", "axum", "sqlx"]
        );
    }

    #[test]
    fn project_type_serializes_under_type_key() {
        let draft: ProjectDraft =
            serde_json::from_str(r#"{"name":"Folio","type":"software"}"#).expect("parse");
        assert_eq!(draft.kind, ProjectType::Software);
        let value = serde_json::to_value(&draft).expect("serialize");
        assert_eq!(value["type"], "software");
        assert_eq!(value["status"], "idea");
    }

    #[test]
    fn section_settings_fall_back_to_defaults() {
        let mut settings = Map::new();
        settings.insert("display_limit".into(), Value::from(3));
        settings.insert("show_yearly".into(), Value::String("yes".into()));
        let section = SectionConfig {
            id: Uuid::nil(),
            section_name: SectionName::Projects,
            is_visible: true,
            display_title: "Projects".into(),
            description: None,
            order_index: 4,
            settings,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(section.limit("display_limit", 6), 3);
        assert!(section.flag("show_yearly", true));
        assert!(!section.flag("missing", false));
    }
}
