//! `Record` implementations binding each content type to its table.

use uuid::Uuid;

use super::{ListOrder, Record};
use crate::model::{
    Goal, GoalDraft, HeroBadge, HeroBadgeDraft, NavigationLink, NavigationLinkDraft, Project,
    ProjectDraft, Skill, SkillDraft, SocialLink, SocialLinkDraft, Tool, ToolDraft,
};
use crate::store::Table;

impl Record for Goal {
    const TABLE: Table = Table::Goals;
    const LABEL: &'static str = "goal";
    const ORDERING: ListOrder = ListOrder::Indexed;
    const HAS_VISIBILITY: bool = true;
    type Draft = GoalDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn stat_key(&self) -> Option<String> {
        Some(self.status.as_str().to_string())
    }
}

impl Record for Skill {
    const TABLE: Table = Table::Skills;
    const LABEL: &'static str = "skill";
    const ORDERING: ListOrder = ListOrder::Indexed;
    type Draft = SkillDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn stat_key(&self) -> Option<String> {
        Some(self.category.clone())
    }
}

impl Record for Tool {
    const TABLE: Table = Table::Tools;
    const LABEL: &'static str = "tool";
    const ORDERING: ListOrder = ListOrder::Indexed;
    const HAS_VISIBILITY: bool = true;
    type Draft = ToolDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn stat_key(&self) -> Option<String> {
        Some(self.category.clone())
    }
}

impl Record for HeroBadge {
    const TABLE: Table = Table::HeroBadges;
    const LABEL: &'static str = "hero badge";
    const ORDERING: ListOrder = ListOrder::Indexed;
    const HAS_VISIBILITY: bool = true;
    type Draft = HeroBadgeDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for SocialLink {
    const TABLE: Table = Table::SocialLinks;
    const LABEL: &'static str = "social link";
    const ORDERING: ListOrder = ListOrder::Indexed;
    const HAS_VISIBILITY: bool = true;
    type Draft = SocialLinkDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn stat_key(&self) -> Option<String> {
        Some(self.platform.clone())
    }
}

impl Record for NavigationLink {
    const TABLE: Table = Table::NavigationLinks;
    const LABEL: &'static str = "navigation link";
    const ORDERING: ListOrder = ListOrder::Indexed;
    const HAS_VISIBILITY: bool = true;
    type Draft = NavigationLinkDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Project {
    const TABLE: Table = Table::Projects;
    const LABEL: &'static str = "project";
    const ORDERING: ListOrder = ListOrder::NewestFirst;
    const SOFT_DELETE: bool = true;
    type Draft = ProjectDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn stat_key(&self) -> Option<String> {
        Some(self.status.as_str().to_string())
    }
}
