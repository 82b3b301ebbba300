//! Dashboard counters and the repository overview.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AdminError, store_error};
use crate::model::{Goal, Project, StatusVocabulary};
use crate::store::{ContentStore, Direction, Query, Table, from_row};

/// Counters shown on the HQ landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    /// Projects not tombstoned.
    pub projects: u64,
    /// Skills.
    pub skills: u64,
    /// Goals.
    pub goals: u64,
    /// Tools marked visible.
    pub visible_tools: u64,
    /// How many goals use each status vocabulary.
    pub goal_status_vocabularies: BTreeMap<StatusVocabulary, usize>,
}

impl DashboardCounts {
    /// True when goals mix the admin and public status vocabularies.
    #[must_use]
    pub fn has_status_drift(&self) -> bool {
        self.goal_status_vocabularies.contains_key(&StatusVocabulary::Admin)
            && self.goal_status_vocabularies.contains_key(&StatusVocabulary::Public)
    }
}

/// Collect dashboard counters with count-only queries.
///
/// # Errors
///
/// Returns [`AdminError::Store`] when any query fails.
pub async fn dashboard(store: &dyn ContentStore) -> Result<DashboardCounts, AdminError> {
    let projects = store
        .count(&Query::from(Table::Projects).is_null("deleted_at"))
        .await
        .map_err(store_error("dashboard.projects"))?;
    let skills = store
        .count(&Query::from(Table::Skills))
        .await
        .map_err(store_error("dashboard.skills"))?;
    let visible_tools = store
        .count(&Query::from(Table::Tools).eq("is_visible", true))
        .await
        .map_err(store_error("dashboard.tools"))?;

    let goal_rows = store
        .select(&Query::from(Table::Goals))
        .await
        .map_err(store_error("dashboard.goals"))?;
    let mut goal_status_vocabularies = BTreeMap::new();
    for row in goal_rows.iter().cloned() {
        let goal: Goal = from_row(Table::Goals, row).map_err(store_error("dashboard.goals"))?;
        *goal_status_vocabularies
            .entry(goal.status.vocabulary())
            .or_insert(0) += 1;
    }

    Ok(DashboardCounts {
        projects,
        skills,
        goals: u64::try_from(goal_rows.len()).unwrap_or(u64::MAX),
        visible_tools,
        goal_status_vocabularies,
    })
}

/// Live projects that link a source repository, newest first.
///
/// # Errors
///
/// Returns [`AdminError::Store`] when the query or decode fails.
pub async fn repositories(store: &dyn ContentStore) -> Result<Vec<Project>, AdminError> {
    let rows = store
        .select(
            &Query::from(Table::Projects)
                .is_null("deleted_at")
                .order("created_at", Direction::Desc),
        )
        .await
        .map_err(store_error("repositories.list"))?;
    let mut projects = Vec::with_capacity(rows.len());
    for row in rows {
        let project: Project =
            from_row(Table::Projects, row).map_err(store_error("repositories.decode"))?;
        if project
            .github_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
        {
            projects.push(project);
        }
    }
    Ok(projects)
}
