//! Static demo dataset for environments without a database.
//!
//! The dataset is loaded into a [`MemoryStore`] and rendered through the same
//! [`crate::PublicSite`] code as live data. Ids are deterministic so exported
//! snapshots are stable between runs.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    Goal, GoalPriority, GoalScope, GoalStatus, HeroBadge, NavigationLink, Project, ProjectStatus,
    ProjectType, SectionConfig, SectionName, Skill, SkillLevel, SocialLink, Tool,
};
use crate::settings::{
    AvailabilityColor, HeroSettings, HeroStats, HeroStatsLabels, NavbarSettings, ProfileSettings,
    SettingsDocument, SettingsError, SiteMetadata, ThemeSettings, encode,
};
use crate::store::{MemoryStore, Row, StoreError, Table, to_row};

/// 2025-01-01T00:00:00Z; demo rows are created one minute apart from here.
const EPOCH_SECS: i64 = 1_735_689_600;

/// Errors raised while assembling the demo dataset.
#[derive(Debug, Error)]
pub enum DemoError {
    /// A record failed to serialize into a row.
    #[error("demo record failed to encode")]
    Record(#[from] StoreError),
    /// A settings document failed to encode.
    #[error("demo settings failed to encode")]
    Settings(#[from] SettingsError),
}

fn demo_id(table: Table, n: u16) -> Uuid {
    let tag = (1_u128..)
        .zip(Table::ALL)
        .find(|(_, candidate)| *candidate == table)
        .map_or(0, |(tag, _)| tag);
    Uuid::from_u128((tag << 64) | u128::from(n))
}

fn at(minutes: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(EPOCH_SECS + minutes * 60)
}

struct Seed {
    rows: Vec<(Table, Row)>,
}

impl Seed {
    fn push<T: Serialize>(&mut self, table: Table, record: &T) -> Result<(), DemoError> {
        self.rows.push((table, to_row(table, record)?));
        Ok(())
    }

    fn settings<D: SettingsDocument>(&mut self, document: &D, first: u16) -> Result<(), DemoError> {
        let rows = encode(&D::GROUP, &document.to_object()?)?;
        for (offset, mut row) in (0_u16..).zip(rows) {
            let stamp = Value::String(at(0).to_rfc3339());
            row.insert(
                "id".into(),
                Value::String(demo_id(Table::SiteSettings, first + offset).to_string()),
            );
            row.insert("created_at".into(), stamp.clone());
            row.insert("updated_at".into(), stamp);
            self.rows.push((Table::SiteSettings, row));
        }
        Ok(())
    }
}

/// In-memory store seeded with the demo portfolio.
///
/// # Errors
///
/// Returns [`DemoError`] if a seed record fails to encode.
pub fn demo_store() -> Result<MemoryStore, DemoError> {
    Ok(MemoryStore::with_rows(demo_rows()?))
}

/// Every demo row, tagged with its table.
///
/// # Errors
///
/// Returns [`DemoError`] if a seed record fails to encode.
pub fn demo_rows() -> Result<Vec<(Table, Row)>, DemoError> {
    let mut seed = Seed { rows: Vec::new() };
    seed_projects(&mut seed)?;
    seed_skills(&mut seed)?;
    seed_goals(&mut seed)?;
    seed_tools(&mut seed)?;
    seed_links(&mut seed)?;
    seed_sections(&mut seed)?;
    seed_settings(&mut seed)?;
    Ok(seed.rows)
}

fn seed_projects(seed: &mut Seed) -> Result<(), DemoError> {
    let projects = [
        (
            "Dashnouk Dev",
            ProjectType::Web,
            ProjectStatus::Building,
            &["Next.js", "Supabase", "TypeScript", "TailwindCSS"][..],
            Some("https://github.com/Princeddn/dashnoukdev"),
            None,
            "Mon quartier général personnel - Dashboard et lanceur de projets avec IA",
        ),
        (
            "IoT Dashboard",
            ProjectType::Software,
            ProjectStatus::Production,
            &["React", "Node.js", "MQTT", "LoRaWAN"][..],
            None,
            Some("https://iot-dashboard.example.com"),
            "Tableau de bord pour gérer des capteurs IoT en temps réel",
        ),
        (
            "Mobile App E-commerce",
            ProjectType::Mobile,
            ProjectStatus::Mvp,
            &["React Native", "Firebase", "Stripe"][..],
            None,
            None,
            "Application mobile de e-commerce avec paiement intégré",
        ),
    ];
    for (n, (name, kind, status, stack, github_url, app_url, description)) in
        (1_u16..).zip(projects)
    {
        seed.push(
            Table::Projects,
            &Project {
                id: demo_id(Table::Projects, n),
                name: name.to_string(),
                kind,
                status,
                stack: stack.iter().map(ToString::to_string).collect(),
                github_url: github_url.map(ToString::to_string),
                app_url: app_url.map(ToString::to_string),
                description: description.to_string(),
                created_at: at(i64::from(n)),
                deleted_at: None,
            },
        )?;
    }
    Ok(())
}

fn seed_skills(seed: &mut Seed) -> Result<(), DemoError> {
    let skills = [
        ("Next.js", SkillLevel::Acquired, "dev"),
        ("TypeScript", SkillLevel::Acquired, "dev"),
        ("Supabase", SkillLevel::Acquired, "dev"),
        ("TailwindCSS", SkillLevel::Acquired, "dev"),
        ("React", SkillLevel::Acquired, "dev"),
        ("LoRaWAN", SkillLevel::Learning, "IoT"),
        ("MQTT", SkillLevel::Learning, "IoT"),
        ("Python ML", SkillLevel::Learning, "dev"),
        ("Rust", SkillLevel::Target, "dev"),
        ("Kubernetes", SkillLevel::Target, "dev"),
        ("Marketing Digital", SkillLevel::Target, "business"),
    ];
    for (n, (name, level, category)) in (0_u16..).zip(skills) {
        seed.push(
            Table::Skills,
            &Skill {
                id: demo_id(Table::Skills, n + 1),
                name: name.to_string(),
                category: category.to_string(),
                proficiency: None,
                level: Some(level),
                icon: None,
                order_index: i32::from(n),
                created_at: at(i64::from(n)),
            },
        )?;
    }
    Ok(())
}

fn seed_goals(seed: &mut Seed) -> Result<(), DemoError> {
    let goals = [
        ("Lancer 3 projets en production", GoalScope::Year, GoalStatus::InProgress, None),
        ("Maîtriser l'architecture cloud", GoalScope::Year, GoalStatus::Todo, None),
        ("Contribuer à 5 projets open-source", GoalScope::Year, GoalStatus::Todo, None),
        ("Terminer le Dashboard personnel", GoalScope::Month, GoalStatus::InProgress, Some(12_u32)),
        ("Apprendre les bases de LoRaWAN", GoalScope::Month, GoalStatus::Done, Some(12_u32)),
    ];
    for (n, (title, scope, status, month)) in (0_u16..).zip(goals) {
        seed.push(
            Table::Goals,
            &Goal {
                id: demo_id(Table::Goals, n + 1),
                title: title.to_string(),
                description: String::new(),
                category: "Professional".to_string(),
                status,
                priority: GoalPriority::Medium,
                target_date: month.and_then(|month| NaiveDate::from_ymd_opt(2025, month, 31)),
                scope: Some(scope),
                year: Some(2025),
                month: month.and_then(|month| i32::try_from(month).ok()),
                is_visible: true,
                order_index: i32::from(n),
                created_at: at(i64::from(n)),
            },
        )?;
    }
    Ok(())
}

fn seed_tools(seed: &mut Seed) -> Result<(), DemoError> {
    let tools = [
        ("Next.js", "frontend"),
        ("Supabase", "backend"),
        ("API REST", "backend"),
        ("Web Scraping", "other"),
        ("MQTT", "iot"),
        ("LoRaWAN", "iot"),
        ("GitHub", "other"),
        ("Docker", "backend"),
        ("Vercel", "other"),
        ("PostgreSQL", "backend"),
        ("React", "frontend"),
        ("TypeScript", "frontend"),
        ("TailwindCSS", "design"),
        ("Node.js", "backend"),
        ("Python", "backend"),
    ];
    for (n, (name, category)) in (0_u16..).zip(tools) {
        seed.push(
            Table::Tools,
            &Tool {
                id: demo_id(Table::Tools, n + 1),
                name: name.to_string(),
                category: category.to_string(),
                description: None,
                icon: None,
                website_url: None,
                is_visible: true,
                order_index: i32::from(n),
                created_at: at(i64::from(n)),
            },
        )?;
    }
    Ok(())
}

fn seed_links(seed: &mut Seed) -> Result<(), DemoError> {
    let badges = [("Développeur full-stack", "💻"), ("Passionné d'IoT", "📡")];
    for (n, (text, icon)) in (0_u16..).zip(badges) {
        seed.push(
            Table::HeroBadges,
            &HeroBadge {
                id: demo_id(Table::HeroBadges, n + 1),
                text: text.to_string(),
                icon: icon.to_string(),
                link: None,
                is_visible: true,
                order_index: i32::from(n),
                created_at: at(i64::from(n)),
            },
        )?;
    }

    let socials = [
        ("github", "https://github.com/Princeddn", "GitHub"),
        (
            "linkedin",
            "https://www.linkedin.com/in/prince-noukounwoui-ba1978217/",
            "LinkedIn",
        ),
    ];
    for (n, (platform, url, label)) in (0_u16..).zip(socials) {
        seed.push(
            Table::SocialLinks,
            &SocialLink {
                id: demo_id(Table::SocialLinks, n + 1),
                platform: platform.to_string(),
                url: url.to_string(),
                icon: platform.to_string(),
                label: Some(label.to_string()),
                is_visible: true,
                order_index: i32::from(n),
                created_at: at(i64::from(n)),
            },
        )?;
    }

    let navigation = [
        ("Objectifs", "#objectifs"),
        ("Compétences", "#competences"),
        ("Outils", "#outils"),
        ("Projets", "#projets"),
    ];
    for (n, (label, href)) in (0_u16..).zip(navigation) {
        seed.push(
            Table::NavigationLinks,
            &NavigationLink {
                id: demo_id(Table::NavigationLinks, n + 1),
                label: label.to_string(),
                href: href.to_string(),
                order_index: i32::from(n),
                is_visible: true,
                is_external: false,
                created_at: at(i64::from(n)),
            },
        )?;
    }
    Ok(())
}

fn section_settings(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn seed_sections(seed: &mut Seed) -> Result<(), DemoError> {
    let sections = [
        (SectionName::Hero, "Accueil", json!({})),
        (
            SectionName::Goals,
            "Mes Objectifs",
            json!({"show_yearly": true, "show_monthly": true}),
        ),
        (
            SectionName::Skills,
            "Mes Compétences",
            json!({"show_acquired": true, "show_learning": true, "show_target": true}),
        ),
        (SectionName::Tools, "Mes Outils", json!({})),
        (SectionName::Projects, "Mes Projets", json!({"display_limit": 6})),
    ];
    for (n, (section_name, title, settings)) in (0_u16..).zip(sections) {
        seed.push(
            Table::SectionConfig,
            &SectionConfig {
                id: demo_id(Table::SectionConfig, n + 1),
                section_name,
                is_visible: true,
                display_title: title.to_string(),
                description: None,
                order_index: i32::from(n),
                settings: section_settings(settings),
                created_at: at(0),
                updated_at: at(0),
            },
        )?;
    }
    Ok(())
}

fn seed_settings(seed: &mut Seed) -> Result<(), DemoError> {
    seed.settings(
        &HeroSettings {
            greeting: "Welcome in my world".into(),
            title: "Nouk Prince".into(),
            tagline: "Je construis des produits web et IoT, du capteur au dashboard.".into(),
            availability: "Disponible pour de nouveaux projets".into(),
            availability_color: AvailabilityColor::Green,
            stats: HeroStats {
                projects: 3,
                skills: 11,
                years: 3,
            },
            stats_labels: HeroStatsLabels {
                years: "Années d'expérience".into(),
                projects: "Projets".into(),
                skills: "Compétences".into(),
            },
            cta_text: "Voir mes projets".into(),
            cta_href: "#projets".into(),
        },
        100,
    )?;
    seed.settings(
        &ProfileSettings {
            name: "Nouk Prince".into(),
            title: "Développeur full-stack & IoT".into(),
            initials: "NP".into(),
            ..ProfileSettings::default()
        },
        200,
    )?;
    seed.settings(
        &NavbarSettings {
            logo_text: "NP".into(),
            site_name: "Nouk Prince".into(),
            cta_text: "Me contacter".into(),
            cta_href: "https://www.linkedin.com/in/prince-noukounwoui-ba1978217/".into(),
        },
        300,
    )?;
    seed.settings(
        &SiteMetadata {
            title: "Nouk Prince".into(),
            description: "Portfolio, objectifs et projets de Nouk Prince".into(),
            language: "fr".into(),
        },
        400,
    )?;
    seed.settings(&ThemeSettings::default(), 500)?;
    Ok(())
}
