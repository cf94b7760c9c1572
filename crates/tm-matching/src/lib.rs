pub mod api;
pub mod db;
pub mod logging;
pub mod matching;
pub mod store;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use matching::pipeline::{EngineConfig, MatchError, MatchPage, MatchResult, MatchingEngine};
pub use matching::query::{AnySkillQuery, MatchQuery, PrimarySecondaryQuery, QueryError};
pub use store::{FilteredPage, InMemoryProfileStore, ProfileStore};

/// Whether a skill is a profile's core competency or a supporting one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillCategory {
    #[default]
    Primary,
    Secondary,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

/// Placement status. `Atp` ("available to place") is the default for new profiles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileStatus {
    #[default]
    Atp,
    Deployed,
    SoftBlocked,
    Notice,
    Leave,
    Trainee,
    InterviewScheduled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(rename = "type")]
    pub category: SkillCategory,
    pub level: SkillLevel,
    pub years_of_experience: Option<i32>,
}

impl Skill {
    pub fn primary(name: impl Into<String>, years: Option<i32>) -> Self {
        Self {
            name: name.into(),
            category: SkillCategory::Primary,
            years_of_experience: years,
            ..Self::default()
        }
    }

    pub fn secondary(name: impl Into<String>, years: Option<i32>) -> Self {
        Self {
            name: name.into(),
            category: SkillCategory::Secondary,
            years_of_experience: years,
            ..Self::default()
        }
    }
}

// Profile as handed over by the store. Cross-entity links (soft blocks) are
// plain account ids; the store resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Option<i64>,
    pub employee_id: String,
    pub name: String,
    pub email: Option<String>,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub status: ProfileStatus,
    pub availability_date: Option<NaiveDate>,
    pub release_date: Option<NaiveDate>,
    pub total_experience: Option<i32>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub soft_block_account_ids: Vec<i64>,
}

impl Profile {
    /// Distinct skill names on the profile. Duplicate records count once.
    pub fn skill_names(&self) -> HashSet<&str> {
        self.skills.iter().map(|skill| skill.name.as_str()).collect()
    }

    /// Best recorded years for `name` across all records carrying that name.
    pub fn years_for_skill(&self, name: &str) -> Option<i32> {
        self.skills
            .iter()
            .filter(|skill| skill.name == name)
            .filter_map(|skill| skill.years_of_experience)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn duplicate_skill_records_collapse_to_one_name() {
        let profile = Profile {
            name: "Asha".into(),
            skills: vec![
                Skill::primary("Java", Some(2)),
                Skill::secondary("Java", Some(6)),
                Skill::secondary("Docker", None),
            ],
            ..Profile::default()
        };

        let names = profile.skill_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains("Java"));
        assert_eq!(profile.years_for_skill("Java"), Some(6));
        assert_eq!(profile.years_for_skill("Docker"), None);
        assert_eq!(profile.years_for_skill("Go"), None);
    }

    #[test]
    fn enums_use_upper_snake_case_on_the_wire() {
        assert_eq!(ProfileStatus::InterviewScheduled.as_ref(), "INTERVIEW_SCHEDULED");
        assert_eq!(ProfileStatus::from_str("SOFT_BLOCKED").unwrap(), ProfileStatus::SoftBlocked);
        assert_eq!(SkillCategory::from_str("SECONDARY").unwrap(), SkillCategory::Secondary);

        let json = serde_json::to_value(Skill::primary("Rust", Some(3))).unwrap();
        assert_eq!(json["type"], "PRIMARY");
        assert_eq!(json["level"], "INTERMEDIATE");
        assert_eq!(json["yearsOfExperience"], 3);
    }
}
