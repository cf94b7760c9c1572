use std::collections::BTreeMap;

use serde::Deserialize;

use crate::matching::query::{AnySkillQuery, MatchQuery, PrimarySecondaryQuery};

/// Body of the any-skill search. Unknown fields (e.g. `sortBy`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    /// Minimum total experience in years.
    pub experience: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of the primary/secondary search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillBasedSearchRequest {
    #[serde(default)]
    pub primary_skills: Vec<String>,
    #[serde(default)]
    pub secondary_skills: Vec<String>,
    pub location: Option<String>,
    pub experience: Option<i32>,
    #[serde(default)]
    pub skill_experience_map: BTreeMap<String, i32>,
}

// Non-positive paging values mean "use the default".
fn positive(value: Option<i64>) -> Option<usize> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| usize::try_from(v).ok())
}

impl From<SearchRequest> for MatchQuery {
    fn from(value: SearchRequest) -> Self {
        MatchQuery::AnySkill(AnySkillQuery {
            skill_names: value.skills,
            location: value.location,
            min_total_experience: value.experience,
            page: positive(value.page),
            page_size: positive(value.limit),
        })
    }
}

impl From<SkillBasedSearchRequest> for MatchQuery {
    fn from(value: SkillBasedSearchRequest) -> Self {
        MatchQuery::PrimarySecondary(PrimarySecondaryQuery {
            primary_skills: value.primary_skills,
            secondary_skills: value.secondary_skills,
            skill_experience: value.skill_experience_map,
            location: value.location,
            min_total_experience: value.experience,
        })
    }
}
