use std::collections::BTreeMap;

use thiserror::Error;

use super::prefilter::{CoarseFilter, SkillConstraint, distinct_names};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("primary skills are required")]
    EmptyPrimarySkills,
}

/// "Any-skill" search: a profile qualifies by sharing at least one requested name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnySkillQuery {
    pub skill_names: Vec<String>,
    pub location: Option<String>,
    pub min_total_experience: Option<i32>,
    /// 1-based. `None` means the first page.
    pub page: Option<usize>,
    /// `None` falls back to the engine's default page size.
    pub page_size: Option<usize>,
}

/// Combined search: every primary name is mandatory, secondary names only add score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimarySecondaryQuery {
    pub primary_skills: Vec<String>,
    pub secondary_skills: Vec<String>,
    /// skill name -> minimum years on that skill. Applies to primary and secondary names alike.
    pub skill_experience: BTreeMap<String, i32>,
    pub location: Option<String>,
    pub min_total_experience: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchQuery {
    AnySkill(AnySkillQuery),
    PrimarySecondary(PrimarySecondaryQuery),
}

impl From<AnySkillQuery> for MatchQuery {
    fn from(value: AnySkillQuery) -> Self {
        MatchQuery::AnySkill(value)
    }
}

impl From<PrimarySecondaryQuery> for MatchQuery {
    fn from(value: PrimarySecondaryQuery) -> Self {
        MatchQuery::PrimarySecondary(value)
    }
}

impl MatchQuery {
    pub fn mode(&self) -> &'static str {
        match self {
            MatchQuery::AnySkill(_) => "any_skill",
            MatchQuery::PrimarySecondary(_) => "primary_secondary",
        }
    }

    /// Rejects queries that must not reach the store. Only the combined mode can fail.
    ///
    /// Empty-string names are dropped before the check, so `primary_skills: [""]`
    /// is rejected as empty. The legacy search service accepted that list and
    /// then ran the search without any skill constraint.
    pub fn validate(&self) -> Result<(), QueryError> {
        match self {
            MatchQuery::AnySkill(_) => Ok(()),
            MatchQuery::PrimarySecondary(query) => {
                if distinct_names(&query.primary_skills).is_empty() {
                    Err(QueryError::EmptyPrimarySkills)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Translate the query into the predicate both store backings evaluate.
    pub fn coarse_filter(&self) -> CoarseFilter {
        match self {
            MatchQuery::AnySkill(query) => {
                let names = distinct_names(&query.skill_names);
                CoarseFilter {
                    location: present_location(query.location.as_deref()),
                    experience_floor: query.min_total_experience,
                    skills: if names.is_empty() {
                        SkillConstraint::Unconstrained
                    } else {
                        SkillConstraint::AnyOf(names)
                    },
                    secondary: Vec::new(),
                }
            }
            MatchQuery::PrimarySecondary(query) => CoarseFilter {
                location: query.location.clone(),
                experience_floor: query.min_total_experience,
                skills: SkillConstraint::AllOf(distinct_names(&query.primary_skills)),
                secondary: distinct_names(&query.secondary_skills),
            },
        }
    }
}

// Any-skill only: blank means "no location constraint". Combined mode compares verbatim.
fn present_location(location: Option<&str>) -> Option<String> {
    location
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}
