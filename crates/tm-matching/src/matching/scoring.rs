use std::collections::HashSet;

use serde::Serialize;

use super::prefilter::{CoarseFilter, SkillConstraint};
use crate::Profile;

/// Authoritative skill-match score. `total` is the number of distinct
/// requested names found on the profile, summed over both terms in
/// combined mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub total: u32,
    /// Requested names present (any-skill names, or primary names). Sorted.
    pub matched_skills: Vec<String>,
    /// Secondary names present. Always empty in any-skill mode. Sorted.
    pub matched_secondary: Vec<String>,
}

/// `|distinct(profile names) ∩ requested|`.
pub fn score_any_skill(profile: &Profile, requested: &[String]) -> MatchScore {
    let profile_names = profile.skill_names();
    let matched_skills = matched_names(&profile_names, requested);

    MatchScore {
        total: matched_skills.len() as u32,
        matched_skills,
        matched_secondary: Vec::new(),
    }
}

/// Primary matches plus secondary matches. The primary term is computed even
/// though the all-of filter already guarantees it equals `primary.len()`.
pub fn score_primary_secondary(
    profile: &Profile,
    primary: &[String],
    secondary: &[String],
) -> MatchScore {
    let profile_names = profile.skill_names();
    let matched_skills = matched_names(&profile_names, primary);
    let matched_secondary = matched_names(&profile_names, secondary);

    MatchScore {
        total: (matched_skills.len() + matched_secondary.len()) as u32,
        matched_skills,
        matched_secondary,
    }
}

/// Score against the names a translated query carries.
pub fn calculate_match_score(filter: &CoarseFilter, profile: &Profile) -> MatchScore {
    match &filter.skills {
        SkillConstraint::AllOf(primary) => score_primary_secondary(profile, primary, &filter.secondary),
        other => score_any_skill(profile, other.names()),
    }
}

// `requested` is already sorted and distinct, so the output is too.
fn matched_names(profile_names: &HashSet<&str>, requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| profile_names.contains(name.as_str()))
        .cloned()
        .collect()
}
