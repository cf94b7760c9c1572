use std::collections::{BTreeSet, HashSet};

use super::ranking::profile_order;
use crate::{Profile, store::FilteredPage};

/// Tolerance applied to the total-experience floor: a floor F admits `total >= F - 5`.
pub const EXPERIENCE_TOLERANCE_YEARS: i32 = 5;

/// Skill-presence constraint of the coarse pass. Name lists are sorted and distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillConstraint {
    Unconstrained,
    /// At least one of the names must be present.
    AnyOf(Vec<String>),
    /// Every name must be present.
    AllOf(Vec<String>),
}

impl SkillConstraint {
    pub fn names(&self) -> &[String] {
        match self {
            SkillConstraint::Unconstrained => &[],
            SkillConstraint::AnyOf(names) | SkillConstraint::AllOf(names) => names,
        }
    }

    pub fn is_satisfied_by(&self, profile_names: &HashSet<&str>) -> bool {
        match self {
            SkillConstraint::Unconstrained => true,
            SkillConstraint::AnyOf(names) => {
                names.is_empty() || count_present(profile_names, names) > 0
            }
            SkillConstraint::AllOf(names) => count_present(profile_names, names) == names.len(),
        }
    }
}

/// Constraints cheap enough to evaluate against the whole pool, plus the
/// names used for the provisional ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoarseFilter {
    pub location: Option<String>,
    pub experience_floor: Option<i32>,
    pub skills: SkillConstraint,
    /// Score-only names (secondary skills). Never gate inclusion.
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PrefilterCandidate {
    pub profile: Profile,
    pub provisional_count: usize,
}

impl CoarseFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        self.matches_with(profile, &profile.skill_names())
    }

    fn matches_with(&self, profile: &Profile, profile_names: &HashSet<&str>) -> bool {
        if let Some(location) = &self.location {
            if profile.location.as_deref() != Some(location.as_str()) {
                return false;
            }
        }

        meets_experience_floor(profile.total_experience, self.experience_floor)
            && self.skills.is_satisfied_by(profile_names)
    }

    /// Distinct requested names present on the profile; the store's sort key.
    pub fn provisional_count(&self, profile: &Profile) -> usize {
        self.provisional_count_with(&profile.skill_names())
    }

    fn provisional_count_with(&self, profile_names: &HashSet<&str>) -> usize {
        count_present(profile_names, self.skills.names())
            + count_present(profile_names, &self.secondary)
    }

    /// Coarse check plus provisional count in one pass over the skill list.
    pub fn evaluate_candidate(&self, profile: &Profile) -> Option<PrefilterCandidate> {
        let names = profile.skill_names();
        if !self.matches_with(profile, &names) {
            return None;
        }

        Some(PrefilterCandidate {
            provisional_count: self.provisional_count_with(&names),
            profile: profile.clone(),
        })
    }

    /// Every passing profile, provisional count descending then name ascending.
    pub fn filter_candidates(&self, pool: &[Profile]) -> Vec<PrefilterCandidate> {
        let mut candidates: Vec<_> = pool
            .iter()
            .filter_map(|profile| self.evaluate_candidate(profile))
            .collect();

        candidates.sort_by(|a, b| {
            b.provisional_count
                .cmp(&a.provisional_count)
                .then_with(|| profile_order(&a.profile, &b.profile))
        });
        candidates
    }

    /// In-memory rendition of the store's filtered fetch: one window of the
    /// sorted candidates plus the unwindowed total.
    pub fn select(&self, pool: &[Profile], offset: usize, limit: usize) -> FilteredPage {
        let candidates = self.filter_candidates(pool);
        let total = candidates.len();

        FilteredPage {
            profiles: candidates
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|candidate| candidate.profile)
                .collect(),
            total,
        }
    }
}

/// Lowest total experience admitted by `floor`. Saturates at `i32::MIN`.
pub fn experience_threshold(floor: i32) -> i32 {
    floor.saturating_sub(EXPERIENCE_TOLERANCE_YEARS)
}

/// A profile without recorded total experience fails any floor.
pub fn meets_experience_floor(total_experience: Option<i32>, floor: Option<i32>) -> bool {
    match floor {
        None => true,
        Some(floor) => total_experience.is_some_and(|total| total >= experience_threshold(floor)),
    }
}

/// Sorted, de-duplicated names with empty strings dropped. No case folding.
pub fn distinct_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(crate) fn count_present(profile_names: &HashSet<&str>, requested: &[String]) -> usize {
    requested
        .iter()
        .filter(|name| profile_names.contains(name.as_str()))
        .count()
}
