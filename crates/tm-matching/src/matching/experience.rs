use std::collections::BTreeMap;

use tracing::debug;

use crate::Profile;

/// First unmet per-skill requirement found on a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceShortfall {
    pub skill: String,
    pub required: i32,
    /// Best recorded years for the skill, `None` when absent or unrecorded.
    pub actual: Option<i32>,
}

/// Second-pass filter: every `skill -> min years` entry must hold (AND).
/// A threshold on a secondary skill turns that skill into a hard requirement.
#[derive(Debug, Clone, Copy)]
pub struct SkillExperienceFilter<'a> {
    requirements: &'a BTreeMap<String, i32>,
}

impl<'a> SkillExperienceFilter<'a> {
    pub fn new(requirements: &'a BTreeMap<String, i32>) -> Self {
        Self { requirements }
    }

    pub fn is_active(&self) -> bool {
        !self.requirements.is_empty()
    }

    /// Entries are checked in key order so the reported shortfall is stable.
    pub fn check(&self, profile: &Profile) -> Result<(), ExperienceShortfall> {
        for (skill, &required) in self.requirements {
            let actual = profile.years_for_skill(skill);
            if !actual.is_some_and(|years| years >= required) {
                return Err(ExperienceShortfall {
                    skill: skill.clone(),
                    required,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Keep the items whose profile satisfies every requirement. Order is preserved.
    pub fn retain<T>(&self, items: Vec<T>, profile_of: impl Fn(&T) -> &Profile) -> Vec<T> {
        if !self.is_active() {
            return items;
        }

        items
            .into_iter()
            .filter(|item| {
                let profile = profile_of(item);
                match self.check(profile) {
                    Ok(()) => true,
                    Err(shortfall) => {
                        debug!(
                            profile_id = ?profile.id,
                            employee_id = %profile.employee_id,
                            skill = %shortfall.skill,
                            required = shortfall.required,
                            actual = ?shortfall.actual,
                            "fine_filter_rejected"
                        );
                        false
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Skill;

    fn requirements(entries: &[(&str, i32)]) -> BTreeMap<String, i32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn profile(name: &str, skills: Vec<Skill>) -> Profile {
        Profile {
            name: name.into(),
            skills,
            ..Profile::default()
        }
    }

    #[test]
    fn all_entries_must_hold() {
        let reqs = requirements(&[("Java", 3), ("Docker", 1)]);
        let filter = SkillExperienceFilter::new(&reqs);

        let ok = profile(
            "A",
            vec![Skill::primary("Java", Some(5)), Skill::secondary("Docker", Some(1))],
        );
        assert!(filter.check(&ok).is_ok());

        let short = profile(
            "B",
            vec![Skill::primary("Java", Some(5)), Skill::secondary("Docker", Some(0))],
        );
        assert_eq!(
            filter.check(&short),
            Err(ExperienceShortfall {
                skill: "Docker".into(),
                required: 1,
                actual: Some(0),
            })
        );
    }

    #[test]
    fn missing_or_unrecorded_years_fail() {
        let reqs = requirements(&[("Kafka", 0)]);
        let filter = SkillExperienceFilter::new(&reqs);

        assert!(filter.check(&profile("A", vec![Skill::secondary("Kafka", None)])).is_err());
        assert!(filter.check(&profile("B", vec![])).is_err());
        assert!(filter.check(&profile("C", vec![Skill::secondary("Kafka", Some(0))])).is_ok());
    }

    #[test]
    fn any_record_with_the_name_can_satisfy() {
        let reqs = requirements(&[("Java", 4)]);
        let filter = SkillExperienceFilter::new(&reqs);
        let p = profile(
            "A",
            vec![Skill::primary("Java", Some(1)), Skill::secondary("Java", Some(4))],
        );
        assert!(filter.check(&p).is_ok());
    }

    #[test]
    fn empty_map_is_a_no_op() {
        let reqs = BTreeMap::new();
        let filter = SkillExperienceFilter::new(&reqs);
        assert!(!filter.is_active());

        let kept = filter.retain(vec![profile("A", vec![])], |p| p);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn retain_preserves_order() {
        let reqs = requirements(&[("Go", 2)]);
        let filter = SkillExperienceFilter::new(&reqs);
        let items = vec![
            profile("Z", vec![Skill::primary("Go", Some(3))]),
            profile("Y", vec![Skill::primary("Go", Some(1))]),
            profile("X", vec![Skill::primary("Go", Some(2))]),
        ];

        let kept = filter.retain(items, |p| p);
        let names: Vec<_> = kept.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "X"]);
    }
}
